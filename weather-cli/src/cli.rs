use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use weather_core::{
    Config, Coordinates, FavouritesStore, FileFavourites, Location, SuggestionSequencer,
    TemperatureUnit, WeatherClient, WeatherError, WeatherView, fetch_report,
    presentation::share_text,
};

use crate::view::TextView;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Display unit; overrides the configured one ("celsius" or "fahrenheit").
    #[arg(long, global = true)]
    pub unit: Option<TemperatureUnit>,

    /// Log cache and request activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred unit.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City name, e.g. "London" or "London,GB".
        city: String,
    },

    /// Show weather for coordinates; the forecast follows the resolved place name.
    Here {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Suggest city names matching a partial query.
    Suggest { query: String },

    /// Show severe-weather alerts for coordinates.
    Alerts {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Print a short shareable summary for a city.
    Share { city: String },

    /// Manage favourite cities.
    Fav {
        #[command(subcommand)]
        action: FavCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavCommand {
    /// Add a city to favourites (no-op if already present).
    Add { city: String },
    /// Remove a city from favourites.
    Remove { city: String },
    /// List favourite cities in the order they were added.
    List,
    /// Show weather for a favourite city.
    Show { city: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        let unit = self.unit.unwrap_or(config.unit);
        let mut view = TextView::new(std::io::stdout());

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Show { city } => {
                let client = client(&config)?;
                show(&client, &mut view, Location::Name(city), unit).await?;
            }
            Command::Here { lat, lon } => {
                let client = client(&config)?;
                let location = Location::Coordinates(Coordinates::new(lat, lon));
                show(&client, &mut view, location, unit).await?;
            }
            Command::Suggest { query } => {
                let client = client(&config)?;
                let sequencer = SuggestionSequencer::new();
                if let Some(found) = sequencer.lookup(&client, &query).await {
                    view.show_suggestions(&found)?;
                }
            }
            Command::Alerts { lat, lon } => {
                let client = client(&config)?;
                let bundle = client
                    .alerts(Coordinates::new(lat, lon))
                    .await
                    .map_err(lookup_error)?;
                view.show_alerts(&bundle)?;
            }
            Command::Share { city } => {
                let client = client(&config)?;
                let current = client
                    .current_conditions(city.trim())
                    .await
                    .map_err(lookup_error)?;
                println!("{}", share_text(&current, unit));
            }
            Command::Fav { action } => {
                let store = FileFavourites::open_default()?;
                match action {
                    FavCommand::Add { city } => {
                        store.add(city.trim())?;
                        view.show_favourites(&store.list()?)?;
                    }
                    FavCommand::Remove { city } => {
                        store.remove(city.trim())?;
                        view.show_favourites(&store.list()?)?;
                    }
                    FavCommand::List => view.show_favourites(&store.list()?)?,
                    FavCommand::Show { city } => {
                        let favourites = store.list()?;
                        if !favourites.iter().any(|f| f == city.trim()) {
                            return Err(anyhow!("'{}' is not a favourite city", city.trim()));
                        }
                        let client = client(&config)?;
                        show(&client, &mut view, Location::Name(city), unit).await?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn client(config: &Config) -> anyhow::Result<WeatherClient> {
    WeatherClient::from_config(config).context("Failed to create weather client")
}

async fn show(
    client: &WeatherClient,
    view: &mut impl WeatherView,
    location: Location,
    unit: TemperatureUnit,
) -> anyhow::Result<()> {
    let report = fetch_report(client, &location)
        .await
        .map_err(lookup_error)?;

    view.show_current(&report.current, unit)?;
    view.show_forecast(&report.forecast, unit)?;
    Ok(())
}

fn lookup_error(err: WeatherError) -> anyhow::Error {
    let message = describe(&err);
    anyhow::Error::new(err).context(message)
}

/// User-facing wording for a lookup failure.
fn describe(err: &WeatherError) -> String {
    match err {
        WeatherError::FetchFailed {
            status: Some(status),
            ..
        } if status.as_u16() == 404 => "City not found".to_string(),
        WeatherError::FetchFailed {
            status: Some(status),
            ..
        } if status.as_u16() == 401 => "API key rejected by provider".to_string(),
        WeatherError::FetchFailed { .. } | WeatherError::Decode { .. } => {
            "City not found or API error".to_string()
        }
        other => other.to_string(),
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    let unit = Select::new("Temperature unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read unit")?;

    config.set_api_key(api_key.trim().to_string());
    config.unit = unit;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
