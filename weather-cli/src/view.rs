use std::io::{self, Write};

use chrono::{DateTime, Utc};
use weather_core::{
    AlertBundle, CitySuggestion, CurrentConditions, Forecast, TemperatureUnit, WeatherView,
    presentation::{FORECAST_DAYS, condition_label, place_label},
};

/// Renders results as plain text to any writer.
pub struct TextView<W: Write> {
    out: W,
}

impl<W: Write> TextView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())
    }
}

impl<W: Write> WeatherView for TextView<W> {
    fn show_current(&mut self, current: &CurrentConditions, unit: TemperatureUnit) -> io::Result<()> {
        let (code, description) = condition_label(&current.conditions);

        self.line(place_label(current))?;
        self.line(format!("  {}  {description} [{code}]", unit.format(current.temperature_c)))?;
        self.line(format!("  Humidity: {}%", current.humidity_pct))?;
        self.line(format!("  Wind: {} m/s", current.wind_speed_mps))?;
        self.line(format!("  Pressure: {} hPa", current.pressure_hpa))
    }

    fn show_forecast(&mut self, forecast: &Forecast, unit: TemperatureUnit) -> io::Result<()> {
        if forecast.is_empty() {
            return self.line("Forecast not available");
        }

        self.line("Forecast:")?;
        for entry in forecast.daily(FORECAST_DAYS) {
            let day = entry
                .time()
                .map(|t: DateTime<Utc>| t.format("%a %b %d").to_string())
                .unwrap_or_else(|| "Unknown day".to_string());
            let (_, description) = condition_label(&entry.conditions);
            self.line(format!(
                "  {day:<11} {:>6}  {description}",
                unit.format(entry.temperature_c)
            ))?;
        }
        Ok(())
    }

    fn show_suggestions(&mut self, suggestions: &[CitySuggestion]) -> io::Result<()> {
        if suggestions.is_empty() {
            return self.line("No matching cities");
        }

        for s in suggestions {
            self.line(format!(
                "{}, {} ({:.4}, {:.4})",
                s.name, s.country, s.coordinates.lat, s.coordinates.lon
            ))?;
        }
        Ok(())
    }

    fn show_alerts(&mut self, bundle: &AlertBundle) -> io::Result<()> {
        if !bundle.has_alerts() {
            return self.line("No active weather alerts");
        }

        for alert in &bundle.alerts {
            let from = format_epoch(alert.start);
            let until = format_epoch(alert.end);
            self.line(format!("{} ({})", alert.event, alert.sender))?;
            self.line(format!("  {from} - {until}"))?;
            self.line(format!("  {}", alert.description.trim()))?;
        }
        Ok(())
    }

    fn show_favourites(&mut self, cities: &[String]) -> io::Result<()> {
        if cities.is_empty() {
            return self.line("No favourite cities yet");
        }

        for city in cities {
            self.line(format!("* {city}"))?;
        }
        Ok(())
    }

    fn show_error(&mut self, message: &str) -> io::Result<()> {
        self.line(format!("Error: {message}"))
    }
}

fn format_epoch(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "?".to_string())
}
