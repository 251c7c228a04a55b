use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair as reported by the device or a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// What the user asked for. The two forms are never merged: a coordinate
/// lookup yields a place name that the caller reuses for name-only endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Name(String),
    Coordinates(Coordinates),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Converts a canonical Celsius reading into this unit, rounded to a whole
    /// degree. Every view goes through here so summary and share text agree.
    pub fn display(self, celsius: f64) -> i64 {
        let value = match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        };
        value.round() as i64
    }

    pub fn format(self, celsius: f64) -> String {
        format!("{}°{}", self.display(celsius), self.symbol())
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "c" | "celsius" | "metric" => Ok(Self::Celsius),
            "f" | "fahrenheit" | "imperial" => Ok(Self::Fahrenheit),
            other => Err(format!("Unknown unit '{other}'. Expected celsius or fahrenheit.")),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Celsius => f.write_str("celsius"),
            Self::Fahrenheit => f.write_str("fahrenheit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDescriptor {
    pub code: u16,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    /// Always Celsius; convert on read with [`TemperatureUnit::display`].
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub conditions: Vec<ConditionDescriptor>,
}

impl CurrentConditions {
    pub fn primary_condition(&self) -> Option<&ConditionDescriptor> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Epoch seconds.
    pub timestamp: i64,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub conditions: Vec<ConditionDescriptor>,
}

impl ForecastEntry {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.time().map(|t| t.date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub city: Option<String>,
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    /// First sample of each calendar day (UTC), in order, at most `limit` days.
    pub fn daily(&self, limit: usize) -> Vec<&ForecastEntry> {
        let mut days: Vec<&ForecastEntry> = Vec::new();
        let mut last_date = None;

        for entry in &self.entries {
            let date = entry.date();
            if date.is_some() && date == last_date {
                continue;
            }
            if days.len() == limit {
                break;
            }
            last_date = date;
            days.push(entry);
        }

        days
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub sender: String,
    pub event: String,
    pub start: i64,
    pub end: i64,
    pub description: String,
}

/// Active severe-weather alerts for a point. Empty when none are issued.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertBundle {
    pub timezone: String,
    pub alerts: Vec<WeatherAlert>,
}

impl AlertBundle {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: i64, temp: f64) -> ForecastEntry {
        ForecastEntry {
            timestamp,
            temperature_c: temp,
            humidity_pct: 50,
            pressure_hpa: 1012.0,
            wind_speed_mps: 3.0,
            conditions: vec![],
        }
    }

    #[test]
    fn fahrenheit_conversion_rounds_once() {
        assert_eq!(TemperatureUnit::Celsius.display(21.4), 21);
        assert_eq!(TemperatureUnit::Celsius.display(21.5), 22);
        assert_eq!(TemperatureUnit::Fahrenheit.display(0.0), 32);
        assert_eq!(TemperatureUnit::Fahrenheit.display(21.4), 71);
        assert_eq!(TemperatureUnit::Fahrenheit.display(-40.0), -40);
        assert_eq!(TemperatureUnit::Fahrenheit.format(100.0), "212°F");
    }

    #[test]
    fn unit_toggle_and_parse() {
        assert_eq!(TemperatureUnit::Celsius.toggle(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::Fahrenheit.toggle(), TemperatureUnit::Celsius);
        assert_eq!("F".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Fahrenheit));
        assert_eq!(" Celsius ".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Celsius));
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
    }

    #[test]
    fn daily_keeps_first_sample_per_day() {
        // 2024-01-01T00:00Z, +3h, next day 00:00Z, +3h, third day
        let forecast = Forecast {
            city: Some("Oslo".into()),
            entries: vec![
                entry(1_704_067_200, 1.0),
                entry(1_704_078_000, 2.0),
                entry(1_704_153_600, 3.0),
                entry(1_704_164_400, 4.0),
                entry(1_704_240_000, 5.0),
            ],
        };

        let days = forecast.daily(5);
        let temps: Vec<f64> = days.iter().map(|e| e.temperature_c).collect();
        assert_eq!(temps, vec![1.0, 3.0, 5.0]);

        assert_eq!(forecast.daily(2).len(), 2);
        assert!(forecast.daily(0).is_empty());
    }
}
