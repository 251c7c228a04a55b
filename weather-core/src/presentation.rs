//! Contract between the client and whatever renders its results.
//!
//! Views never touch the network. They must cope with sparse data: an empty
//! name or a missing condition renders a fallback instead of failing.

use std::io;

use crate::model::{
    AlertBundle, CitySuggestion, ConditionDescriptor, CurrentConditions, Forecast, TemperatureUnit,
};

/// Code the provider uses for a clear sky.
pub const FALLBACK_CONDITION_CODE: u16 = 800;
pub const FALLBACK_DESCRIPTION: &str = "Clear sky";

/// Days shown in a forecast summary.
pub const FORECAST_DAYS: usize = 5;

/// Rendering contract. Methods only fail when the output itself fails.
pub trait WeatherView {
    fn show_current(&mut self, current: &CurrentConditions, unit: TemperatureUnit) -> io::Result<()>;

    fn show_forecast(&mut self, forecast: &Forecast, unit: TemperatureUnit) -> io::Result<()>;

    fn show_suggestions(&mut self, suggestions: &[CitySuggestion]) -> io::Result<()>;

    fn show_alerts(&mut self, alerts: &AlertBundle) -> io::Result<()>;

    fn show_favourites(&mut self, cities: &[String]) -> io::Result<()>;

    fn show_error(&mut self, message: &str) -> io::Result<()>;
}

/// Primary condition code and description, capitalised, with fallbacks.
pub fn condition_label(conditions: &[ConditionDescriptor]) -> (u16, String) {
    match conditions.first() {
        Some(c) if !c.description.is_empty() => (c.code, capitalize(&c.description)),
        Some(c) => (c.code, FALLBACK_DESCRIPTION.to_string()),
        None => (FALLBACK_CONDITION_CODE, FALLBACK_DESCRIPTION.to_string()),
    }
}

pub fn place_label(current: &CurrentConditions) -> String {
    match (current.name.is_empty(), current.country.is_empty()) {
        (true, _) => "Unknown location".to_string(),
        (false, true) => current.name.clone(),
        (false, false) => format!("{}, {}", current.name, current.country),
    }
}

/// Plain-text summary for sharing or copying.
pub fn share_text(current: &CurrentConditions, unit: TemperatureUnit) -> String {
    let city = if current.name.is_empty() {
        "Unknown location"
    } else {
        current.name.as_str()
    };
    let (_, condition) = condition_label(&current.conditions);

    format!(
        "Weather in {city}:\nTemperature: {}\nCondition: {condition}",
        unit.format(current.temperature_c)
    )
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(description: &str) -> CurrentConditions {
        CurrentConditions {
            name: "Lisbon".into(),
            country: "PT".into(),
            temperature_c: 21.6,
            humidity_pct: 60,
            pressure_hpa: 1015.0,
            wind_speed_mps: 5.0,
            conditions: vec![ConditionDescriptor {
                code: 801,
                description: description.into(),
            }],
        }
    }

    #[test]
    fn share_text_uses_shared_rounding() {
        let current = conditions("few clouds");
        assert_eq!(
            share_text(&current, TemperatureUnit::Celsius),
            "Weather in Lisbon:\nTemperature: 22°C\nCondition: Few clouds"
        );
        assert_eq!(
            share_text(&current, TemperatureUnit::Fahrenheit),
            "Weather in Lisbon:\nTemperature: 71°F\nCondition: Few clouds"
        );
    }

    #[test]
    fn missing_condition_falls_back_to_clear_sky() {
        assert_eq!(condition_label(&[]), (800, "Clear sky".to_string()));
        let current = conditions("");
        assert_eq!(condition_label(&current.conditions), (801, "Clear sky".to_string()));
    }

    #[test]
    fn place_label_handles_missing_parts() {
        let mut current = conditions("rain");
        assert_eq!(place_label(&current), "Lisbon, PT");
        current.country.clear();
        assert_eq!(place_label(&current), "Lisbon");
        current.name.clear();
        assert_eq!(place_label(&current), "Unknown location");
    }
}
