//! OpenWeather response shapes and their mapping onto the crate's models.
//!
//! Every field defaults when absent so a sparse body still decodes; deciding
//! whether the result is usable is left to the view.

use serde::Deserialize;

use crate::model::{
    AlertBundle, CitySuggestion, ConditionDescriptor, Coordinates, CurrentConditions, Forecast,
    ForecastEntry, WeatherAlert,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwMain {
    temp: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWeather {
    id: u16,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwSys {
    country: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwCity {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OwForecastResponse {
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OwSuggestion {
    name: String,
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwAlert {
    sender_name: String,
    event: String,
    start: i64,
    end: i64,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OwOneCallResponse {
    timezone: String,
    alerts: Vec<OwAlert>,
}

fn descriptors(weather: Vec<OwWeather>) -> Vec<ConditionDescriptor> {
    weather
        .into_iter()
        .map(|w| ConditionDescriptor {
            code: w.id,
            description: w.description,
        })
        .collect()
}

impl From<OwCurrentResponse> for CurrentConditions {
    fn from(parsed: OwCurrentResponse) -> Self {
        Self {
            name: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_mps: parsed.wind.speed,
            conditions: descriptors(parsed.weather),
        }
    }
}

impl From<OwForecastEntry> for ForecastEntry {
    fn from(entry: OwForecastEntry) -> Self {
        Self {
            timestamp: entry.dt,
            temperature_c: entry.main.temp,
            humidity_pct: entry.main.humidity,
            pressure_hpa: entry.main.pressure,
            wind_speed_mps: entry.wind.speed,
            conditions: descriptors(entry.weather),
        }
    }
}

impl From<OwForecastResponse> for Forecast {
    fn from(parsed: OwForecastResponse) -> Self {
        Self {
            city: parsed.city.map(|c| c.name).filter(|name| !name.is_empty()),
            entries: parsed.list.into_iter().map(ForecastEntry::from).collect(),
        }
    }
}

impl From<OwSuggestion> for CitySuggestion {
    fn from(s: OwSuggestion) -> Self {
        Self {
            name: s.name,
            country: s.country,
            coordinates: Coordinates::new(s.lat, s.lon),
        }
    }
}

impl From<OwOneCallResponse> for AlertBundle {
    fn from(parsed: OwOneCallResponse) -> Self {
        Self {
            timezone: parsed.timezone,
            alerts: parsed
                .alerts
                .into_iter()
                .map(|a| WeatherAlert {
                    sender: a.sender_name,
                    event: a.event,
                    start: a.start,
                    end: a.end,
                    description: a.description,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_response_maps_all_fields() {
        let body = r#"{
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 14.6, "humidity": 72, "pressure": 1009 },
            "wind": { "speed": 4.1 },
            "weather": [
                { "id": 500, "main": "Rain", "description": "light rain" },
                { "id": 701, "main": "Mist", "description": "mist" }
            ]
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).expect("valid json");
        let current = CurrentConditions::from(parsed);

        assert_eq!(current.name, "London");
        assert_eq!(current.country, "GB");
        assert_eq!(current.temperature_c, 14.6);
        assert_eq!(current.humidity_pct, 72);
        assert_eq!(current.pressure_hpa, 1009.0);
        assert_eq!(current.wind_speed_mps, 4.1);
        assert_eq!(current.conditions.len(), 2);
        assert_eq!(current.primary_condition().map(|c| c.code), Some(500));
    }

    #[test]
    fn sparse_current_response_still_decodes() {
        let parsed: OwCurrentResponse = serde_json::from_str(r#"{"name":"Nowhere"}"#).expect("json");
        let current = CurrentConditions::from(parsed);
        assert_eq!(current.name, "Nowhere");
        assert!(current.conditions.is_empty());
        assert_eq!(current.country, "");
    }

    #[test]
    fn forecast_response_keeps_order() {
        let body = r#"{
            "city": { "name": "Paris", "country": "FR" },
            "list": [
                { "dt": 1700000000, "main": { "temp": 10.0, "humidity": 80, "pressure": 1000 }, "weather": [{ "id": 800, "description": "clear sky" }], "wind": { "speed": 1.0 } },
                { "dt": 1700010800, "main": { "temp": 12.0, "humidity": 70, "pressure": 1001 }, "weather": [], "wind": { "speed": 2.0 } }
            ]
        }"#;
        let parsed: OwForecastResponse = serde_json::from_str(body).expect("valid json");
        let forecast = Forecast::from(parsed);

        assert_eq!(forecast.city.as_deref(), Some("Paris"));
        let stamps: Vec<i64> = forecast.entries.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![1_700_000_000, 1_700_010_800]);
        assert_eq!(forecast.entries[0].conditions[0].description, "clear sky");
    }

    #[test]
    fn onecall_without_alerts_is_empty_bundle() {
        let parsed: OwOneCallResponse =
            serde_json::from_str(r#"{"timezone":"Europe/London","daily":[]}"#).expect("json");
        let bundle = AlertBundle::from(parsed);
        assert_eq!(bundle.timezone, "Europe/London");
        assert!(!bundle.has_alerts());
    }

    #[test]
    fn onecall_alerts_are_mapped() {
        let body = r#"{
            "timezone": "America/Chicago",
            "alerts": [{
                "sender_name": "NWS Chicago",
                "event": "Wind Advisory",
                "start": 1700000000,
                "end": 1700036000,
                "description": "Gusts up to 50 mph",
                "tags": ["Wind"]
            }]
        }"#;
        let parsed: OwOneCallResponse = serde_json::from_str(body).expect("json");
        let bundle = AlertBundle::from(parsed);
        assert_eq!(bundle.alerts.len(), 1);
        assert_eq!(bundle.alerts[0].sender, "NWS Chicago");
        assert_eq!(bundle.alerts[0].event, "Wind Advisory");
    }
}
