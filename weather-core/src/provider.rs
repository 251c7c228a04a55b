use crate::{config::Endpoints, error::Operation, model::Coordinates};

pub mod openweather;

/// Maximum number of autocomplete suggestions requested from the provider.
pub const SUGGESTION_LIMIT: u8 = 5;

/// Every call the client can make. There is deliberately no forecast variant
/// taking coordinates: the provider's forecast is resolved by name only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderRequest<'a> {
    CurrentByName(&'a str),
    ForecastByName(&'a str),
    CurrentByCoordinates(Coordinates),
    Alerts(Coordinates),
    Suggestions(&'a str),
}

impl ProviderRequest<'_> {
    pub fn operation(&self) -> Operation {
        match self {
            ProviderRequest::CurrentByName(_) => Operation::CurrentWeather,
            ProviderRequest::ForecastByName(_) => Operation::Forecast,
            ProviderRequest::CurrentByCoordinates(_) => Operation::CoordinatesWeather,
            ProviderRequest::Alerts(_) => Operation::Alerts,
            ProviderRequest::Suggestions(_) => Operation::CitySuggestions,
        }
    }

    pub fn url(&self, endpoints: &Endpoints) -> String {
        let (base, path) = match self {
            ProviderRequest::CurrentByName(_) | ProviderRequest::CurrentByCoordinates(_) => {
                (&endpoints.base_url, "weather")
            }
            ProviderRequest::ForecastByName(_) => (&endpoints.base_url, "forecast"),
            ProviderRequest::Alerts(_) => (&endpoints.alerts_base_url, "onecall"),
            ProviderRequest::Suggestions(_) => (&endpoints.geo_base_url, "direct"),
        };
        format!("{}/{}", base.trim_end_matches('/'), path)
    }

    /// Query parameters, minus the API key which the client appends.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ProviderRequest::CurrentByName(city) | ProviderRequest::ForecastByName(city) => vec![
                ("q", (*city).to_string()),
                ("units", "metric".to_string()),
            ],
            ProviderRequest::CurrentByCoordinates(coords) => vec![
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("units", "metric".to_string()),
            ],
            ProviderRequest::Alerts(coords) => vec![
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("exclude", "minutely,hourly".to_string()),
                ("units", "metric".to_string()),
            ],
            ProviderRequest::Suggestions(query) => vec![
                ("q", (*query).to_string()),
                ("limit", SUGGESTION_LIMIT.to_string()),
            ],
        }
    }
}
