//! Current conditions plus forecast for one location.
//!
//! The provider's forecast is resolved by name only, so a coordinate lookup
//! is a two-step protocol: current conditions at the point first, then the
//! forecast for the place name those conditions resolved to.

use async_trait::async_trait;

use crate::{
    error::{Result, WeatherError},
    model::{CitySuggestion, Coordinates, CurrentConditions, Forecast, Location},
};

/// The fetch operations a view drives.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_conditions(&self, city: &str) -> Result<CurrentConditions>;

    async fn forecast(&self, city: &str) -> Result<Forecast>;

    async fn conditions_by_coordinates(&self, coords: Coordinates) -> Result<CurrentConditions>;

    async fn city_suggestions(&self, query: &str) -> Vec<CitySuggestion>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

pub async fn fetch_report<S>(source: &S, location: &Location) -> Result<WeatherReport>
where
    S: WeatherSource + ?Sized,
{
    match location {
        Location::Name(city) => {
            let city = city.trim();
            if city.is_empty() {
                return Err(WeatherError::EmptyCity);
            }

            let (current, forecast) =
                tokio::try_join!(source.current_conditions(city), source.forecast(city))?;
            Ok(WeatherReport { current, forecast })
        }
        Location::Coordinates(coords) => {
            let current = source.conditions_by_coordinates(*coords).await?;

            let city = current.name.trim();
            if city.is_empty() {
                tracing::debug!(?coords, "coordinates resolved to no place name");
                return Err(WeatherError::EmptyCity);
            }

            let forecast = source.forecast(city).await?;
            Ok(WeatherReport { current, forecast })
        }
    }
}
