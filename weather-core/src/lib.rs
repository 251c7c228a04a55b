//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - A caching client for the OpenWeather HTTP API
//! - The error taxonomy for provider calls
//! - Shared domain models (conditions, forecasts, suggestions, alerts)
//! - Configuration, favourites storage and the contract views implement
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod favourites;
pub mod model;
pub mod presentation;
pub mod provider;
pub mod report;
pub mod retry;
pub mod suggest;

pub use cache::{CacheKey, Clock, ManualClock, SystemClock};
pub use client::{WeatherClient, WeatherClientBuilder};
pub use config::{Config, Endpoints};
pub use error::{Operation, WeatherError};
pub use favourites::{FavouritesStore, FileFavourites, MemoryFavourites};
pub use model::{
    AlertBundle, CitySuggestion, ConditionDescriptor, Coordinates, CurrentConditions, Forecast,
    ForecastEntry, Location, TemperatureUnit, WeatherAlert,
};
pub use presentation::WeatherView;
pub use report::{WeatherReport, WeatherSource, fetch_report};
pub use retry::RetryConfig;
pub use suggest::SuggestionSequencer;
