pub use reqwest::StatusCode;
use thiserror::Error;

/// The provider call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentWeather,
    Forecast,
    CoordinatesWeather,
    Alerts,
    CitySuggestions,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CurrentWeather => "current weather",
            Operation::Forecast => "forecast",
            Operation::CoordinatesWeather => "coordinates weather",
            Operation::Alerts => "alerts",
            Operation::CitySuggestions => "city suggestions",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    /// Non-success status (`status` is set) or a transport failure such as a
    /// timeout or refused connection (`status` is `None`).
    #[error("failed to fetch {operation}{}", status_suffix(.status))]
    FetchFailed {
        operation: Operation,
        status: Option<StatusCode>,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("malformed {operation} response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("city name is empty")]
    EmptyCity,

    #[error(
        "No API key configured.\n\
         Hint: run `weather configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl WeatherError {
    pub fn fetch_failed(operation: Operation, status: Option<StatusCode>) -> Self {
        Self::FetchFailed {
            operation,
            status,
            source: None,
        }
    }

    pub fn transport(operation: Operation, source: reqwest::Error) -> Self {
        Self::FetchFailed {
            operation,
            status: source.status(),
            source: Some(source),
        }
    }

    /// HTTP status of a failed fetch, when the provider answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::FetchFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// The operation this error was raised for, if it came from a provider call.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::FetchFailed { operation, .. } | Self::Decode { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!(" (HTTP {})", status.as_u16()),
        None => String::new(),
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
