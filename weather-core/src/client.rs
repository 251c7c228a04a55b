use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::{
    cache::{CacheKey, CachedResponse, Clock, FetchCoalescer, ResponseCache, SystemClock},
    config::{Config, DEFAULT_TIMEOUT_SECS, Endpoints},
    error::{Result, WeatherError},
    model::{AlertBundle, CitySuggestion, Coordinates, CurrentConditions, Forecast},
    provider::{
        ProviderRequest, SUGGESTION_LIMIT,
        openweather::{OwCurrentResponse, OwForecastResponse, OwOneCallResponse, OwSuggestion},
    },
    report::WeatherSource,
    retry::{RetryConfig, with_retry},
};

/// Queries shorter than this never reach the provider.
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

/// Client for the weather provider. Owns its response cache for its whole
/// lifetime; construct one and hand it to whatever renders results.
#[derive(Debug)]
pub struct WeatherClient {
    api_key: String,
    endpoints: Endpoints,
    http: Client,
    retry: RetryConfig,
    cache: ResponseCache<CachedResponse>,
    coalescer: FetchCoalescer,
}

#[derive(Debug)]
pub struct WeatherClientBuilder {
    api_key: String,
    endpoints: Endpoints,
    timeout: Duration,
    ttl: Duration,
    retry: RetryConfig,
    clock: Arc<dyn Clock>,
}

impl WeatherClientBuilder {
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<WeatherClient> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        for url in [
            &self.endpoints.base_url,
            &self.endpoints.alerts_base_url,
            &self.endpoints.geo_base_url,
        ] {
            Url::parse(url).map_err(|e| WeatherError::InvalidEndpoint {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(WeatherError::HttpClient)?;

        Ok(WeatherClient {
            api_key: self.api_key,
            endpoints: self.endpoints,
            http,
            retry: self.retry,
            cache: ResponseCache::new(self.ttl, self.clock),
            coalescer: FetchCoalescer::new(),
        })
    }
}

impl WeatherClient {
    pub fn builder(api_key: impl Into<String>) -> WeatherClientBuilder {
        WeatherClientBuilder {
            api_key: api_key.into(),
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ttl: Config::default().cache_ttl(),
            retry: RetryConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or(WeatherError::MissingApiKey)?;

        Self::builder(api_key)
            .endpoints(config.endpoints.clone())
            .timeout(config.request_timeout())
            .cache_ttl(config.cache_ttl())
            .retry(config.retry.clone())
            .build()
    }

    /// The client's cache, for inspection.
    pub fn cache(&self) -> &ResponseCache<CachedResponse> {
        &self.cache
    }

    /// Current conditions by city name, memoized under `current:<city>`.
    pub async fn current_conditions(&self, city: &str) -> Result<CurrentConditions> {
        self.cached::<OwCurrentResponse, _>(
            CacheKey::current(city),
            ProviderRequest::CurrentByName(city.trim()),
            CachedResponse::Current,
            CachedResponse::into_current,
        )
        .await
    }

    /// Multi-day forecast by city name, memoized under `forecast:<city>`.
    /// The provider offers no coordinate form of this call.
    pub async fn forecast(&self, city: &str) -> Result<Forecast> {
        self.cached::<OwForecastResponse, _>(
            CacheKey::forecast(city),
            ProviderRequest::ForecastByName(city.trim()),
            CachedResponse::Forecast,
            CachedResponse::into_forecast,
        )
        .await
    }

    /// Current conditions at a point, memoized under `coords:<lat>:<lon>`.
    /// The returned `name` is what a follow-up [`forecast`](Self::forecast) needs.
    pub async fn conditions_by_coordinates(&self, coords: Coordinates) -> Result<CurrentConditions> {
        self.cached::<OwCurrentResponse, _>(
            CacheKey::coordinates(coords),
            ProviderRequest::CurrentByCoordinates(coords),
            CachedResponse::Current,
            CachedResponse::into_current,
        )
        .await
    }

    /// Severe-weather alerts. Never cached.
    pub async fn alerts(&self, coords: Coordinates) -> Result<AlertBundle> {
        let parsed: OwOneCallResponse = self.fetch(ProviderRequest::Alerts(coords)).await?;
        Ok(parsed.into())
    }

    /// Autocomplete suggestions, at most five.
    ///
    /// Suggestions are advisory: a query shorter than two characters returns
    /// nothing without a request, and any provider failure is logged and
    /// degrades to an empty list instead of an error.
    pub async fn city_suggestions(&self, query: &str) -> Vec<CitySuggestion> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            return Vec::new();
        }

        match self
            .fetch::<Vec<OwSuggestion>>(ProviderRequest::Suggestions(query))
            .await
        {
            Ok(found) => found
                .into_iter()
                .take(SUGGESTION_LIMIT as usize)
                .map(CitySuggestion::from)
                .collect(),
            Err(error) => {
                tracing::warn!(%error, query, "city suggestion lookup failed");
                Vec::new()
            }
        }
    }

    async fn cached<W, T>(
        &self,
        key: CacheKey,
        request: ProviderRequest<'_>,
        wrap: fn(T) -> CachedResponse,
        unwrap: fn(CachedResponse) -> Option<T>,
    ) -> Result<T>
    where
        W: DeserializeOwned,
        T: From<W> + Clone,
    {
        if let Some(hit) = self.cache.get(&key).and_then(unwrap) {
            return Ok(hit);
        }

        // Another task may have filled the entry while we waited.
        let _guard = self.coalescer.acquire(&key).await;
        if let Some(hit) = self.cache.get(&key).and_then(unwrap) {
            return Ok(hit);
        }

        let parsed: W = self.fetch(request).await?;
        let value = T::from(parsed);
        self.cache.insert(key, wrap(value.clone()));
        Ok(value)
    }

    async fn fetch<W: DeserializeOwned>(&self, request: ProviderRequest<'_>) -> Result<W> {
        let operation = request.operation();
        let url = request.url(&self.endpoints);
        let mut query = request.query();
        query.push(("appid", self.api_key.clone()));

        tracing::debug!(%operation, %url, "requesting provider");

        let response = with_retry(&self.retry, || self.http.get(&url).query(&query).send())
            .await
            .map_err(|e| WeatherError::transport(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%operation, %status, "provider returned failure status");
            return Err(WeatherError::fetch_failed(operation, Some(status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::transport(operation, e))?;

        serde_json::from_str(&body).map_err(|source| WeatherError::Decode { operation, source })
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current_conditions(&self, city: &str) -> Result<CurrentConditions> {
        WeatherClient::current_conditions(self, city).await
    }

    async fn forecast(&self, city: &str) -> Result<Forecast> {
        WeatherClient::forecast(self, city).await
    }

    async fn conditions_by_coordinates(&self, coords: Coordinates) -> Result<CurrentConditions> {
        WeatherClient::conditions_by_coordinates(self, coords).await
    }

    async fn city_suggestions(&self, query: &str) -> Vec<CitySuggestion> {
        WeatherClient::city_suggestions(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = WeatherClient::new("  ").unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[test]
    fn config_without_key_is_rejected() {
        let err = WeatherClient::from_config(&Config::default()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let endpoints = Endpoints {
            base_url: "not a url".into(),
            ..Endpoints::default()
        };
        let err = WeatherClient::builder("KEY").endpoints(endpoints).build().unwrap_err();
        assert!(matches!(err, WeatherError::InvalidEndpoint { .. }));
    }

    #[test]
    fn from_config_with_key_builds() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        let client = WeatherClient::from_config(&cfg).expect("client");
        assert!(client.cache().is_empty());
    }

    #[tokio::test]
    async fn finished_fetches_release_their_coalescing_slots() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = WeatherClient::builder("KEY")
            .endpoints(Endpoints::single(&server.uri()))
            .retry(RetryConfig::disabled())
            .build()
            .expect("client");

        for city in ["Atlantis", "Lemuria", "Mu", "Hy-Brasil"] {
            client.current_conditions(city).await.unwrap_err();
        }

        assert!(client.coalescer.is_empty());
        assert!(client.cache().is_empty());
    }
}
