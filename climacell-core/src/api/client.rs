use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    error::{ClimacellError, Result},
    model::{StationSample, TimelineList, WeatherSample},
    request::{ForecastArgs, QueryParams, TimelineOptions},
};

use super::{ClimacellApi, Endpoint};

const API_KEY_HEADER: &str = "apikey";

/// HTTP client for the ClimaCell API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ClimacellClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl ClimacellClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, base_url, Config::default().timeout())
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(ClimacellError::Client)?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or(ClimacellError::MissingApiKey)?;

        Self::with_timeout(api_key, config.base_url(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &impl QueryParams,
    ) -> Result<T> {
        let url = self.url(endpoint);
        let params = query.query_params();
        debug!(%url, ?params, "Sending request");

        let res = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|source| ClimacellError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ClimacellError::Transport { endpoint, source })?;

        if !status.is_success() {
            let message = remote_message(status, &body);
            warn!(%status, %message, "Request rejected");
            return Err(ClimacellError::Remote { endpoint, status, message });
        }

        serde_json::from_str(&body).map_err(|source| ClimacellError::Decode { endpoint, source })
    }
}

#[async_trait]
impl ClimacellApi for ClimacellClient {
    #[instrument(skip_all, fields(endpoint = %Endpoint::Realtime))]
    async fn realtime(&self, args: &ForecastArgs) -> Result<WeatherSample> {
        self.fetch(Endpoint::Realtime, args).await
    }

    #[instrument(skip_all, fields(endpoint = %Endpoint::HourlyForecast))]
    async fn hourly_forecast(&self, args: &ForecastArgs) -> Result<Vec<WeatherSample>> {
        let samples: Vec<WeatherSample> = self.fetch(Endpoint::HourlyForecast, args).await?;
        debug!(count = samples.len(), "Decoded samples");
        Ok(samples)
    }

    #[instrument(skip_all, fields(endpoint = %Endpoint::Nowcast))]
    async fn nowcast(&self, args: &ForecastArgs) -> Result<Vec<WeatherSample>> {
        let samples: Vec<WeatherSample> = self.fetch(Endpoint::Nowcast, args).await?;
        debug!(count = samples.len(), "Decoded samples");
        Ok(samples)
    }

    #[instrument(skip_all, fields(endpoint = %Endpoint::HistoricalClimacell))]
    async fn historical_climacell(&self, args: &ForecastArgs) -> Result<Vec<WeatherSample>> {
        let samples: Vec<WeatherSample> = self.fetch(Endpoint::HistoricalClimacell, args).await?;
        debug!(count = samples.len(), "Decoded samples");
        Ok(samples)
    }

    #[instrument(skip_all, fields(endpoint = %Endpoint::HistoricalStation))]
    async fn historical_station(&self, args: &ForecastArgs) -> Result<Vec<StationSample>> {
        let samples: Vec<StationSample> = self.fetch(Endpoint::HistoricalStation, args).await?;
        debug!(count = samples.len(), "Decoded samples");
        Ok(samples)
    }

    #[instrument(skip_all, fields(endpoint = %Endpoint::Timelines))]
    async fn timelines(&self, options: &TimelineOptions) -> Result<TimelineList> {
        let list: TimelineList = self.fetch(Endpoint::Timelines, options).await?;
        debug!(count = list.timelines.len(), "Decoded timelines");
        Ok(list)
    }
}

// v3 errors carry `errorCode`, v4 errors carry `type`; both carry `message`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteErrorBody {
    #[serde(alias = "type")]
    error_code: Option<String>,
    message: Option<String>,
}

fn remote_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RemoteErrorBody>(body) {
        match (parsed.error_code, parsed.message) {
            (Some(code), Some(message)) => return format!("{code}: {message}"),
            (None, Some(message)) => return message,
            (Some(code), None) => return code,
            (None, None) => {}
        }
    }

    if body.trim().is_empty() {
        return status.canonical_reason().unwrap_or("no response body").to_string();
    }
    truncate_body(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
