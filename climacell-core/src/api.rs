use crate::{
    Config,
    api::client::ClimacellClient,
    error::Result,
    model::{StationSample, TimelineList, WeatherSample},
    request::{ForecastArgs, TimelineOptions},
};
use async_trait::async_trait;
use std::{fmt::Debug, str::FromStr};
use thiserror::Error;

pub mod client;

/// The API endpoint families this crate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Realtime,
    HourlyForecast,
    Nowcast,
    HistoricalClimacell,
    HistoricalStation,
    Timelines,
}

impl Endpoint {
    /// Short name, as accepted by [`Endpoint::try_from`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Realtime => "realtime",
            Endpoint::HourlyForecast => "hourly",
            Endpoint::Nowcast => "nowcast",
            Endpoint::HistoricalClimacell => "historical",
            Endpoint::HistoricalStation => "station",
            Endpoint::Timelines => "timelines",
        }
    }

    /// Versioned path relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Realtime => "/v3/weather/realtime",
            Endpoint::HourlyForecast => "/v3/weather/forecast/hourly",
            Endpoint::Nowcast => "/v3/weather/nowcast",
            Endpoint::HistoricalClimacell => "/v3/weather/historical/climacell",
            Endpoint::HistoricalStation => "/v3/weather/historical/station",
            Endpoint::Timelines => "/v4/timelines",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Realtime,
            Endpoint::HourlyForecast,
            Endpoint::Nowcast,
            Endpoint::HistoricalClimacell,
            Endpoint::HistoricalStation,
            Endpoint::Timelines,
        ]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "Unknown endpoint '{0}'. Supported endpoints: realtime, hourly, nowcast, historical, station, timelines."
)]
pub struct UnknownEndpoint(String);

impl TryFrom<&str> for Endpoint {
    type Error = UnknownEndpoint;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        Endpoint::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == lower)
            .ok_or_else(|| UnknownEndpoint(value.to_owned()))
    }
}

impl FromStr for Endpoint {
    type Err = UnknownEndpoint;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Endpoint::try_from(value)
    }
}

/// One operation per endpoint family.
///
/// Every call is independent: nothing is cached or shared between calls.
#[async_trait]
pub trait ClimacellApi: Send + Sync + Debug {
    /// Current conditions.
    async fn realtime(&self, args: &ForecastArgs) -> Result<WeatherSample>;

    async fn hourly_forecast(&self, args: &ForecastArgs) -> Result<Vec<WeatherSample>>;

    /// Minute-level forecast for the next hours, spaced by `timestep`.
    async fn nowcast(&self, args: &ForecastArgs) -> Result<Vec<WeatherSample>>;

    /// Past samples from the ClimaCell model.
    async fn historical_climacell(&self, args: &ForecastArgs) -> Result<Vec<WeatherSample>>;

    /// Past samples from weather stations; core weather fields only.
    async fn historical_station(&self, args: &ForecastArgs) -> Result<Vec<StationSample>>;

    async fn timelines(&self, options: &TimelineOptions) -> Result<TimelineList>;
}

/// Construct a client from config.
pub fn client_from_config(config: &Config) -> Result<Box<dyn ClimacellApi>> {
    Ok(Box::new(ClimacellClient::from_config(config)?))
}
