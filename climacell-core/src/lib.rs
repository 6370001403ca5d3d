//! Client library for the ClimaCell weather API.
//!
//! This crate defines:
//! - Request options and their query parameters (location, time range, fields)
//! - Typed responses built from optional value wrappers, tolerant of missing
//!   fields and of both timestamp encodings the service uses
//! - An async HTTP client with one operation per endpoint family
//! - Configuration & credentials handling
//!
//! It is used by `climacell-cli`, but can also be reused by other binaries or services.
//!
//! ```no_run
//! use climacell_core::{ClimacellApi, ClimacellClient, ForecastArgs, Location, UnitSystem};
//!
//! # async fn run() -> climacell_core::Result<()> {
//! let client = ClimacellClient::new("API_KEY", climacell_core::config::DEFAULT_BASE_URL)?;
//! let args = ForecastArgs::new(Location::lat_lon(35.816735, -78.613375))
//!     .with_fields(["temperature", "humidity"])
//!     .with_unit_system(UnitSystem::Us);
//!
//! let now = client.realtime(&args).await?;
//! if let (temp, true) = now.weather.temperature.get_value() {
//!     println!("{temp}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod request;

pub use api::{ClimacellApi, Endpoint, client::ClimacellClient, client_from_config};
pub use config::Config;
pub use error::{ClimacellError, Result};
pub use model::{
    DateValue, FloatValue, IntValue, OptionalValue, StationSample, StringValue, TimeValue,
    TimelineList, Timestamp, WeatherSample, parse_time_or_date,
};
pub use request::{
    ForecastArgs, Geometry, Location, QueryParams, TimelineOptions, UnitSystem,
};
