use anyhow::{Context, bail};
use chrono::{Duration, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use climacell_core::{
    ClimacellApi, Config, ForecastArgs, Geometry, Location, TimelineOptions, Timestamp,
    UnitSystem, client_from_config, model::WeatherFields, parse_time_or_date,
};
use inquire::{Password, Select};
use tracing::debug;

use crate::output;

/// Environment variable holding the API key. Takes precedence over the config file.
pub const API_KEY_ENV: &str = "CLIMACELL_API_KEY";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climacell", version, about = "ClimaCell weather CLI")]
pub struct Cli {
    /// Print decoded responses as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default unit system.
    Configure,

    #[command(flatten)]
    Query(QueryCommand),
}

#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Current conditions.
    Realtime(QueryArgs),

    /// Hourly forecast.
    Hourly(QueryArgs),

    /// Minute-level forecast; see --timestep.
    Nowcast(QueryArgs),

    /// Past samples from the ClimaCell model.
    Historical(QueryArgs),

    /// Past samples from weather stations.
    Station(QueryArgs),

    /// Timeline buckets for the next hours.
    Timeline(TimelineArgs),
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    #[arg(long, allow_negative_numbers = true, requires = "lon", conflicts_with = "location_id")]
    pub lat: Option<f64>,

    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Location id created on the service.
    #[arg(long)]
    pub location_id: Option<String>,
}

impl LocationArgs {
    fn location(&self) -> Option<Location> {
        match (&self.location_id, self.lat, self.lon) {
            (Some(id), _, _) => Some(Location::id(id.clone())),
            (None, Some(lat), Some(lon)) => Some(Location::lat_lon(lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Comma-separated field names; defaults to every core weather field.
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Start of the time range (RFC3339 or YYYY-MM-DD).
    #[arg(long, value_parser = parse_time_or_date)]
    pub start: Option<Timestamp>,

    /// End of the time range (RFC3339 or YYYY-MM-DD).
    #[arg(long, value_parser = parse_time_or_date)]
    pub end: Option<Timestamp>,

    /// Minutes between samples (nowcast and historical only).
    #[arg(long)]
    pub timestep: Option<u32>,

    /// Unit system: si or us. Defaults to the configured one.
    #[arg(long)]
    pub units: Option<UnitSystem>,
}

impl QueryArgs {
    fn into_forecast_args(self, config: &Config) -> ForecastArgs {
        let fields = if self.fields.is_empty() {
            WeatherFields::FIELDS.iter().map(|f| f.to_string()).collect()
        } else {
            self.fields
        };

        ForecastArgs {
            location: self.location.location(),
            start: self.start,
            end: self.end,
            timestep: self.timestep,
            unit_system: self.units.or(config.unit_system),
            fields,
        }
    }
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    #[arg(long, value_delimiter = ',', default_value = "temperature")]
    pub fields: Vec<String>,

    /// Comma-separated timestep labels, e.g. 1h,1d.
    #[arg(long, value_delimiter = ',', default_value = "1d")]
    pub timesteps: Vec<String>,

    /// Length of the window starting now.
    #[arg(long, default_value_t = 48)]
    pub hours: u32,
}

impl TimelineArgs {
    fn into_options(self) -> TimelineOptions {
        let start = Utc::now();
        let end = start + Duration::hours(i64::from(self.hours));

        TimelineOptions {
            location: Geometry::point(self.lat, self.lon),
            fields: self.fields,
            start_time: Some(start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            end_time: Some(end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            timesteps: self.timesteps,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Query(query) => {
                let config = load_config()?;
                let client = client_from_config(&config)?;

                query.run(client.as_ref(), &config, self.json).await
            }
        }
    }
}

impl QueryCommand {
    async fn run(self, client: &dyn ClimacellApi, config: &Config, json: bool) -> anyhow::Result<()> {
        match self {
            QueryCommand::Realtime(args) => {
                let sample = client.realtime(&args.into_forecast_args(config)).await?;
                output::print(&sample, json, output::weather_sample)
            }
            QueryCommand::Hourly(args) => {
                let samples = client.hourly_forecast(&args.into_forecast_args(config)).await?;
                output::print_all(&samples, json, output::weather_sample)
            }
            QueryCommand::Nowcast(args) => {
                let samples = client.nowcast(&args.into_forecast_args(config)).await?;
                output::print_all(&samples, json, output::weather_sample)
            }
            QueryCommand::Historical(args) => {
                let samples = client.historical_climacell(&args.into_forecast_args(config)).await?;
                output::print_all(&samples, json, output::weather_sample)
            }
            QueryCommand::Station(args) => {
                let samples = client.historical_station(&args.into_forecast_args(config)).await?;
                output::print_all(&samples, json, output::station_sample)
            }
            QueryCommand::Timeline(args) => {
                let list = client.timelines(&args.into_options()).await?;
                output::print(&list, json, output::timeline_list)
            }
        }
    }
}

/// Config file plus the API key from the environment, if set.
fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
        debug!(source = API_KEY_ENV, "Using API key from environment");
        config.set_api_key(key);
    } else if config.api_key().is_some() {
        debug!(source = "config file", "Using API key from config file");
    }

    debug!(base_url = %config.base_url(), timeout = ?config.timeout(), "Resolved configuration");
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    let api_key = Password::new("ClimaCell API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let unit_system = Select::new("Default unit system:", UnitSystem::all().to_vec())
        .prompt()
        .context("Failed to read unit system")?;

    config.set_api_key(api_key.trim().to_string());
    config.unit_system = Some(unit_system);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("climacell").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn realtime_with_coordinates() {
        let cli = parse(&["realtime", "--lat", "35.816735", "--lon", "-78.613375", "--units", "us"]);
        let Command::Query(QueryCommand::Realtime(args)) = cli.command else { panic!("expected realtime") };

        let forecast = args.into_forecast_args(&Config::default());
        assert_eq!(forecast.location, Some(Location::lat_lon(35.816735, -78.613375)));
        assert_eq!(forecast.unit_system, Some(UnitSystem::Us));
        assert_eq!(forecast.fields.len(), WeatherFields::FIELDS.len());
    }

    #[test]
    fn configured_unit_system_is_the_fallback() {
        let cli = parse(&["hourly", "--location-id", "home", "--fields", "temperature,humidity"]);
        let Command::Query(QueryCommand::Hourly(args)) = cli.command else { panic!("expected hourly") };

        let config = Config { unit_system: Some(UnitSystem::Us), ..Config::default() };
        let forecast = args.into_forecast_args(&config);
        assert_eq!(forecast.location, Some(Location::id("home")));
        assert_eq!(forecast.fields, ["temperature", "humidity"]);
        assert_eq!(forecast.unit_system, Some(UnitSystem::Us));
    }

    #[test]
    fn start_accepts_bare_date() {
        let cli = parse(&["historical", "--lat", "1", "--lon", "2", "--start", "2021-02-28"]);
        let Command::Query(QueryCommand::Historical(args)) = cli.command else { panic!("expected historical") };
        assert_eq!(args.start.map(|s| s.timestamp()), Some(1_614_470_400));
    }

    #[test]
    fn lat_requires_lon() {
        let res = Cli::try_parse_from(["climacell", "nowcast", "--lat", "35.0"]);
        assert!(res.is_err());
    }

    #[test]
    fn location_is_optional() {
        let cli = parse(&["nowcast", "--timestep", "5"]);
        let Command::Query(QueryCommand::Nowcast(args)) = cli.command else { panic!("expected nowcast") };
        let forecast = args.into_forecast_args(&Config::default());
        assert_eq!(forecast.location, None);
        assert_eq!(forecast.timestep, Some(5));
    }

    #[test]
    fn timeline_defaults() {
        let cli = parse(&["timeline", "--lat", "35.816735", "--lon", "-78.613375"]);
        let Command::Query(QueryCommand::Timeline(args)) = cli.command else { panic!("expected timeline") };

        let options = args.into_options();
        assert_eq!(options.location.lat_lon(), Some((35.816735, -78.613375)));
        assert_eq!(options.fields, ["temperature"]);
        assert_eq!(options.timesteps, ["1d"]);

        let start = parse_time_or_date(options.start_time.as_deref().unwrap()).unwrap();
        let end = parse_time_or_date(options.end_time.as_deref().unwrap()).unwrap();
        assert_eq!((end - start).num_hours(), 48);
    }
}
