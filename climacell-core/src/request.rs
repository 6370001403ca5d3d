//! Query parameters for weather data requests.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Timestamp, format_timestamp};

/// Ordered query parameters, ready to be URL encoded.
pub type Query = BTreeMap<&'static str, String>;

/// Anything that can be turned into request query parameters.
pub trait QueryParams {
    fn query_params(&self) -> Query;
}

/// The location weather data is requested for.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    /// Coordinates, sent as `lat` and `lon`.
    LatLon { lat: f64, lon: f64 },
    /// A location id created on the service, sent as `location_id`.
    Id(String),
}

impl Location {
    pub fn lat_lon(lat: f64, lon: f64) -> Self {
        Self::LatLon { lat, lon }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }
}

impl QueryParams for Location {
    fn query_params(&self) -> Query {
        match self {
            // `Display` for f64 prints the shortest round-tripping decimal and
            // never switches to exponent notation.
            Location::LatLon { lat, lon } => {
                Query::from([("lat", lat.to_string()), ("lon", lon.to_string())])
            }
            Location::Id(id) => Query::from([("location_id", id.clone())]),
        }
    }
}

/// Unit system for returned values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Si,
    Us,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Si => "si",
            UnitSystem::Us => "us",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Si, UnitSystem::Us]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown unit system '{0}'. Supported unit systems: si, us.")]
pub struct UnknownUnitSystem(String);

impl FromStr for UnitSystem {
    type Err = UnknownUnitSystem;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "si" => Ok(UnitSystem::Si),
            "us" => Ok(UnitSystem::Us),
            _ => Err(UnknownUnitSystem(value.to_owned())),
        }
    }
}

/// Options for the realtime, forecast, nowcast and historical endpoints.
///
/// A location is the one thing the service requires. It is not checked
/// here; a request without one comes back as a 400.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastArgs {
    pub location: Option<Location>,
    /// Start of the requested time range (`start_time`).
    pub start: Option<Timestamp>,
    /// End of the requested time range (`end_time`).
    pub end: Option<Timestamp>,
    /// Minutes between samples. Only the nowcast and ClimaCell historical
    /// endpoints accept it.
    pub timestep: Option<u32>,
    pub unit_system: Option<UnitSystem>,
    /// Field names such as `temperature` or `humidity`.
    pub fields: Vec<String>,
}

impl ForecastArgs {
    pub fn new(location: Location) -> Self {
        Self { location: Some(location), ..Self::default() }
    }

    pub fn with_start(mut self, start: impl Into<Timestamp>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<Timestamp>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn with_timestep(mut self, minutes: u32) -> Self {
        self.timestep = Some(minutes);
        self
    }

    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = Some(unit_system);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

impl QueryParams for ForecastArgs {
    fn query_params(&self) -> Query {
        let mut q = self.location.as_ref().map(QueryParams::query_params).unwrap_or_default();

        if let Some(start) = &self.start {
            q.insert("start_time", format_timestamp(start));
        }
        if let Some(end) = &self.end {
            q.insert("end_time", format_timestamp(end));
        }
        if let Some(timestep) = self.timestep.filter(|t| *t > 0) {
            q.insert("timestep", timestep.to_string());
        }
        if let Some(unit_system) = self.unit_system {
            q.insert("unit_system", unit_system.to_string());
        }
        if !self.fields.is_empty() {
            q.insert("fields", self.fields.join(","));
        }
        q
    }
}

/// GeoJSON geometry used to locate timeline requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// GeoJSON order: longitude first.
    pub coordinates: Vec<f64>,
}

impl Geometry {
    pub fn point(lat: f64, lon: f64) -> Self {
        Self { kind: "Point".to_string(), coordinates: vec![lon, lat] }
    }

    /// `(lat, lon)` of a point geometry.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some((*lat, *lon)),
            _ => None,
        }
    }
}

/// Options for the `/v4/timelines` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineOptions {
    pub location: Geometry,
    pub fields: Vec<String>,
    /// RFC3339 start of the window (`startTime`).
    pub start_time: Option<String>,
    /// RFC3339 end of the window (`endTime`).
    pub end_time: Option<String>,
    /// Timestep labels such as `1h` or `1d`.
    pub timesteps: Vec<String>,
}

impl QueryParams for TimelineOptions {
    fn query_params(&self) -> Query {
        let mut q = Query::new();

        if let Some((lat, lon)) = self.location.lat_lon() {
            q.insert("location", format!("{lat},{lon}"));
        }
        if !self.fields.is_empty() {
            q.insert("fields", self.fields.join(","));
        }
        if !self.timesteps.is_empty() {
            q.insert("timesteps", self.timesteps.join(","));
        }
        if let Some(start) = self.start_time.as_deref().filter(|s| !s.is_empty()) {
            q.insert("startTime", start.to_string());
        }
        if let Some(end) = self.end_time.as_deref().filter(|s| !s.is_empty()) {
            q.insert("endTime", end.to_string());
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn params(pairs: &[(&'static str, &str)]) -> Query {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn lat_lon_uses_minimal_precision() {
        let q = Location::lat_lon(35.816735, -78.613375).query_params();
        assert_eq!(q, params(&[("lat", "35.816735"), ("lon", "-78.613375")]));

        let q = Location::lat_lon(40.0, 1e-7).query_params();
        assert_eq!(q, params(&[("lat", "40"), ("lon", "0.0000001")]));
    }

    #[test]
    fn location_id_is_opaque() {
        let q = Location::id("5f1b0f6c").query_params();
        assert_eq!(q, params(&[("location_id", "5f1b0f6c")]));
    }

    #[test]
    fn forecast_args_only_emit_set_options() {
        let args = ForecastArgs::new(Location::lat_lon(35.816735, -78.613375))
            .with_fields(["temperature", "humidity"])
            .with_unit_system(UnitSystem::Us);

        assert_eq!(
            args.query_params(),
            params(&[
                ("lat", "35.816735"),
                ("lon", "-78.613375"),
                ("fields", "temperature,humidity"),
                ("unit_system", "us"),
            ])
        );
    }

    #[test]
    fn forecast_args_format_time_range() {
        let start = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap();
        let end = DateTime::parse_from_rfc3339("2021-03-01T18:30:00-05:00").unwrap();

        let q = ForecastArgs::new(Location::id("abc"))
            .with_start(start)
            .with_end(end)
            .with_timestep(5)
            .query_params();

        assert_eq!(q["start_time"], "2021-03-01T12:00:00Z");
        assert_eq!(q["end_time"], "2021-03-01T18:30:00-05:00");
        assert_eq!(q["timestep"], "5");
    }

    #[test]
    fn epoch_start_is_still_sent() {
        let epoch: DateTime<FixedOffset> = DateTime::<Utc>::default().into();
        let q = ForecastArgs { start: Some(epoch), ..ForecastArgs::default() }.query_params();
        assert_eq!(q["start_time"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn zero_timestep_and_missing_location_are_omitted() {
        let q = ForecastArgs::default().with_timestep(0).query_params();
        assert!(q.is_empty());
    }

    #[test]
    fn unit_system_roundtrip() {
        for unit in UnitSystem::all() {
            let parsed: UnitSystem = unit.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*unit, parsed);
        }
        assert_eq!("US".parse::<UnitSystem>(), Ok(UnitSystem::Us));
    }

    #[test]
    fn unknown_unit_system_error() {
        let err = "metric".parse::<UnitSystem>().unwrap_err();
        assert!(err.to_string().contains("Unknown unit system 'metric'"));
    }

    #[test]
    fn timeline_options_query() {
        let opts = TimelineOptions {
            location: Geometry::point(35.816735, -78.613375),
            fields: vec!["temperature".into()],
            start_time: Some("2021-03-01T12:00:00Z".into()),
            end_time: None,
            timesteps: vec!["1h".into(), "1d".into()],
        };

        assert_eq!(
            opts.query_params(),
            params(&[
                ("location", "35.816735,-78.613375"),
                ("fields", "temperature"),
                ("timesteps", "1h,1d"),
                ("startTime", "2021-03-01T12:00:00Z"),
            ])
        );
    }

    #[test]
    fn geometry_is_geojson_ordered() {
        let point = Geometry::point(35.0, -78.5);
        assert_eq!(point.coordinates, vec![-78.5, 35.0]);
        assert_eq!(point.lat_lon(), Some((35.0, -78.5)));

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Point", "coordinates": [-78.5, 35.0]}));
    }
}
