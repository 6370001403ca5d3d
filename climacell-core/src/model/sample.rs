//! Weather samples returned by the `/v3/weather/*` endpoints.
//!
//! A sample is one flat JSON object. Its fields are split into groups
//! (weather, air quality, fire index, road risk) that are decoded from the
//! same object; any field that fails to decode fails the whole sample.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::codes;
use crate::model::values::{DateValue, FloatValue, IntValue, StringValue, TimeValue};
use crate::request::Location;

/// A sample field whose JSON could not be decoded.
#[derive(Debug, Error)]
#[error("field `{field}`: {source} (received {received})")]
pub struct FieldError {
    pub field: &'static str,
    pub received: Value,
    pub source: serde_json::Error,
}

fn take<T>(object: &Map<String, Value>, field: &'static str) -> Result<T, FieldError>
where
    T: DeserializeOwned + Default,
{
    match object.get(field) {
        None => Ok(T::default()),
        Some(raw) => T::deserialize(raw).map_err(|source| FieldError {
            field,
            received: raw.clone(),
            source,
        }),
    }
}

macro_rules! value_group {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$field_meta:meta])* $field:ident: $ty:ty = $key:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $key)]
                pub $field: $ty,
            )*
        }

        impl $name {
            /// Wire names of every field in this group, usable as the
            /// `fields` of a request.
            pub const FIELDS: &'static [&'static str] = &[$($key),*];

            pub(crate) fn from_object(object: &Map<String, Value>) -> Result<Self, FieldError> {
                Ok(Self {
                    $( $field: take(object, $key)?, )*
                })
            }

            /// Present fields as `(wire name, "value units")` pairs, in
            /// declaration order.
            pub fn entries(&self) -> Vec<(&'static str, String)> {
                let mut entries = Vec::new();
                $(
                    if let Some(formatted) = self.$field.formatted() {
                        entries.push(($key, formatted));
                    }
                )*
                entries
            }
        }
    };
}

value_group! {
    /// Core weather conditions.
    pub struct WeatherFields {
        temperature: FloatValue = "temperature",
        /// Feels-like temperature, from wind chill and heat index.
        temperature_apparent: FloatValue = "temperatureApparent",
        dew_point: FloatValue = "dewPoint",
        /// Percent relative humidity.
        humidity: FloatValue = "humidity",
        wind_speed: FloatValue = "windSpeed",
        /// Degrees, 0 meaning the wind blows exactly north.
        wind_direction: FloatValue = "windDirection",
        wind_gust: FloatValue = "windGust",
        pressure_surface_level: FloatValue = "pressureSurfaceLevel",
        pressure_sea_level: FloatValue = "pressureSeaLevel",
        precipitation_intensity: FloatValue = "precipitationIntensity",
        /// Schuur classification of the falling precipitation.
        precipitation_type: StringValue = "precipitationType",
        /// Percent chance of precipitation; forecasts only.
        precipitation_probability: FloatValue = "precipitationProbability",
        sunrise_time: TimeValue = "sunriseTime",
        sunset_time: TimeValue = "sunsetTime",
        /// Shortwave radiation received by a horizontal surface.
        solar_ghi: FloatValue = "solarGHI",
        visibility: FloatValue = "visibility",
        cloud_cover: FloatValue = "cloudCover",
        cloud_base: FloatValue = "cloudBase",
        cloud_ceiling: FloatValue = "cloudCeiling",
        /// See [`codes::moon_phase_description`].
        moon_phase: StringValue = "moonPhase",
        /// See [`codes::weather_code_description`].
        weather_code: StringValue = "weatherCode",
    }
}

impl WeatherFields {
    /// Human readable weather condition, when the code is a known numeric one.
    pub fn condition(&self) -> Option<&'static str> {
        let code = self.weather_code.value()?.parse().ok()?;
        codes::weather_code_description(code)
    }
}

value_group! {
    /// Pollutant concentrations and air quality indices.
    pub struct AirQualityFields {
        pm25: FloatValue = "pm25",
        pm10: FloatValue = "pm10",
        o3: FloatValue = "o3",
        no2: FloatValue = "no2",
        co: FloatValue = "co",
        so2: FloatValue = "so2",
        /// US EPA air quality index.
        epa_aqi: IntValue = "epa_aqi",
        epa_primary_pollutant: StringValue = "epa_primary_pollutant",
        epa_health_concern: StringValue = "epa_health_concern",
        /// China MEE air quality index.
        china_aqi: IntValue = "china_aqi",
        china_primary_pollutant: StringValue = "china_primary_pollutant",
        china_health_concern: StringValue = "china_health_concern",
    }
}

value_group! {
    pub struct FireIndexFields {
        /// Fire risk on a 1-100 scale.
        fire_index: FloatValue = "fire_index",
    }
}

value_group! {
    /// Road conditions, EU and US locations only.
    pub struct RoadRiskFields {
        /// One of `low_risk`, `moderate_risk`, `mod_hi_risk`, `high_risk`,
        /// `extreme_risk`.
        road_risk: StringValue = "road_risk",
        road_risk_score: StringValue = "road_risk_score",
        /// Confidence of the prediction, 1-100.
        road_risk_confidence: IntValue = "road_risk_confidence",
        road_risk_conditions: StringValue = "road_risk_conditions",
    }
}

/// Where a sample applies, as echoed back by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl SampleLocation {
    fn from_object(object: &Map<String, Value>) -> Result<Self, FieldError> {
        Ok(Self {
            lat: take(object, "lat")?,
            lon: take(object, "lon")?,
            location_id: take(object, "location_id")?,
        })
    }

    /// The location as a request would name it. A location id wins over
    /// coordinates.
    pub fn location(&self) -> Option<Location> {
        if let Some(id) = &self.location_id {
            return Some(Location::id(id.clone()));
        }
        Some(Location::lat_lon(self.lat?, self.lon?))
    }
}

/// One data point from the realtime, forecast, nowcast or ClimaCell
/// historical endpoints.
///
/// Groups that were not requested carry only absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct WeatherSample {
    #[serde(flatten)]
    pub location: SampleLocation,
    pub observation_time: DateValue,
    #[serde(flatten)]
    pub weather: WeatherFields,
    #[serde(flatten)]
    pub air_quality: AirQualityFields,
    #[serde(flatten)]
    pub fire: FireIndexFields,
    #[serde(flatten)]
    pub road_risk: RoadRiskFields,
}

impl TryFrom<Map<String, Value>> for WeatherSample {
    type Error = FieldError;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            location: SampleLocation::from_object(&object)?,
            observation_time: take(&object, "observation_time")?,
            weather: WeatherFields::from_object(&object)?,
            air_quality: AirQualityFields::from_object(&object)?,
            fire: FireIndexFields::from_object(&object)?,
            road_risk: RoadRiskFields::from_object(&object)?,
        })
    }
}

/// One data point from the station historical endpoint, which only reports
/// core weather.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct StationSample {
    #[serde(flatten)]
    pub location: SampleLocation,
    pub observation_time: DateValue,
    #[serde(flatten)]
    pub weather: WeatherFields,
}

impl TryFrom<Map<String, Value>> for StationSample {
    type Error = FieldError;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            location: SampleLocation::from_object(&object)?,
            observation_time: take(&object, "observation_time")?,
            weather: WeatherFields::from_object(&object)?,
        })
    }
}
