//! Value wrappers shared by every response shape.
//!
//! Each weather field on the wire is an object shaped like
//! `{ "value": <scalar-or-null>, "units": "<unit>" }`. A field can be
//! missing because it was not requested, or `null` because the service had
//! no data for it. Both cases decode to an absent [`OptionalValue`], which
//! still lets callers branch uniformly:
//!
//! ```
//! use climacell_core::FloatValue;
//!
//! let temp: FloatValue = serde_json::from_str(r#"{"value": 21.5, "units": "C"}"#).unwrap();
//! let (value, ok) = temp.get_value();
//! assert!(ok);
//! assert_eq!(value, 21.5);
//! ```

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, DeserializeOwned},
    ser::SerializeStruct,
};
use thiserror::Error;

/// Point in time as reported by the service, keeping its original offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Error returned when a string is neither an RFC3339 date-time nor a bare
/// `YYYY-MM-DD` date.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is neither an RFC3339 date-time nor a YYYY-MM-DD date")]
pub struct TimestampError(pub(crate) String);

/// Parse a timestamp in either accepted encoding.
///
/// Accepts a full RFC3339 date-time or a zero-padded `YYYY-MM-DD` date,
/// nothing looser. A bare calendar date resolves to midnight with a zero
/// offset.
pub fn parse_time_or_date(raw: &str) -> Result<Timestamp, TimestampError> {
    let invalid = || TimestampError(raw.to_owned());
    let bytes = raw.as_bytes();

    // Both encodings start with a zero-padded `YYYY-MM-DD`. Only `T`/`t`
    // may separate it from the time.
    if bytes.len() < 10 || !is_padded_date(&bytes[..10]) {
        return Err(invalid());
    }
    if bytes.len() > 10 {
        if !matches!(bytes[10], b'T' | b't') {
            return Err(invalid());
        }
        return DateTime::parse_from_rfc3339(raw).map_err(|_| invalid());
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight: DateTime<Utc> = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));

    Ok(midnight.into())
}

fn is_padded_date(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Format a timestamp the way the service expects it in query parameters.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time_or_date(&raw).map_err(de::Error::custom)
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for f64 {}
    impl Sealed for i64 {}
    impl Sealed for String {}
    impl Sealed for super::Timestamp {}
}

/// Scalar kinds that can sit inside an [`OptionalValue`].
pub trait Scalar: Clone + fmt::Display + Serialize + sealed::Sealed {
    /// Value handed out when the field is absent.
    fn zero() -> Self;

    #[doc(hidden)]
    fn decode<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;
}

fn decode_plain<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer)
}

impl Scalar for f64 {
    fn zero() -> Self {
        0.0
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_plain(deserializer)
    }
}

impl Scalar for i64 {
    fn zero() -> Self {
        0
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_plain(deserializer)
    }
}

impl Scalar for String {
    fn zero() -> Self {
        String::new()
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        decode_plain(deserializer)
    }
}

impl Scalar for Timestamp {
    fn zero() -> Self {
        DateTime::<Utc>::default().into()
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_timestamp(deserializer)
    }
}

/// A field that may be absent, holding a scalar and its unit of measure.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalValue<T> {
    value: Option<T>,
    units: Option<String>,
}

pub type FloatValue = OptionalValue<f64>;
pub type IntValue = OptionalValue<i64>;
pub type StringValue = OptionalValue<String>;
pub type TimeValue = OptionalValue<Timestamp>;

impl<T> Default for OptionalValue<T> {
    fn default() -> Self {
        Self { value: None, units: None }
    }
}

impl<T: Scalar> OptionalValue<T> {
    pub fn new(value: T) -> Self {
        Self { value: Some(value), units: None }
    }

    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Returns the value and `true` when present, or the kind's zero value
    /// and `false` when absent.
    pub fn get_value(&self) -> (T, bool) {
        match &self.value {
            Some(v) => (v.clone(), true),
            None => (T::zero(), false),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Value followed by its units, e.g. `"21.5 C"`. `None` when absent.
    pub fn formatted(&self) -> Option<String> {
        let value = self.value.as_ref()?;
        Some(match self.units() {
            Some(units) if !units.is_empty() => format!("{value} {units}"),
            _ => value.to_string(),
        })
    }
}

struct Decoded<T>(T);

impl<'de, T: Scalar> Deserialize<'de> for Decoded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::decode(deserializer).map(Decoded)
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Scalar"))]
struct WireValue<T> {
    #[serde(default)]
    value: Option<Decoded<T>>,
    #[serde(default)]
    units: Option<String>,
}

impl<'de, T: Scalar> Deserialize<'de> for OptionalValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Option::<WireValue<T>>::deserialize(deserializer)?;

        Ok(wire
            .map(|w| Self { value: w.value.map(|Decoded(v)| v), units: w.units })
            .unwrap_or_default())
    }
}

impl<T: Scalar> Serialize for OptionalValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + usize::from(self.units.is_some());
        let mut state = serializer.serialize_struct("OptionalValue", len)?;
        state.serialize_field("value", &self.value)?;
        if let Some(units) = &self.units {
            state.serialize_field("units", units)?;
        }
        state.end()
    }
}

/// Anchor timestamp of a sample.
///
/// Always decodes to a valid point in time. A `null` (or missing) anchor is
/// accepted and leaves the zero timestamp in place; [`DateValue::is_unset`]
/// tells the two situations apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue {
    value: Timestamp,
    unset: bool,
}

impl Default for DateValue {
    fn default() -> Self {
        Self { value: Timestamp::zero(), unset: true }
    }
}

impl DateValue {
    pub fn new(value: Timestamp) -> Self {
        Self { value, unset: false }
    }

    /// The anchor timestamp. The Unix epoch when [`is_unset`](Self::is_unset).
    pub fn value(&self) -> Timestamp {
        self.value
    }

    /// `true` when the service sent `null` or omitted the anchor.
    pub fn is_unset(&self) -> bool {
        self.unset
    }

    pub fn get(&self) -> Option<Timestamp> {
        (!self.unset).then_some(self.value)
    }
}

#[derive(Deserialize)]
struct WireDate {
    #[serde(default)]
    value: Option<String>,
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<WireDate>::deserialize(deserializer)?.and_then(|w| w.value) {
            None => Ok(Self::default()),
            Some(raw) => parse_time_or_date(&raw).map(Self::new).map_err(de::Error::custom),
        }
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DateValue", 1)?;
        state.serialize_field("value", &self.get().map(|ts| format_timestamp(&ts)))?;
        state.end()
    }
}
