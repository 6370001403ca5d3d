//! Response shape of the `/v4/timelines` endpoint.
//!
//! Unlike the v3 samples, interval values are bare scalars keyed by field
//! name, and daily timesteps report aggregates as `<field>Max`,
//! `<field>Min`, `<field>Avg`, `<field>MaxTime` and `<field>MinTime`.

use serde::{Deserialize, Serialize, de};
use serde_json::{Map, Value};

use crate::model::values::{Timestamp, TimestampError, deserialize_timestamp, parse_time_or_date};

/// All timelines returned for one request, one per requested timestep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimelineEnvelope")]
pub struct TimelineList {
    #[serde(rename = "data")]
    pub timelines: Vec<Timeline>,
}

// The service has answered both `{"data": [...]}` and
// `{"data": {"timelines": [...]}}`.
#[derive(Deserialize)]
struct TimelineEnvelope {
    data: Value,
}

impl TryFrom<TimelineEnvelope> for TimelineList {
    type Error = serde_json::Error;

    fn try_from(envelope: TimelineEnvelope) -> Result<Self, Self::Error> {
        let timelines = match envelope.data {
            list @ Value::Array(_) => Vec::<Timeline>::deserialize(list)?,
            Value::Object(mut object) => match object.remove("timelines") {
                Some(list) => Vec::<Timeline>::deserialize(list)?,
                None => return Err(de::Error::missing_field("timelines")),
            },
            other => {
                return Err(de::Error::custom(format!(
                    "expected timelines under `data`, received {other}"
                )));
            }
        };

        Ok(Self { timelines })
    }
}

impl TimelineList {
    /// The timeline for a timestep label such as `"1d"`.
    pub fn timestep(&self, label: &str) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.timestep == label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub timestep: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: Timestamp,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end_time: Timestamp,
    #[serde(default)]
    pub intervals: Vec<Interval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: Timestamp,
    #[serde(default)]
    pub values: IntervalValues,
}

/// Field values of one interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalValues(Map<String, Value>);

impl IntervalValues {
    /// Raw value; `null` counts as missing.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Numeric value. `None` when missing or not a number; use
    /// [`IntervalValues::get`] to tell the two apart.
    pub fn float(&self, field: &str) -> Option<f64> {
        self.get(field)?.as_f64()
    }

    /// Integer value. `None` when missing or not an integer.
    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field)?.as_i64()
    }

    /// String value. `None` when missing or not a string.
    pub fn string(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_str()
    }

    /// Timestamp field in either RFC3339 or `YYYY-MM-DD` form.
    ///
    /// `Ok(None)` when missing. A present value that is not a valid
    /// timestamp string is an error.
    pub fn timestamp(&self, field: &str) -> Result<Option<Timestamp>, TimestampError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(raw)) => parse_time_or_date(raw).map(Some),
            Some(other) => Err(TimestampError(other.to_string())),
        }
    }

    /// Daily statistics of `field`. Fails when one of the `MaxTime` or
    /// `MinTime` values is malformed.
    pub fn aggregate(&self, field: &str) -> Result<Aggregate, TimestampError> {
        Ok(Aggregate {
            max: self.float(&format!("{field}Max")),
            min: self.float(&format!("{field}Min")),
            avg: self.float(&format!("{field}Avg")),
            max_time: self.timestamp(&format!("{field}MaxTime"))?,
            min_time: self.timestamp(&format!("{field}MinTime"))?,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Statistics of one field over an interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregate {
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max_time: Option<Timestamp>,
    pub min_time: Option<Timestamp>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::json;

    fn daily_timeline() -> Value {
        json!({
            "timestep": "1d",
            "startTime": "2021-03-01T06:00:00Z",
            "endTime": "2021-03-03T06:00:00Z",
            "intervals": [
                {
                    "startTime": "2021-03-01T06:00:00Z",
                    "values": {
                        "temperature": 12.5,
                        "temperatureMax": 18.0,
                        "temperatureMin": 4.25,
                        "temperatureMaxTime": "2021-03-01T20:00:00Z",
                        "weatherCode": 1100,
                        "sunriseTime": "2021-03-01",
                        "precipitationType": null
                    }
                },
                {
                    "startTime": "2021-03-02T06:00:00Z",
                    "values": {"temperature": 14.0}
                }
            ]
        })
    }

    #[test]
    fn decodes_flat_data_list() {
        let list: TimelineList =
            serde_json::from_value(json!({"data": [daily_timeline()]})).unwrap();

        assert_eq!(list.timelines.len(), 1);
        let timeline = list.timestep("1d").unwrap();
        assert_eq!(timeline.intervals.len(), 2);
        assert_eq!(
            timeline.intervals[1].start_time,
            DateTime::parse_from_rfc3339("2021-03-02T06:00:00Z").unwrap()
        );
    }

    #[test]
    fn decodes_nested_timelines() {
        let list: TimelineList =
            serde_json::from_value(json!({"data": {"timelines": [daily_timeline()]}})).unwrap();
        assert_eq!(list.timelines[0].timestep, "1d");
        assert!(list.timestep("1h").is_none());
    }

    #[test]
    fn rejects_unexpected_data() {
        let err = serde_json::from_value::<TimelineList>(json!({"data": 5})).unwrap_err();
        assert!(err.to_string().contains("received 5"));

        let err = serde_json::from_value::<TimelineList>(json!({"data": {}})).unwrap_err();
        assert!(err.to_string().contains("timelines"));
    }

    #[test]
    fn typed_value_accessors() {
        let list: TimelineList =
            serde_json::from_value(json!({"data": [daily_timeline()]})).unwrap();
        let values = &list.timelines[0].intervals[0].values;

        assert_eq!(values.float("temperature"), Some(12.5));
        assert_eq!(values.integer("weatherCode"), Some(1100));
        assert_eq!(values.get("precipitationType"), None);
        assert_eq!(
            values.timestamp("sunriseTime"),
            Ok(Some(DateTime::parse_from_rfc3339("2021-03-01T00:00:00Z").unwrap()))
        );
        assert_eq!(values.timestamp("sunsetTime"), Ok(None));
        assert_eq!(values.float("humidity"), None);
    }

    #[test]
    fn malformed_timestamp_is_not_missing() {
        let values: IntervalValues = serde_json::from_value(json!({
            "sunriseTime": "2021-3-1",
            "sunsetTime": 1614556800,
            "temperatureMaxTime": "soon"
        }))
        .unwrap();

        let err = values.timestamp("sunriseTime").unwrap_err();
        assert!(err.to_string().contains("2021-3-1"));
        assert!(values.timestamp("sunsetTime").is_err());
        assert!(values.aggregate("temperature").is_err());
    }

    #[test]
    fn serialized_list_decodes_again() {
        let list: TimelineList =
            serde_json::from_value(json!({"data": {"timelines": [daily_timeline()]}})).unwrap();

        let json = serde_json::to_value(&list).unwrap();
        assert!(json["data"].is_array());

        let again: TimelineList = serde_json::from_value(json).unwrap();
        assert_eq!(again, list);
    }

    #[test]
    fn aggregate_collects_statistics() {
        let list: TimelineList =
            serde_json::from_value(json!({"data": [daily_timeline()]})).unwrap();
        let intervals = &list.timelines[0].intervals;

        let stats = intervals[0].values.aggregate("temperature").unwrap();
        assert_eq!(stats.max, Some(18.0));
        assert_eq!(stats.min, Some(4.25));
        assert_eq!(stats.avg, None);
        assert!(stats.max_time.is_some());
        assert!(stats.min_time.is_none());

        assert!(intervals[1].values.aggregate("temperature").unwrap().is_empty());
    }
}
