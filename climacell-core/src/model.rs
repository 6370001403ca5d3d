//! Typed response shapes and the value wrappers they are built from.

pub mod codes;
pub mod sample;
pub mod timeline;
pub mod values;

pub use sample::{
    AirQualityFields, FieldError, FireIndexFields, RoadRiskFields, SampleLocation, StationSample,
    WeatherFields, WeatherSample,
};
pub use timeline::{Aggregate, Interval, IntervalValues, Timeline, TimelineList};
pub use values::{
    DateValue, FloatValue, IntValue, OptionalValue, Scalar, StringValue, TimeValue, Timestamp,
    TimestampError, format_timestamp, parse_time_or_date,
};
