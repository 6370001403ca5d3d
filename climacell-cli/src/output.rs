//! Human-friendly rendering of decoded responses.

use std::fmt::{self, Write as _};

use anyhow::Context;
use climacell_core::{
    StationSample, TimelineList, Timestamp, WeatherSample,
    model::{SampleLocation, codes},
};
use serde::Serialize;

const NAME_WIDTH: usize = 26;

/// Writes the human-readable form of a value.
pub type Render<T> = fn(&mut String, &T) -> fmt::Result;

fn render<T>(value: &T, render_fn: Render<T>) -> anyhow::Result<String> {
    let mut out = String::new();
    render_fn(&mut out, value).context("Failed to format response")?;
    Ok(out)
}

pub fn print<T: Serialize>(value: &T, json: bool, render_fn: Render<T>) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
        println!("{out}");
    } else {
        print!("{}", render(value, render_fn)?);
    }
    Ok(())
}

pub fn print_all<T: Serialize>(values: &[T], json: bool, render_fn: Render<T>) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(values).context("Failed to serialize response")?;
        println!("{out}");
        return Ok(());
    }

    if values.is_empty() {
        println!("No samples returned.");
    }
    for value in values {
        println!("{}", render(value, render_fn)?);
    }
    Ok(())
}

fn header(out: &mut String, location: &SampleLocation, time: Option<Timestamp>) -> fmt::Result {
    let time = time.map_or_else(|| "(no observation time)".to_string(), |t| t.to_rfc3339());
    let place = match (&location.location_id, location.lat, location.lon) {
        (Some(id), _, _) => format!("location {id}"),
        (None, Some(lat), Some(lon)) => format!("{lat}, {lon}"),
        _ => "unknown location".to_string(),
    };
    writeln!(out, "{time}  [{place}]")
}

fn entries(out: &mut String, entries: Vec<(&'static str, String)>) -> fmt::Result {
    for (name, value) in entries {
        writeln!(out, "  {name:<NAME_WIDTH$} {value}")?;
    }
    Ok(())
}

pub fn weather_sample(out: &mut String, sample: &WeatherSample) -> fmt::Result {
    header(out, &sample.location, sample.observation_time.get())?;

    if let Some(condition) = sample.weather.condition() {
        writeln!(out, "  {condition}")?;
    }
    entries(out, sample.weather.entries())?;
    entries(out, sample.air_quality.entries())?;
    entries(out, sample.fire.entries())?;
    entries(out, sample.road_risk.entries())
}

pub fn station_sample(out: &mut String, sample: &StationSample) -> fmt::Result {
    header(out, &sample.location, sample.observation_time.get())?;
    entries(out, sample.weather.entries())
}

pub fn timeline_list(out: &mut String, list: &TimelineList) -> fmt::Result {
    if list.timelines.is_empty() {
        writeln!(out, "No timelines returned.")?;
    }

    for timeline in &list.timelines {
        writeln!(
            out,
            "Timestep {} ({} to {})",
            timeline.timestep,
            timeline.start_time.to_rfc3339(),
            timeline.end_time.to_rfc3339()
        )?;

        for interval in &timeline.intervals {
            writeln!(out, "  {}", interval.start_time.to_rfc3339())?;
            for (name, value) in interval.values.fields() {
                let described = match name {
                    "weatherCode" => value.as_i64().and_then(codes::weather_code_description),
                    "moonPhase" => value.as_i64().and_then(codes::moon_phase_description),
                    _ => None,
                };
                write!(out, "    {name:<NAME_WIDTH$} {value}")?;
                if let Some(text) = described {
                    write!(out, " ({text})")?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
