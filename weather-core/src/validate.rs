//! Structural contract check on a retrieved forecast.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    error::ValidationError,
    model::{DailySeries, ForecastPayload, HourlySeries},
};

pub const HOURLY_FIELDS: [&str; 6] = [
    "time",
    "temperature",
    "humidity",
    "windSpeed",
    "precipitationProbability",
    "weatherCode",
];

pub const DAILY_FIELDS: [&str; 4] = ["time", "weatherCode", "temperatureMin", "temperatureMax"];

/// Forecast body as returned by a provider, already mapped onto the canonical
/// field names but not yet trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast(pub Value);

/// Check the payload and build the typed forecast from it.
///
/// Checks run in order: non-null object, `hourly`/`daily` objects, then every required
/// field (hourly first, then daily) must be a non-empty sequence. The first failure is
/// returned. Elements are then type-checked; `null` measurements are kept as missing
/// values, timestamps must parse. Arrays of unequal length are accepted and only logged.
pub fn validate(raw: &RawForecast) -> Result<ForecastPayload, ValidationError> {
    let root = raw.0.as_object().ok_or(ValidationError::NullPayload)?;

    let hourly = section(root, "hourly")?;
    let daily = section(root, "daily")?;

    for name in HOURLY_FIELDS {
        required(hourly, "hourly", name)?;
    }
    for name in DAILY_FIELDS {
        required(daily, "daily", name)?;
    }

    let payload = ForecastPayload {
        hourly: HourlySeries {
            time: field_with(hourly, "hourly", "time", parse_hour)?,
            temperature: field(hourly, "hourly", "temperature")?,
            humidity: field(hourly, "hourly", "humidity")?,
            wind_speed: field(hourly, "hourly", "windSpeed")?,
            precipitation_probability: field(hourly, "hourly", "precipitationProbability")?,
            weather_code: field(hourly, "hourly", "weatherCode")?,
        },
        daily: DailySeries {
            time: field_with(daily, "daily", "time", parse_day)?,
            weather_code: field(daily, "daily", "weatherCode")?,
            temperature_min: field(daily, "daily", "temperatureMin")?,
            temperature_max: field(daily, "daily", "temperatureMax")?,
        },
    };

    warn_on_ragged("hourly", hourly, &HOURLY_FIELDS);
    warn_on_ragged("daily", daily, &DAILY_FIELDS);

    Ok(payload)
}

fn section<'a>(
    root: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    match root.get(name) {
        Some(Value::Object(obj)) => Ok(obj),
        Some(_) => Err(ValidationError::NotObject(name.to_string())),
        None => Err(ValidationError::MissingField(name.to_string())),
    }
}

/// Present, a sequence, and holding at least one element.
fn required<'a>(
    section: &'a Map<String, Value>,
    prefix: &str,
    name: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    let qualified = || format!("{prefix}.{name}");

    match section.get(name) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(qualified())),
        Some(Value::Array(items)) if items.is_empty() => {
            Err(ValidationError::EmptyField(qualified()))
        }
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ValidationError::NotSequence(qualified())),
    }
}

fn field<T: DeserializeOwned>(
    section: &Map<String, Value>,
    prefix: &str,
    name: &str,
) -> Result<Vec<T>, ValidationError> {
    field_with(section, prefix, name, |item| T::deserialize(item).ok())
}

fn field_with<T>(
    section: &Map<String, Value>,
    prefix: &str,
    name: &str,
    parse: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, ValidationError> {
    let items = required(section, prefix, name)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse(item).ok_or_else(|| ValidationError::InvalidElement {
                field: format!("{prefix}.{name}"),
                index,
            })
        })
        .collect()
}

// Open-Meteo emits local ISO times without seconds ("2026-10-17T14:00").
fn parse_hour(item: &Value) -> Option<NaiveDateTime> {
    let text = item.as_str()?;
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn parse_day(item: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(item.as_str()?, "%Y-%m-%d").ok()
}

fn warn_on_ragged(prefix: &str, section: &Map<String, Value>, names: &[&str]) {
    let lengths: Vec<usize> = names
        .iter()
        .filter_map(|n| section.get(*n).and_then(Value::as_array).map(Vec::len))
        .collect();

    if lengths.windows(2).any(|w| w[0] != w[1]) {
        tracing::warn!("{prefix} series have unequal lengths: {:?}", lengths);
    }
}
