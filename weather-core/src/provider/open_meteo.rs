//! Open-Meteo forecast retriever.
//!
//! Hourly and daily series are requested in one call so both come from the same
//! model run. Provider field names are mapped onto the canonical names the validator
//! expects; fields the provider omits stay absent so validation can name them.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use crate::{deadline::with_deadline, error::LookupError, model::Coordinates, validate::RawForecast};

use super::{ForecastSource, HttpSettings, fetch_body};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

pub const HOURLY_PARAMS: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,precipitation_probability,weather_code";
pub const DAILY_PARAMS: &str = "weather_code,temperature_2m_max,temperature_2m_min";
pub const FORECAST_DAYS: &str = "7";

/// Canonical name followed by the provider spellings it accepts, first match wins.
const HOURLY_ALIASES: &[(&str, &[&str])] = &[
    ("time", &["time"]),
    ("temperature", &["temperature_2m", "temperature"]),
    (
        "humidity",
        &["relative_humidity_2m", "relativehumidity_2m", "humidity"],
    ),
    (
        "windSpeed",
        &["wind_speed_10m", "windspeed_10m", "windSpeed"],
    ),
    (
        "precipitationProbability",
        &["precipitation_probability", "precipitationProbability"],
    ),
    (
        "weatherCode",
        &["weather_code", "weathercode", "weatherCode"],
    ),
];

const DAILY_ALIASES: &[(&str, &[&str])] = &[
    ("time", &["time"]),
    (
        "weatherCode",
        &["weather_code", "weathercode", "weatherCode"],
    ),
    ("temperatureMin", &["temperature_2m_min", "temperatureMin"]),
    ("temperatureMax", &["temperature_2m_max", "temperatureMax"]),
];

#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    settings: HttpSettings,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(settings: HttpSettings) -> anyhow::Result<Self> {
        let http = settings.client()?;
        Ok(Self { settings, http })
    }

    async fn fetch_inner(&self, coords: &Coordinates) -> Result<RawForecast, LookupError> {
        let request = self
            .http
            .get(self.settings.url("/v1/forecast"))
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("hourly", HOURLY_PARAMS.to_string()),
                ("daily", DAILY_PARAMS.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", FORECAST_DAYS.to_string()),
            ]);

        let body = fetch_body(request, "Open-Meteo forecast").await?;
        let parsed: Value = serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream("Failed to parse Open-Meteo forecast JSON", e))?;

        Ok(normalize(parsed))
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    async fn fetch(&self, coords: &Coordinates) -> Result<RawForecast, LookupError> {
        tracing::debug!(
            "Fetching forecast for {} ({}, {})",
            coords.display_name,
            coords.latitude,
            coords.longitude
        );
        let call = self.fetch_inner(coords);
        with_deadline("Forecast", self.settings.timeout, call).await
    }
}

/// Map a provider body onto canonical field names.
///
/// A body that is not an object (or has no series) normalizes to a value the
/// validator will reject.
pub fn normalize(body: Value) -> RawForecast {
    let mut root = match body {
        Value::Object(root) => root,
        other => return RawForecast(other),
    };

    let mut out = Map::new();
    if let Some(hourly) = root.remove("hourly") {
        let hourly = rename_section(hourly, HOURLY_ALIASES);
        out.insert("hourly".to_string(), hourly);
    }
    if let Some(daily) = root.remove("daily") {
        let daily = rename_section(daily, DAILY_ALIASES);
        out.insert("daily".to_string(), daily);
    }

    RawForecast(Value::Object(out))
}

fn rename_section(section: Value, aliases: &[(&str, &[&str])]) -> Value {
    let mut fields = match section {
        Value::Object(fields) => fields,
        other => return other,
    };

    let mut out = Map::new();
    for (canonical, spellings) in aliases {
        if let Some(value) = spellings.iter().find_map(|s| fields.remove(*s)) {
            out.insert((*canonical).to_string(), value);
        }
    }
    Value::Object(out)
}
