use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A resolved place. Each lookup produces a fresh value; nothing mutates one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            display_name: display_name.into(),
        }
    }
}

/// A raw geolocation fix, before it has a human-readable name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn named(self, display_name: impl Into<String>) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude, display_name)
    }
}

/// What a lookup starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupSource {
    /// Free text typed by the user; goes through the geocoder.
    Place(String),
    /// Coordinates already known (geolocation); skips the geocoder.
    Coordinates(Coordinates),
}

impl LookupSource {
    pub fn place(text: impl Into<String>) -> Self {
        Self::Place(text.into())
    }

    pub fn label(&self) -> &str {
        match self {
            LookupSource::Place(text) => text,
            LookupSource::Coordinates(coords) => &coords.display_name,
        }
    }
}

/// Hourly series. Timestamps are always present; a measurement is `None` where the
/// provider had no value for that hour (e.g. precipitation past the model horizon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySeries {
    pub time: Vec<NaiveDateTime>,
    pub temperature: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
    pub wind_speed: Vec<Option<f64>>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySeries {
    pub time: Vec<NaiveDate>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_min: Vec<Option<f64>>,
    pub temperature_max: Vec<Option<f64>>,
}

/// A forecast that has passed validation (or was synthesized to satisfy it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}

impl ForecastPayload {
    /// True when every series holds at least one point.
    pub fn is_populated(&self) -> bool {
        let h = &self.hourly;
        let d = &self.daily;
        [
            h.time.len(),
            h.temperature.len(),
            h.humidity.len(),
            h.wind_speed.len(),
            h.precipitation_probability.len(),
            h.weather_code.len(),
            d.time.len(),
            d.weather_code.len(),
            d.temperature_min.len(),
            d.temperature_max.len(),
        ]
        .iter()
        .all(|len| *len >= 1)
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.hourly.temperature.first().copied().flatten()
    }
}

/// Display category for a WMO weather code. The raw code is never altered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Clear,
    PartlyCloudy,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl WeatherCategory {
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45..=48 => Self::Fog,
            51..=67 => Self::Rain,
            71..=86 => Self::Snow,
            95..=99 => Self::Thunderstorm,
            _ => Self::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Fog => "Fog",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Fog => "cloud_fog",
            Self::Rain => "cloud_rain",
            Self::Snow => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
            Self::Unknown => "wind",
        }
    }
}
