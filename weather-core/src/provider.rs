use crate::{
    Config,
    error::LookupError,
    model::{Coordinates, Position},
    provider::{
        nominatim::NominatimGeocoder, open_meteo::OpenMeteoForecast,
        open_meteo_geocoding::OpenMeteoGeocoder,
    },
    validate::RawForecast,
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod nominatim;
pub mod open_meteo;
pub mod open_meteo_geocoding;

/// Geocoding backends. Exactly one is consulted per lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Nominatim,
    OpenMeteo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Nominatim => "nominatim",
            ProviderId::OpenMeteo => "open-meteo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Nominatim, ProviderId::OpenMeteo]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Nominatim => nominatim::DEFAULT_BASE_URL,
            ProviderId::OpenMeteo => open_meteo_geocoding::DEFAULT_BASE_URL,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "nominatim" | "osm" => Ok(ProviderId::Nominatim),
            "open-meteo" | "openmeteo" => Ok(ProviderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: nominatim, open-meteo."
            )),
        }
    }
}

/// Place name to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// First match in provider ranking order; `NotFound` when there are none.
    async fn search(&self, name: &str) -> Result<Coordinates, LookupError>;

    /// Name a geolocated position.
    async fn reverse(&self, position: Position) -> Result<Coordinates, LookupError>;
}

/// Coordinates to a raw forecast with canonical field names.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, coords: &Coordinates) -> Result<RawForecast, LookupError>;
}

/// Connection settings shared by every HTTP provider.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl HttpSettings {
    pub fn new(base_url: impl Into<String>, config: &Config) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: config.user_agent(),
            timeout: config.timeout(),
        }
    }

    pub fn client(&self) -> anyhow::Result<Client> {
        Client::builder()
            .user_agent(&self.user_agent)
            .build()
            .context("Failed to build HTTP client")
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Construct a geocoder from config and explicit ProviderId.
pub fn geocoder_from_config(id: ProviderId, config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let base_url = match config.provider_base_url(id) {
        Some(url) => url,
        None => id.default_base_url(),
    };
    let settings = HttpSettings::new(base_url, config);

    let boxed: Box<dyn Geocoder> = match id {
        ProviderId::Nominatim => Box::new(NominatimGeocoder::new(settings)?),
        ProviderId::OpenMeteo => Box::new(OpenMeteoGeocoder::new(settings)?),
    };

    Ok(boxed)
}

/// Construct the configured geocoder, using the `geocoder` field.
pub fn default_geocoder_from_config(config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    let id = config.geocoder_id()?;
    geocoder_from_config(id, config)
}

/// Construct the forecast retriever from config.
pub fn forecast_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastSource>> {
    let base_url = match config.forecast_url.as_deref() {
        Some(url) => url,
        None => open_meteo::DEFAULT_BASE_URL,
    };
    let settings = HttpSettings::new(base_url, config);
    Ok(Box::new(OpenMeteoForecast::new(settings)?))
}

/// Send a request and return the body of a successful response.
///
/// Transport failures, non-success statuses and unreadable bodies all map to
/// `LookupError::Upstream`.
pub(crate) async fn fetch_body(request: RequestBuilder, what: &str) -> Result<String, LookupError> {
    let res = request
        .send()
        .await
        .map_err(|e| LookupError::upstream(&format!("Failed to send {what} request"), e))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| LookupError::upstream(&format!("Failed to read {what} response body"), e))?;

    if !status.is_success() {
        return Err(LookupError::Upstream(format!(
            "{what} request failed with status {}: {}",
            status,
            truncate_body(&body),
        )));
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_accepts_aliases() {
        assert_eq!(ProviderId::try_from("OSM").unwrap(), ProviderId::Nominatim);
        let parsed = ProviderId::try_from("OpenMeteo").unwrap();
        assert_eq!(parsed, ProviderId::OpenMeteo);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown geocoder"));
    }

    #[test]
    fn default_geocoder_builds_without_configuration() {
        let cfg = Config::default();
        assert!(default_geocoder_from_config(&cfg).is_ok());
        assert!(forecast_from_config(&cfg).is_ok());
    }

    #[test]
    fn default_geocoder_rejects_unknown_id() {
        let cfg = Config {
            geocoder: Some("mapquest".into()),
            ..Config::default()
        };
        let err = default_geocoder_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Unknown geocoder"));
    }

    #[test]
    fn settings_strip_trailing_slash() {
        let cfg = Config::default();
        let settings = HttpSettings::new("http://localhost:8080/", &cfg);
        assert_eq!(settings.url("/search"), "http://localhost:8080/search");
        assert_eq!(settings.timeout, cfg.timeout());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
