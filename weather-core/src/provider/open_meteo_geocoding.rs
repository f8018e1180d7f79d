use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    deadline::with_deadline,
    error::LookupError,
    model::{Coordinates, Position},
};

use super::{Geocoder, HttpSettings, fetch_body};

pub const DEFAULT_BASE_URL: &str = "https://geocoding-api.open-meteo.com";

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    settings: HttpSettings,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(settings: HttpSettings) -> anyhow::Result<Self> {
        let http = settings.client()?;
        Ok(Self { settings, http })
    }

    async fn search_inner(&self, name: &str) -> Result<Coordinates, LookupError> {
        let request = self
            .http
            .get(self.settings.url("/v1/search"))
            .query(&[("name", name), ("count", "5"), ("format", "json")]);

        let body = fetch_body(request, "Open-Meteo geocoding").await?;
        let parsed: OmSearchResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream("Failed to parse Open-Meteo geocoding JSON", e))?;

        // No `results` key at all when nothing matched.
        parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(OmPlace::into_coordinates)
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
}

impl OmPlace {
    fn into_coordinates(self) -> Coordinates {
        let display_name = [Some(self.name), self.admin1, self.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Coordinates::new(self.latitude, self.longitude, display_name)
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    results: Option<Vec<OmPlace>>,
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, name: &str) -> Result<Coordinates, LookupError> {
        tracing::debug!("Open-Meteo geocoding search for '{name}'");
        let call = self.search_inner(name);
        let limit = self.settings.timeout;
        with_deadline("Geocoding", limit, call).await
    }

    async fn reverse(&self, _position: Position) -> Result<Coordinates, LookupError> {
        let reason = "Open-Meteo geocoding does not support reverse lookups";
        Err(LookupError::Upstream(reason.to_string()))
    }
}
