//! OpenStreetMap Nominatim geocoder. Free, no API key; requires a User-Agent.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    deadline::with_deadline,
    error::LookupError,
    model::{Coordinates, Position},
};

use super::{Geocoder, HttpSettings, fetch_body};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Label used when a reverse lookup yields no settlement name.
pub const UNNAMED_PLACE: &str = "Your Location";

const SEARCH_LIMIT: &str = "5";

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    settings: HttpSettings,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(settings: HttpSettings) -> anyhow::Result<Self> {
        let http = settings.client()?;
        Ok(Self { settings, http })
    }

    async fn search_inner(&self, name: &str) -> Result<Coordinates, LookupError> {
        let request = self
            .http
            .get(self.settings.url("/search"))
            .query(&[("format", "json"), ("q", name), ("limit", SEARCH_LIMIT)]);

        let body = fetch_body(request, "Nominatim search").await?;
        let places: Vec<NmPlace> = serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream("Failed to parse Nominatim search JSON", e))?;

        // Provider ranking order is authoritative.
        match places.into_iter().next() {
            Some(first) => first.into_coordinates(),
            None => Err(LookupError::NotFound(name.to_string())),
        }
    }

    async fn reverse_inner(&self, position: Position) -> Result<Coordinates, LookupError> {
        let request = self
            .http
            .get(self.settings.url("/reverse"))
            .query(&[
                ("lat", position.latitude.to_string()),
                ("lon", position.longitude.to_string()),
                ("format", "json".to_string()),
            ]);

        let body = fetch_body(request, "Nominatim reverse").await?;
        let parsed: NmReverse = serde_json::from_str(&body)
            .map_err(|e| LookupError::upstream("Failed to parse Nominatim reverse JSON", e))?;

        let name = parsed
            .address
            .and_then(|a| a.city.or(a.town).or(a.village))
            .unwrap_or_else(|| UNNAMED_PLACE.to_string());

        Ok(position.named(name))
    }
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NmPlace {
    fn into_coordinates(self) -> Result<Coordinates, LookupError> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|e| LookupError::upstream("Nominatim returned an invalid latitude", e))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|e| LookupError::upstream("Nominatim returned an invalid longitude", e))?;

        Ok(Coordinates::new(latitude, longitude, self.display_name))
    }
}

#[derive(Debug, Deserialize)]
struct NmAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NmReverse {
    address: Option<NmAddress>,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, name: &str) -> Result<Coordinates, LookupError> {
        tracing::debug!("Nominatim search for '{name}'");
        let call = self.search_inner(name);
        let limit = self.settings.timeout;
        let coords = with_deadline("Geocoding", limit, call).await?;
        tracing::info!(
            "Resolved '{}' to {}, {}",
            name,
            coords.latitude,
            coords.longitude
        );
        Ok(coords)
    }

    async fn reverse(&self, position: Position) -> Result<Coordinates, LookupError> {
        let call = self.reverse_inner(position);
        let limit = self.settings.timeout;
        let coords = with_deadline("Reverse geocoding", limit, call).await?;
        tracing::info!("Reverse geocoded to: {}", coords.display_name);
        Ok(coords)
    }
}
