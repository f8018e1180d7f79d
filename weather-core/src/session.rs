use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, ForecastPayload};

/// Lookup progress. `Ready` and `Degraded` end a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Resolving,
    Fetching,
    Validating,
    Ready,
    Degraded,
}

impl Status {
    pub fn is_settled(&self) -> bool {
        matches!(self, Status::Ready | Status::Degraded)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Status::Resolving | Status::Fetching | Status::Validating)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Idle => "idle",
            Status::Resolving => "resolving",
            Status::Fetching => "fetching",
            Status::Validating => "validating",
            Status::Ready => "ready",
            Status::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

/// What readers see. Only the orchestrator writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub status: Status,
    pub coordinates: Option<Coordinates>,
    pub forecast: Option<ForecastPayload>,
    pub error_message: Option<String>,
    pub request_generation: u64,
}

/// Read model for the map: where to put the marker and what to write on it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub temperature: Option<f64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self) -> Option<MapMarker> {
        let coords = self.coordinates.as_ref()?;
        let forecast = self.forecast.as_ref();
        Some(MapMarker {
            latitude: coords.latitude,
            longitude: coords.longitude,
            label: coords.display_name.clone(),
            temperature: forecast.and_then(ForecastPayload::current_temperature),
        })
    }
}
