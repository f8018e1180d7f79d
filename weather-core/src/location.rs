//! Geolocation sources.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::LocationError, model::Position};

/// Supplies the device position for the automatic lookup.
#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Position, LocationError>;
}

/// A locator with a predetermined answer, e.g. coordinates passed on the command line.
#[derive(Debug, Clone)]
pub struct FixedLocator(Result<Position, LocationError>);

impl FixedLocator {
    pub fn at(position: Position) -> Self {
        Self(Ok(position))
    }

    pub fn unavailable() -> Self {
        Self(Err(LocationError::ServiceUnavailable))
    }

    pub fn failing(err: LocationError) -> Self {
        Self(Err(err))
    }
}

#[async_trait]
impl Locator for FixedLocator {
    async fn current_position(&self) -> Result<Position, LocationError> {
        self.0.clone()
    }
}
