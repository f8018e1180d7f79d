//! Acquisition orchestrator.
//!
//! Sequences geocoding, retrieval and validation for each lookup and owns the
//! [`Session`]. Every lookup gets a new generation number; a stage result is only
//! written if its generation is still the latest one issued, so a slow automatic
//! lookup can never overwrite a newer manual search. Failures at any stage end the
//! lookup in `Degraded` with a synthesized forecast.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;

use crate::{
    Config,
    error::LookupError,
    location::Locator,
    model::{Coordinates, LookupSource, Position},
    provider::{
        ForecastSource, Geocoder, default_geocoder_from_config, forecast_from_config,
        nominatim::UNNAMED_PLACE,
    },
    session::{Session, Status},
    synth::synthesize,
    validate::validate,
};

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Budget for the locator before falling back to `default_location`.
    pub locate_timeout: Duration,
    /// Used when geolocation fails; its name seeds the fallback forecast.
    pub default_location: Coordinates,
    /// Start time for synthesized forecasts.
    pub clock: fn() -> NaiveDateTime,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl OrchestratorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            locate_timeout: config.locate_timeout(),
            default_location: config.default_location.coordinates(),
            clock: local_now,
        }
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// How a lookup ended from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The lookup settled the session in this status.
    Applied(Status),
    /// A newer lookup started first; nothing from this one was kept.
    Superseded,
}

/// Single writer of the session. Cheap to clone; clones share the session.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    geocoder: Arc<dyn Geocoder>,
    forecast: Arc<dyn ForecastSource>,
    options: OrchestratorOptions,
    session: watch::Sender<Session>,
}

impl Orchestrator {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecast: Arc<dyn ForecastSource>,
        options: OrchestratorOptions,
    ) -> Self {
        let (session, _) = watch::channel(Session::new());
        Self {
            inner: Arc::new(Inner {
                geocoder,
                forecast,
                options,
                session,
            }),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let geocoder: Arc<dyn Geocoder> = Arc::from(default_geocoder_from_config(config)?);
        let forecast: Arc<dyn ForecastSource> = Arc::from(forecast_from_config(config)?);
        let options = OrchestratorOptions::from_config(config);
        Ok(Self::new(geocoder, forecast, options))
    }

    /// Receiver for presentation and map sync. Readers never write.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    pub fn session(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    /// Start a lookup, superseding any lookup still in flight.
    pub async fn lookup(&self, source: LookupSource) -> LookupOutcome {
        let status = match source {
            LookupSource::Place(_) => Status::Resolving,
            LookupSource::Coordinates(_) => Status::Fetching,
        };
        let generation = self.begin(status, source.label());

        match source {
            LookupSource::Place(text) => self.run_search(generation, text.trim()).await,
            LookupSource::Coordinates(coords) => {
                let seed = coords.display_name.clone();
                self.acquire(generation, coords, None, &seed).await
            }
        }
    }

    /// Automatic lookup from the device position.
    ///
    /// The generation is taken before asking the locator, so a search issued while
    /// waiting for a fix wins. A failed or slow locator falls back to the configured
    /// default location rather than stalling.
    pub async fn lookup_here(&self, locator: &dyn Locator) -> LookupOutcome {
        let generation = self.begin(Status::Resolving, "current location");
        let fallback = self.inner.options.default_location.clone();
        let limit = self.inner.options.locate_timeout;

        let fix = locator.current_position();
        let position = match tokio::time::timeout(limit, fix).await {
            Ok(Ok(position)) => {
                tracing::info!(
                    "Got location: {}, {}",
                    position.latitude,
                    position.longitude
                );
                Some(position)
            }
            Ok(Err(e)) => {
                tracing::warn!("Geolocation failed ({e}); using {}", fallback.display_name);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Geolocation timed out after {:?}; using {}",
                    limit,
                    fallback.display_name
                );
                None
            }
        };

        if !self.apply(generation, |s| s.status = Status::Fetching) {
            return self.stale(generation);
        }

        let seed = fallback.display_name.clone();
        match position {
            Some(position) => {
                let here = position.named(UNNAMED_PLACE);
                self.acquire(generation, here, Some(position), &seed).await
            }
            None => self.acquire(generation, fallback, None, &seed).await,
        }
    }

    async fn run_search(&self, generation: u64, query: &str) -> LookupOutcome {
        let resolved = if query.is_empty() {
            Err(LookupError::NotFound(String::new()))
        } else {
            self.inner.geocoder.search(query).await
        };

        match resolved {
            Ok(coords) => {
                if !self.apply(generation, |s| s.status = Status::Fetching) {
                    return self.stale(generation);
                }
                self.acquire(generation, coords, None, query).await
            }
            Err(err) => self.degrade(generation, query, None, err),
        }
    }

    /// Fetch and validate. When `name_from` is set the position is reverse geocoded
    /// alongside the fetch; a failed reverse lookup keeps the provisional name.
    async fn acquire(
        &self,
        generation: u64,
        coords: Coordinates,
        name_from: Option<Position>,
        seed: &str,
    ) -> LookupOutcome {
        let (fetched, coords) = match name_from {
            Some(position) => {
                let (fetched, named) = tokio::join!(
                    self.inner.forecast.fetch(&coords),
                    self.inner.geocoder.reverse(position)
                );
                match named {
                    Ok(named) => (fetched, named),
                    Err(e) => {
                        tracing::debug!(
                            "Reverse geocoding failed, keeping '{}': {e}",
                            coords.display_name
                        );
                        (fetched, coords)
                    }
                }
            }
            None => {
                let fetched = self.inner.forecast.fetch(&coords).await;
                (fetched, coords)
            }
        };

        let raw = match fetched {
            Ok(raw) => raw,
            Err(err) => return self.degrade(generation, seed, Some(coords), err),
        };

        if !self.apply(generation, |s| s.status = Status::Validating) {
            return self.stale(generation);
        }

        match validate(&raw) {
            Ok(forecast) => {
                tracing::info!("Lookup {generation} ready for {}", coords.display_name);
                let applied = self.apply(generation, |s| {
                    s.status = Status::Ready;
                    s.coordinates = Some(coords);
                    s.forecast = Some(forecast);
                    s.error_message = None;
                });
                self.outcome(generation, applied, Status::Ready)
            }
            Err(err) => self.degrade(generation, seed, Some(coords), err.into()),
        }
    }

    fn degrade(
        &self,
        generation: u64,
        seed: &str,
        coords: Option<Coordinates>,
        err: LookupError,
    ) -> LookupOutcome {
        tracing::warn!("Lookup {generation} for '{seed}' degraded: {err}");

        let forecast = synthesize(seed, (self.inner.options.clock)());
        let message = err.user_message();
        let applied = self.apply(generation, |s| {
            s.status = Status::Degraded;
            s.coordinates = coords;
            s.forecast = Some(forecast);
            s.error_message = Some(message);
        });
        self.outcome(generation, applied, Status::Degraded)
    }

    fn begin(&self, status: Status, label: &str) -> u64 {
        let mut generation = 0;
        self.inner.session.send_modify(|s| {
            s.request_generation += 1;
            s.status = status;
            s.error_message = None;
            generation = s.request_generation;
        });
        tracing::info!("Lookup {generation} started for '{label}'");
        generation
    }

    /// Mutate the session only if `generation` is still current.
    fn apply(&self, generation: u64, change: impl FnOnce(&mut Session)) -> bool {
        self.inner.session.send_if_modified(|s| {
            if s.request_generation != generation {
                return false;
            }
            change(s);
            true
        })
    }

    fn outcome(&self, generation: u64, applied: bool, status: Status) -> LookupOutcome {
        if applied {
            LookupOutcome::Applied(status)
        } else {
            self.stale(generation)
        }
    }

    fn stale(&self, generation: u64) -> LookupOutcome {
        tracing::debug!("Discarding stale result of lookup {generation}");
        LookupOutcome::Superseded
    }
}
