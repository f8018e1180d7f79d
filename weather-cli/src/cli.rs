use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use weather_core::{
    Config, FixedLocator, LookupOutcome, LookupSource, Orchestrator, Position, ProviderId, Session,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively choose the geocoder, timeouts and default location.
    Configure,

    /// Show the forecast for a place name.
    Show {
        /// Place to search for, e.g. "Paris" or "Springfield, Illinois".
        #[arg(required = true, num_args = 1..)]
        place: Vec<String>,
    },

    /// Show the forecast for the current position.
    Here {
        /// Latitude of the current position.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the current position.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place } => {
                let config = Config::load()?;
                let orch = Orchestrator::from_config(&config)?;
                let source = LookupSource::Place(place.join(" "));
                let lookup = |o: Orchestrator| async move { o.lookup(source).await };
                present(orch, lookup).await
            }
            Command::Here { lat, lon } => {
                let config = Config::load()?;
                let orch = Orchestrator::from_config(&config)?;
                let locator = match (lat, lon) {
                    (Some(lat), Some(lon)) => FixedLocator::at(Position::new(lat, lon)),
                    _ => FixedLocator::unavailable(),
                };
                let lookup = |o: Orchestrator| async move { o.lookup_here(&locator).await };
                present(orch, lookup).await
            }
        }
    }
}

/// Drive one lookup while a watcher reports progress, then print the settled session.
async fn present<F, Fut>(orch: Orchestrator, lookup: F) -> anyhow::Result<()>
where
    F: FnOnce(Orchestrator) -> Fut,
    Fut: std::future::Future<Output = LookupOutcome>,
{
    let mut rx = orch.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().status;
            if status.is_busy() {
                eprintln!("{}", render::progress(status));
            }
        }
    });

    let outcome = lookup(orch.clone()).await;
    let session: Session = orch.session();
    drop(orch);
    watcher.await.context("Progress watcher failed")?;

    tracing::debug!("Lookup finished with {:?}", outcome);
    match outcome {
        LookupOutcome::Applied(status) if status.is_settled() => {
            print!("{}", render::session(&session));
            Ok(())
        }
        other => anyhow::bail!("Lookup did not settle: {other:?}"),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current = config.geocoder_id()?;
    let choices: Vec<ProviderId> = ProviderId::all().to_vec();
    let start = choices.iter().position(|id| *id == current).unwrap_or(0);
    let geocoder = Select::new("Geocoder:", choices)
        .with_starting_cursor(start)
        .prompt()?;
    config.set_geocoder(geocoder);

    let base_url = Text::new("Geocoder base URL (empty for default):")
        .with_default(config.provider_base_url(geocoder).unwrap_or(""))
        .prompt()?;
    if base_url.trim().is_empty() {
        config.providers.remove(geocoder.as_str());
    } else {
        let base_url = base_url.trim().to_string();
        config.upsert_provider_base_url(geocoder, base_url);
    }

    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .prompt()?;

    let location = &mut config.default_location;
    location.name = Text::new("Fallback location name:")
        .with_default(&location.name)
        .prompt()?;
    location.latitude = CustomType::<f64>::new("Fallback latitude:")
        .with_default(location.latitude)
        .prompt()?;
    location.longitude = CustomType::<f64>::new("Fallback longitude:")
        .with_default(location.longitude)
        .prompt()?;

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}
