//! Host process for the Streetwise action resolution engine.
//!
//! Loads configuration and the action catalog, builds the game service,
//! seeds the demo avatars, and runs the background jobs until Ctrl-C.
//! Transports (HTTP, chat bots) plug into [`GameService`] and are not part
//! of this binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `streetwise-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the action catalog (file or built-in)
//! 4. Build the game service with the system clock
//! 5. Seed the demo avatars
//! 6. Spawn regeneration and temporary status sweep jobs
//! 7. Wait for Ctrl-C, then stop the jobs

mod demo;
mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use streetwise_core::config::LoggingConfig;
use streetwise_core::{GameService, StreetwiseConfig, SystemClock, spawn_all};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "streetwise-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the catalog, demo seeding, or the
/// signal handler fails.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Configuration first: it decides the log format.
    let config = StreetwiseConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // 2. Logging.
    init_logging(&config.logging);
    info!(
        regen_interval_secs = config.server.regen_interval_secs,
        cooldown_sweep_interval_secs = config.server.cooldown_sweep_interval_secs,
        seeded = config.seed.is_some(),
        "streetwise-server starting"
    );

    // 3. Catalog.
    let catalog = config.catalog.load()?;

    // 4. Service.
    let service = Arc::new(GameService::new(
        catalog,
        config.rules.clone(),
        Arc::new(SystemClock),
        config.seed,
    ));

    // 5. Demo avatars.
    if config.server.seed_demo_avatars {
        demo::seed_demo_avatars(&service).await?;
    }

    // 6. Background jobs.
    let jobs = spawn_all(
        &service,
        Duration::from_secs(config.server.regen_interval_secs),
        Duration::from_secs(config.server.cooldown_sweep_interval_secs),
    );
    info!("background jobs running, press Ctrl-C to stop");

    // 7. Shutdown.
    tokio::signal::ctrl_c().await?;
    jobs.abort();
    info!(
        avatars = service.store().len().await,
        "streetwise-server shutdown complete"
    );
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
