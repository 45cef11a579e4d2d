//! # Barrage
//!
//! Runs a headless skirmish and prints its statistics as JSON.
//!
//! Usage: `barrage [config.toml]`. Without an argument `barrage.toml` in the
//! working directory is used when present.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use barrage_engine::{EngineConfig, Skirmish, WeaponLoadError, WeaponLoader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    info!("Project Barrage starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut loader = WeaponLoader::new(&config.weapon_dir);
    match loader.load_all() {
        Ok(0) | Err(WeaponLoadError::NotFound(_)) => {
            warn!("No weapon files in {}, using built-in weapons", config.weapon_dir.display());
            loader.load_builtin().context("built-in weapons")?;
        },
        Ok(_) => {},
        Err(e) => return Err(e).context("loading weapons"),
    }

    let mut skirmish = Skirmish::new(&config, loader.registry())?;
    let report = skirmish.run();
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Project Barrage shutdown complete");
    Ok(())
}
