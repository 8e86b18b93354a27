//! CLI module for the simulation gateway
//!
//! - `serve`: seed the store, then run the HTTP server
//! - `seed`: seed the store and exit

pub mod seed;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Simulation Gateway - orchestrates algorithm services over a key-value store
#[derive(Parser)]
#[command(name = "simulation-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Seed the store and run the HTTP server
    Serve,

    /// Seed the store and exit
    Seed,
}

/// Loads `.env` and the layered configuration, then installs logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    logging::init_logging(&logging::LoggingConfig::from(&config.logging));
    config
}
