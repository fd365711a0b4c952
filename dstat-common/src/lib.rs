//! dstat Common Library
//!
//! This crate provides shared types and utilities for the dstat status line:
//!
//! - [`snapshot`] - Typed per-tick readings and the JSON snapshot record
//! - [`format`] - Bars, dots, scaled byte counts and bounded fragments
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod format;
pub mod snapshot;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, default_config_path, load_config, parse_config};
pub use error::{Error, Result};
pub use format::{FRAGMENT_CAPACITY, LINE_CAPACITY, bar, bounded, dots, fragment, scaled};
pub use snapshot::{
    BatteryStatus, CpuLoad, CpuPerf, NetworkRates, PowerReading, SnapshotRecord, Volume,
    current_timestamp_millis,
};

/// Initialize tracing with the given configuration.
///
/// Records are written to standard error so that standard output only
/// carries status lines.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
