//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Year range shown by `dstat version`.
const COPYRIGHT_YEARS: &str = "2015-2021";

/// Command line of the status line generator.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dstat",
    about = "Print a system status line every second",
    override_usage = "dstat [OPTIONS] <IF>\n       dstat version"
)]
pub struct Args {
    /// Network interface to report on, or `version`.
    #[arg(value_name = "IF")]
    pub interface: String,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Whether the version banner was requested instead of a run.
    pub fn wants_version(&self) -> bool {
        self.interface == "version"
    }
}

/// The `dstat version` banner.
pub fn version_banner() -> String {
    format!(
        "dstat {} (c) {} Joerg Jung",
        env!("CARGO_PKG_VERSION"),
        COPYRIGHT_YEARS
    )
}
