//! Configuration for dstat.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use dstat_common::LoggingConfig;

use crate::battery::DEFAULT_ALERT_MINUTES;
use crate::controls::DEFAULT_CAPACITY;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] dstat_common::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete dstat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DstatConfig {
    /// Seconds between two status lines (default: 1).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Scheduling priority adjustment applied at startup, 0 keeps the
    /// inherited priority (default: 10).
    #[serde(default = "default_nice")]
    pub nice: i32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Low battery alert settings.
    #[serde(default)]
    pub battery: BatteryConfig,

    /// Audio control tracking settings.
    #[serde(default)]
    pub audio: AudioConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_poll_interval() -> u64 {
    1
}

fn default_nice() -> i32 {
    10
}

/// Status line output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The formatted status line (default).
    #[default]
    Text,
    /// One JSON snapshot record per line.
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Mirror each line into the terminal title (default: true).
    #[serde(default = "default_true")]
    pub title: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            title: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where the low battery alert is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertBackend {
    /// Modal prompt on the controlling terminal (default).
    #[default]
    Tty,
    /// Warning record in the log.
    Log,
}

/// Low battery alert configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Minutes of charge left at which the alert fires (default: 10).
    #[serde(default = "default_alert_minutes")]
    pub alert_minutes: u32,

    /// Alert text.
    #[serde(default = "default_alert_message")]
    pub message: String,

    #[serde(default)]
    pub alert: AlertBackend,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            alert_minutes: default_alert_minutes(),
            message: default_alert_message(),
            alert: AlertBackend::default(),
        }
    }
}

fn default_alert_minutes() -> u32 {
    DEFAULT_ALERT_MINUTES
}

fn default_alert_message() -> String {
    "Battery is low.".to_string()
}

/// Audio control configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Most controls and event sources tracked (default: 64).
    #[serde(default = "default_max_controls")]
    pub max_controls: usize,

    /// Simple mixer control read for the output volume (default: Master).
    #[serde(default = "default_mixer_control")]
    pub control: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_controls: default_max_controls(),
            control: default_mixer_control(),
        }
    }
}

fn default_max_controls() -> usize {
    DEFAULT_CAPACITY
}

fn default_mixer_control() -> String {
    "Master".to_string()
}

impl Default for DstatConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            nice: default_nice(),
            output: OutputConfig::default(),
            battery: BatteryConfig::default(),
            audio: AudioConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DstatConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: DstatConfig = dstat_common::load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: DstatConfig = dstat_common::parse_config(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration to use.
    ///
    /// An explicit path must exist. Without one, the per-user file is used
    /// when present and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match dstat_common::default_config_path("dstat") {
            Some(path) if path.is_file() => Self::load_from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if self.audio.max_controls == 0 {
            return Err(ConfigError::Validation(
                "audio.max_controls must be > 0".to_string(),
            ));
        }

        if self.audio.control.trim().is_empty() {
            return Err(ConfigError::Validation(
                "audio.control must not be empty".to_string(),
            ));
        }

        if self.battery.alert_minutes > 24 * 60 {
            return Err(ConfigError::Validation(
                "battery.alert_minutes must be at most one day".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstat_common::LogFormat;

    #[test]
    fn test_parse_minimal_config() {
        let config = DstatConfig::parse("{}").unwrap();

        assert_eq!(config.poll_interval_secs, 1);
        assert_eq!(config.nice, 10);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.title);
        assert_eq!(config.battery.alert_minutes, 10);
        assert_eq!(config.battery.message, "Battery is low.");
        assert_eq!(config.battery.alert, AlertBackend::Tty);
        assert_eq!(config.audio.max_controls, 64);
        assert_eq!(config.audio.control, "Master");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            poll_interval_secs: 2,
            nice: 0,
            output: { format: "json", title: false },
            battery: {
                alert_minutes: 15,
                message: "Plug in now",
                alert: "log",
            },
            audio: { max_controls: 16, control: "PCM" },
            logging: { level: "debug", format: "json" },
        }"#;

        let config = DstatConfig::parse(json).unwrap();

        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.nice, 0);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.title);
        assert_eq!(config.battery.alert_minutes, 15);
        assert_eq!(config.battery.message, "Plug in now");
        assert_eq!(config.battery.alert, AlertBackend::Log);
        assert_eq!(config.audio.max_controls, 16);
        assert_eq!(config.audio.control, "PCM");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_zero_interval() {
        let result = DstatConfig::parse("{ poll_interval_secs: 0 }");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_zero_controls() {
        let result = DstatConfig::parse("{ audio: { max_controls: 0 } }");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_mixer_control() {
        let result = DstatConfig::parse(r#"{ audio: { control: " " } }"#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_alert_threshold() {
        let result = DstatConfig::parse("{ battery: { alert_minutes: 1441 } }");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = DstatConfig::parse(r#"{ battery: { alert: "x11" } }"#);
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_explicit_missing_path() {
        let result = DstatConfig::load(Some(Path::new("/nonexistent/dstat.json5")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
