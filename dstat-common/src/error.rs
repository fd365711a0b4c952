use thiserror::Error;

/// Common error type for dstat components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A named device or interface is not reported by its metric source.
    #[error("{0} not found")]
    SourceUnavailable(String),

    /// A metric source failed to produce a reading.
    #[error("{source_name} read failed: {message}")]
    Source {
        source_name: &'static str,
        message: String,
    },

    /// The interface exists but has no wireless capability.
    #[error("not a wireless interface")]
    NotWireless,

    #[error("no valid temperature sensor")]
    NoSensor,

    /// A formatted fragment or line did not fit its buffer.
    #[error("formatted output exceeds {limit} bytes")]
    Overflow { limit: usize },

    /// The alert or title surface could not be used.
    #[error("display error: {0}")]
    Display(String),
}

impl Error {
    /// Create a metric source read error.
    pub fn source(source_name: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Source {
            source_name,
            message: message.to_string(),
        }
    }

    /// Whether this error describes a feature that simply does not apply
    /// to this host, rather than a failure.
    pub fn is_expected_absence(&self) -> bool {
        matches!(self, Self::NotWireless | Self::NoSensor)
    }
}

/// Result type alias using dstat's Error.
pub type Result<T> = std::result::Result<T, Error>;
