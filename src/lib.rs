//! Medicare Charge Processor Library
//!
//! A Rust library for converting the CMS Medicare inpatient provider charge data
//! (one row per provider and DRG) into the static JSON artifacts consumed by the
//! provider charges map.
//!
//! This library provides tools for:
//! - Streaming the source CSV row by row with per-row normalization
//! - Building the DRG catalog, provider registry and charge ledger with conflict checks
//! - Aggregating nationwide and state level descriptive statistics per DRG
//! - Reconciling provider addresses against a batch geocoding service
//! - Writing `drgs.json`, `charges.json`, `providers.json` and `stats.json`

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod artifact_writer;
        pub mod charge_csv_parser;
        pub mod charge_ledger;
        pub mod diagnostics;
        pub mod drg_catalog;
        pub mod geocoder;
        pub mod pipeline;
        pub mod provider_registry;
        pub mod stats_aggregator;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{ChargeFact, ChargeRow, PipelineStage, Provider};
pub use app::services::pipeline::{Pipeline, PipelineOutcome};
pub use config::Config;

/// Result type alias for the charge processor
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error types for charge processing operations
///
/// Data quality problems found while streaming are not errors; they are
/// collected as [`app::services::diagnostics::Diagnostic`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the source stream failed; the run is aborted
    #[error("Stream failure in '{file}': {message}")]
    StreamFailure {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Geocoding service returned something unusable
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// HTTP transport error talking to the geocoding service
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// JSON serialization or deserialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// One output artifact could not be written
    #[error("Failed to write artifact '{artifact}': {message}")]
    ArtifactWrite { artifact: String, message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a fatal stream failure
    pub fn stream_failure(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::StreamFailure {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a geocoding error
    pub fn geocoding(message: impl Into<String>) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Create an HTTP error with context
    pub fn http(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create an artifact write error
    pub fn artifact_write(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ArtifactWrite {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Whether a failure of this kind is worth retrying against the geocoder
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { source, .. } => {
                source.is_timeout()
                    || source.is_connect()
                    || source.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::StreamFailure {
            file: "unknown".to_string(),
            message: "CSV stream failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Http {
            message: "Geocoding request failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid configuration file: {}", error),
        }
    }
}
