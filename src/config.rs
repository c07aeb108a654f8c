//! Configuration management and validation.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables, then command-line flags (applied by the CLI).
//! The result is checked once by [`Config::validate`] before the pipeline runs.

use crate::app::services::geocoder::ManualOverride;
use crate::app::services::geocoder::overrides::builtin_overrides;
use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH,
    DEFAULT_STATE_FILTER, GEOCODER_ENDPOINT, GEOCODER_MAX_BATCH, GEOCODER_MAX_RETRIES,
    GEOCODER_RETRY_BACKOFF_MS, GEOCODER_TIMEOUT_SECS, env_vars,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where to read from, where to write to and which state to focus on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Source CSV file
    pub input_path: PathBuf,

    /// Directory receiving the JSON artifacts
    pub output_path: PathBuf,

    /// Two-letter state code, stored upper-case
    pub state_filter: String,

    /// Skip the provider artifact and the geocoding it requires
    pub skip_providers: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            state_filter: DEFAULT_STATE_FILTER.to_string(),
            skip_providers: false,
        }
    }
}

/// Batch geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub enabled: bool,

    pub endpoint: String,

    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Retries after a transient failure
    pub max_retries: u32,

    /// Pause before each retry
    pub retry_backoff_ms: u64,

    /// Addresses per request
    pub batch_size: usize,

    /// Extra manual corrections appended to the built-in ones
    pub overrides: Vec<ManualOverride>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: GEOCODER_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: GEOCODER_TIMEOUT_SECS,
            max_retries: GEOCODER_MAX_RETRIES,
            retry_backoff_ms: GEOCODER_RETRY_BACKOFF_MS,
            batch_size: GEOCODER_MAX_BATCH,
            overrides: Vec::new(),
        }
    }
}

impl GeocodingConfig {
    /// Built-in corrections followed by the configured ones
    pub fn all_overrides(&self) -> Vec<ManualOverride> {
        let mut overrides = builtin_overrides();
        overrides.extend(self.overrides.iter().cloned());
        overrides
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when no `-v`/`-q` flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Global configuration for charge processing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub geocoding: GeocodingConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Configuration with explicit input and output locations
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.processing.input_path = input_path.into();
        config.processing.output_path = output_path.into();
        config
    }

    /// Parse a TOML document; omitted keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        let state = config.processing.state_filter.clone();
        config.set_state_filter(&state);
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// `~/.config/charge-processor/config.toml` or the platform equivalent
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Defaults, then the config file, then environment variables
    ///
    /// An explicitly named file must exist. The default location is only read
    /// when present.
    pub fn load_layered(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => match Self::default_config_path().filter(|p| p.is_file()) {
                Some(path) => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(input) = lookup(env_vars::INPUT_PATH) {
            self.processing.input_path = PathBuf::from(input);
        }
        if let Some(output) = lookup(env_vars::OUTPUT_PATH) {
            self.processing.output_path = PathBuf::from(output);
        }
        if let Some(state) = lookup(env_vars::STATE_FILTER) {
            self.set_state_filter(&state);
        }
        if let Some(key) = lookup(env_vars::GEOCODER_KEY) {
            self.geocoding.api_key = Some(key);
        }
    }

    pub fn set_state_filter(&mut self, state: &str) {
        self.processing.state_filter = state.trim().to_uppercase();
    }

    /// Whether provider coordinates will be looked up in this run
    pub fn geocoding_active(&self) -> bool {
        self.geocoding.enabled && !self.processing.skip_providers
    }

    /// Check the configuration before any work starts
    pub fn validate(&self) -> Result<()> {
        let state = &self.processing.state_filter;
        if state.is_empty() {
            return Err(Error::configuration("State filter must not be empty"));
        }
        if state.chars().count() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::configuration(format!(
                "State filter must be a two-letter code, got '{}'",
                state
            )));
        }

        if self.geocoding.batch_size == 0 {
            return Err(Error::configuration("Geocoding batch size must be at least 1"));
        }

        if self.geocoding_active()
            && self
                .geocoding
                .api_key
                .as_deref()
                .is_none_or(|key| key.trim().is_empty())
        {
            return Err(Error::configuration(format!(
                "Geocoding is enabled but no API key is set (use --geocoder-key, {} or --no-geocode)",
                env_vars::GEOCODER_KEY
            )));
        }

        Ok(())
    }

    /// Create the output directory if it does not exist
    pub fn ensure_output_directory(&self) -> Result<()> {
        let output = &self.processing.output_path;
        if !output.exists() {
            debug!("Creating output directory: {}", output.display());
            fs::create_dir_all(output).map_err(|e| {
                Error::io(
                    format!("Failed to create output directory '{}'", output.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}
