//! Command-line argument definitions for the charge processor
//!
//! This module defines the CLI interface using the clap derive API. Every flag
//! is optional and overrides the layered configuration when present.

use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the Medicare charge processor
///
/// Converts the CMS inpatient charge file into the JSON artifacts read by the
/// provider charges map.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "charge_processor",
    version,
    about = "Convert CMS Medicare inpatient charge data to JSON artifacts",
    long_about = "Streams the CMS Medicare inpatient provider charge CSV, builds the DRG catalog, \
                  provider registry, charge ledger and per-DRG statistics, geocodes the providers \
                  of one state and writes drgs.json, charges.json, providers.json and stats.json."
)]
pub struct Args {
    /// Source CSV file
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Path to the Medicare charge CSV file"
    )]
    pub input_path: Option<PathBuf>,

    /// Output directory for the JSON artifacts
    ///
    /// Created if it does not exist.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Directory for the generated JSON files"
    )]
    pub output_path: Option<PathBuf>,

    /// Two-letter state code for providers, charges and state statistics
    #[arg(
        short = 's',
        long = "state",
        value_name = "CODE",
        help = "State whose providers and charges are kept (default MN)"
    )]
    pub state: Option<String>,

    /// Skip the provider registry output and geocoding
    #[arg(long = "skip-providers", help = "Do not geocode or write providers.json")]
    pub skip_providers: bool,

    /// Disable geocoding only
    #[arg(long = "no-geocode", help = "Disable provider geocoding")]
    pub no_geocode: bool,

    /// API key for the batch geocoding service
    #[arg(
        long = "geocoder-key",
        value_name = "KEY",
        help = "Geocoding service API key"
    )]
    pub geocoder_key: Option<String>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/charge-processor/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the final report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,

    /// Also write every diagnostic to this file as JSON
    #[arg(
        long = "diagnostics-file",
        value_name = "FILE",
        help = "Write the full diagnostic list as JSON"
    )]
    pub diagnostics_file: Option<PathBuf>,
}

/// Output format options for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(input_path) = &self.input_path {
            if !input_path.is_file() {
                return Err(Error::configuration(format!(
                    "Input file does not exist: {}",
                    input_path.display()
                )));
            }
        }

        if let Some(output_path) = &self.output_path {
            if output_path.is_file() {
                return Err(Error::configuration(format!(
                    "Output path is a file, not a directory: {}",
                    output_path.display()
                )));
            }
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Log level from the verbosity flags, falling back to the configured one
    pub fn get_log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => configured,
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress spinners (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: None,
            state: None,
            skip_providers: false,
            no_geocode: false,
            geocoder_key: None,
            config_file: None,
            verbose: 0,
            quiet: false,
            output_format: OutputFormat::Human,
            diagnostics_file: None,
        }
    }
}
