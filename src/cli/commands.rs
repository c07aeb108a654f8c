//! Command implementations for the charge processor CLI
//!
//! This module contains the main command execution logic: configuration
//! loading, logging setup, the pipeline run and the final report.

use crate::app::services::diagnostics::DiagnosticLog;
use crate::app::services::pipeline::{Pipeline, PipelineOutcome};
use crate::cli::args::{Args, OutputFormat};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use indicatif::HumanDuration;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Main command runner for the charge processor
///
/// This function orchestrates the entire workflow:
/// 1. Validate arguments and load the layered configuration
/// 2. Set up logging
/// 3. Run the pipeline
/// 4. Print the final report and optionally dump diagnostics
pub async fn run(args: Args) -> Result<PipelineOutcome> {
    args.validate()?;

    let config = load_configuration(&args)?;

    setup_logging(&args, &config.logging.level)?;
    info!("Starting charge processor");
    debug!("Command line arguments: {:?}", args);
    debug!("Loaded configuration: {:?}", config);

    let mut pipeline = Pipeline::new(config).with_progress(args.show_progress());
    let outcome = pipeline.run().await?;

    if let Some(path) = &args.diagnostics_file {
        write_diagnostics_file(path, &outcome.diagnostics)?;
    }

    generate_final_report(&args, &outcome)?;

    Ok(outcome)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args, configured_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level(configured_level);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("charge_processor={}", log_level)));

    if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (file -> env -> args)
fn load_configuration(args: &Args) -> Result<Config> {
    let mut config = Config::load_layered(args.config_file.as_deref())?;

    apply_cli_overrides(&mut config, args);

    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, args: &Args) {
    if let Some(input) = &args.input_path {
        config.processing.input_path = input.clone();
    }
    if let Some(output) = &args.output_path {
        config.processing.output_path = output.clone();
    }
    if let Some(state) = &args.state {
        config.set_state_filter(state);
    }
    if args.skip_providers {
        config.processing.skip_providers = true;
    }
    if args.no_geocode {
        config.geocoding.enabled = false;
    }
    if let Some(key) = &args.geocoder_key {
        config.geocoding.api_key = Some(key.clone());
    }
}

/// Dump every diagnostic as a JSON array
fn write_diagnostics_file(path: &Path, diagnostics: &DiagnosticLog) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        Error::io(
            format!("Failed to create diagnostics file '{}'", path.display()),
            e,
        )
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, diagnostics.entries())
        .map_err(|e| Error::serialization("Failed to write diagnostics file", e))?;
    writer
        .flush()
        .map_err(|e| Error::io("Failed to flush diagnostics file", e))?;

    info!(
        "Wrote {} diagnostics to {}",
        diagnostics.len(),
        path.display()
    );
    Ok(())
}

/// Generate final processing report
fn generate_final_report(args: &Args, outcome: &PipelineOutcome) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", human_report(outcome));
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            Ok(())
        }
    }
}

fn human_report(outcome: &PipelineOutcome) -> String {
    let duration = HumanDuration(Duration::from_secs_f64(outcome.elapsed_secs));
    let mut lines = Vec::new();

    lines.push(format!("\n{}", "Charge Processing Complete".bright_green().bold()));
    let counts = [
        ("Rows streamed:", outcome.rows_streamed),
        ("DRGs:", outcome.drg_count),
        ("Providers:", outcome.provider_count),
        ("Charges:", outcome.charge_count),
        ("Stat groups:", outcome.stat_group_count),
    ];
    for (label, value) in counts {
        lines.push(format!(
            "  {} {}",
            label.bright_cyan(),
            value.to_string().bright_white().bold()
        ));
    }
    lines.push(format!(
        "  {} {}",
        "Processing time:".bright_cyan(),
        duration
    ));

    if let Some(geocoding) = &outcome.geocoding {
        lines.push(format!(
            "  {} {} geocoded, {} overridden, {} unplaced",
            "Geocoding:".bright_cyan(),
            geocoding.providers_geocoded,
            geocoding.providers_overridden,
            geocoding.quality_failures + geocoding.providers_missing
        ));
    }

    lines.push(format!("\n{}", "Output Files:".bright_green()));
    for path in &outcome.artifacts_written {
        lines.push(format!("  • {}", path.display()));
    }

    if !outcome.diagnostic_counts.is_empty() {
        lines.push(format!("\n{}", "Diagnostics:".bright_yellow()));
        for (kind, count) in &outcome.diagnostic_counts {
            lines.push(format!("  {} {}", format!("{}:", kind).yellow(), count));
        }
    }

    lines.push(String::new());
    lines.join("\n") + "\n"
}
