use anyhow::Context;
use charge_processor::cli::{args::Args, commands};
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(()) => {
            // Report has already been printed by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    let input = args.input_path.clone();
    runtime.block_on(commands::run(args)).with_context(|| match input {
        Some(path) => format!("Charge processing of {} failed", path.display()),
        None => "Charge processing failed".to_string(),
    })?;

    Ok(())
}
