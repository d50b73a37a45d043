use anyhow::{Context, Result};
use std::process::ExitCode;

mod cli;
mod config;
mod document;
mod error;
mod input;
mod metadata;
mod pdf;
mod pipeline;
mod resources;
mod templating;

fn main() -> ExitCode {
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = cli::Cli::parse();

    let settings =
        config::Settings::resolve(&cli).context("Failed to resolve the configuration")?;
    let renderer = pdf::renderer::ChromiumRenderer::discover()?;

    let output = pipeline::run(&settings, &renderer)?;
    println!("Wrote {}", output.display());
    Ok(())
}
