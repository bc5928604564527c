//! Driftline CLI
//!
//! Validate and headlessly simulate scroll-driven scenes.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod simulate;

use config::DriftlineConfig;

#[derive(Parser)]
#[command(name = "driftline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Driftline scroll timeline CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a scene for configuration errors
    Check {
        /// Scene file or directory containing driftline.toml
        #[arg(default_value = ".")]
        source: String,
    },

    /// Run a scene headlessly and print a summary
    Simulate {
        /// Scene file or directory containing driftline.toml
        #[arg(default_value = ".")]
        source: String,

        /// Frames spent scrolling
        #[arg(short, long, default_value = "120")]
        frames: u32,

        /// Final scroll offset in pixels
        #[arg(short, long, default_value = "2000")]
        scroll_to: f32,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Check { source } => cmd_check(&source),

        Commands::Simulate {
            source,
            frames,
            scroll_to,
            json,
        } => cmd_simulate(&source, frames, scroll_to, json),
    }
}

fn cmd_check(source: &str) -> Result<()> {
    let path = PathBuf::from(source);
    let config = DriftlineConfig::load_from_dir(&path)?;

    info!("Checking scene: {}", config.scene.name);

    let problems = simulate::check(&config);
    for problem in &problems {
        error!("{}", problem);
    }
    if !problems.is_empty() {
        anyhow::bail!("{} problem(s) found", problems.len());
    }

    info!(
        "{} clips and {} layout entries OK",
        config.clips.len(),
        config.layout.len()
    );
    Ok(())
}

fn cmd_simulate(source: &str, frames: u32, scroll_to: f32, json: bool) -> Result<()> {
    let path = PathBuf::from(source);
    let config = DriftlineConfig::load_from_dir(&path)?;

    let report = simulate::run(&config, frames, scroll_to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_text();
    }

    Ok(())
}
