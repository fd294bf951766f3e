//! EpiTrend CLI: run the pipeline and inspect configuration.
//!
//! Commands:
//! - `run`: load, select, clean, and summarise the dataset; print the
//!   shaped tables and optionally export them as artifacts
//! - `config`: print the default configuration as TOML

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use epitrend_core::data::{provider_for, StdoutProgress};
use epitrend_core::{PipelineConfig, PipelineError};
use epitrend_runner::{run_pipeline, save_artifacts, ConsoleSink};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Parser)]
#[command(
    name = "epitrend",
    about = "EpiTrend CLI: epidemiological trend pipeline"
)]
struct Cli {
    /// Emit debug diagnostics on stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, clean, and summarise the dataset.
    Run {
        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the data source (URL or local path).
        #[arg(long)]
        source: Option<String>,

        /// Override the entity allow-list (comma-separated).
        #[arg(long, value_delimiter = ',')]
        entities: Vec<String>,

        /// Also write CSV/JSON/Parquet artifacts and a report to this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Run {
            config,
            source,
            entities,
            output_dir,
        } => run_cmd(config, source, entities, output_dir),
        Commands::Config => {
            print!("{}", PipelineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let ansi = std::io::stderr().is_terminal();
    tracing::subscriber::set_global_default(log_subscriber(verbose, ansi, std::io::stderr))
        .context("Failed to install log subscriber")
}

/// Diagnostics subscriber: WARN by default, DEBUG with `-v`.
fn log_subscriber<W>(
    verbose: bool,
    ansi: bool,
    writer: W,
) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(ansi)
        .with_writer(writer)
        .with_target(false)
        .finish()
}

fn run_cmd(
    config_path: Option<PathBuf>,
    source: Option<String>,
    entities: Vec<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_file(&path)?,
        None => PipelineConfig::default(),
    };
    if let Some(source) = source {
        config.source = source;
    }
    if !entities.is_empty() {
        config.entities = entities;
    }
    config.validate()?;

    let provider = provider_for(&config.locator(), config.timeout())
        .context("Failed to set up data provider")?;

    let run = match run_pipeline(&config, provider.as_ref(), Some(&StdoutProgress)) {
        Ok(run) => run,
        // the progress callback has already printed the diagnostic
        Err(PipelineError::DataUnavailable(_)) => std::process::exit(1),
        Err(e) => return Err(e.into()),
    };

    let mut console = ConsoleSink::stdout();
    console.overview(&run.overview)?;
    console.cleaning(&run.cleaning)?;
    run.charts.present(&mut console)?;

    if let Some(dir) = output_dir {
        let paths = save_artifacts(&run, &dir)?;
        println!();
        println!("Artifacts saved to: {}", paths.dir.display());
    }

    Ok(())
}
