//! IPO volatility forecasting CLI.
//!
//! # Usage
//!
//! ```bash
//! # Walk-forward HAR-RV vs naive over every target in the universe
//! ipo-vol run --config config/default.toml --universe data/ipo_universe.csv --returns data/returns.csv
//!
//! # Same, as JSON
//! ipo-vol run --config config/default.toml --universe data/ipo_universe.csv --returns data/returns.csv --output json
//!
//! # Synthetic data smoke run
//! ipo-vol sample --window 6 --seed 42
//!
//! # Inspect peer groups
//! ipo-vol peers --config config/default.toml --universe data/ipo_universe.csv --ticker RDDT
//! ```

use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use ipo_vol_forecast::data::{sample, CsvReturnsProvider, SampleConfig};
use ipo_vol_forecast::universe::{IpoUniverse, PeerSelector, SectorSizePeerSelector};
use ipo_vol_forecast::{run_entity, BatchRunner, EntityId, PipelineConfig};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "ipo-vol")]
#[command(about = "Peer-informed HAR-RV volatility forecasting for IPO stocks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run walk-forward forecasts for every target in the universe
    Run {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/default.toml")]
        config: String,

        /// IPO universe CSV (tic, ipodate, rdq, datadate, gsector, mkvaltq)
        #[arg(short, long)]
        universe: String,

        /// Daily returns CSV (ticker, date, ret)
        #[arg(short, long)]
        returns: String,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,

        /// Override the configured window size
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Forecast one synthetic entity
    Sample {
        /// First date (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long, default_value = "2024-12-31")]
        end: NaiveDate,

        /// Training window size
        #[arg(short, long, default_value_t = 6)]
        window: usize,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Show selected peers
    Peers {
        /// Path to configuration file
        #[arg(short, long, default_value = "config/default.toml")]
        config: String,

        /// IPO universe CSV
        #[arg(short, long)]
        universe: String,

        /// Single target; defaults to every target in the configured sector
        #[arg(short, long)]
        ticker: Option<String>,
    },
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ipo_vol_forecast=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &str, window: Option<usize>) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_file(path)
        .with_context(|| format!("Failed to load config {}", path))?;
    if let Some(window) = window {
        config.window_size = window;
        config.validate().context("Invalid --window")?;
    }
    Ok(config)
}

fn cmd_run(
    config: &str,
    universe: &str,
    returns: &str,
    output: OutputFormat,
    window: Option<usize>,
) -> Result<()> {
    let started = Instant::now();
    let config = load_config(config, window)?;

    let universe = IpoUniverse::from_csv(universe)
        .with_context(|| format!("Failed to load IPO universe {}", universe))?;
    let targets = universe.target_list(config.sector_code, config.start_date);
    if targets.is_empty() {
        bail!(
            "No targets in sector {} with IPO on or after {}",
            config.sector_code,
            config.start_date
        );
    }

    let provider = CsvReturnsProvider::open(returns)
        .with_context(|| format!("Failed to load returns {}", returns))?;
    info!(
        "{} targets, {} tickers with returns",
        targets.len(),
        provider.ticker_count()
    );

    let selector = SectorSizePeerSelector::new(universe, config.peer_criteria());

    let total = config.max_targets.map_or(targets.len(), |m| m.min(targets.len()));
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_message("targets");

    let batch = BatchRunner::new(config, &provider, &selector)
        .with_progress(pb.clone())
        .run(&targets);
    pb.finish_and_clear();

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&batch).context("Failed to serialize report")?
            );
        }
        OutputFormat::Text => {
            println!("{}", SEPARATOR);
            print!("{}", batch.summary());
            println!("{}", SEPARATOR);
            println!("Elapsed: {:.1}s", started.elapsed().as_secs_f64());
        }
    }

    Ok(())
}

fn cmd_sample(start: NaiveDate, end: NaiveDate, window: usize, seed: u64) -> Result<()> {
    let entity = EntityId::from("SAMPLE");
    let sample_config = SampleConfig {
        seed,
        ..SampleConfig::default()
    };

    let (target, peer) = sample::generate(&entity, start, end, &sample_config)
        .context("Failed to generate sample data")?;
    info!("Generated {} synthetic days", target.len());

    let report = run_entity(&target, &peer, window).context("Sample forecast failed")?;

    println!("{}", SEPARATOR);
    println!("{}", report.evaluation.summary());
    println!("{}", SEPARATOR);
    Ok(())
}

fn cmd_peers(config: &str, universe: &str, ticker: Option<String>) -> Result<()> {
    let config = load_config(config, None)?;
    let universe = IpoUniverse::from_csv(universe)
        .with_context(|| format!("Failed to load IPO universe {}", universe))?;

    let targets = match ticker {
        Some(t) => vec![t],
        None => universe.target_list(config.sector_code, config.start_date),
    };

    let selector = SectorSizePeerSelector::new(universe, config.peer_criteria());
    for target in &targets {
        let peers = selector.select(target);
        if peers.is_empty() {
            println!("Target: {} | Peers: (none)", target);
        } else {
            println!("Target: {} | Peers: {}", target, peers.join(", "));
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            universe,
            returns,
            output,
            window,
        } => cmd_run(&config, &universe, &returns, output, window),
        Commands::Sample {
            start,
            end,
            window,
            seed,
        } => cmd_sample(start, end, window, seed),
        Commands::Peers {
            config,
            universe,
            ticker,
        } => cmd_peers(&config, &universe, ticker),
    }
}
