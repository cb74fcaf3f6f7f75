//! Electoral Forecast - Entry Point
//!
//! Loads calibration and locale tables, runs the Monte Carlo forecast and
//! prints the report. Optionally compares the forecast with actual results.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use electoral_forecast::core::error::Result;
use electoral_forecast::core::ForecastConfig;
use electoral_forecast::data::{ActualResults, LocaleTables};
use electoral_forecast::forecast::{Backtest, ForecastOutput, Simulation};

/// JSON document written when a backtest is requested
#[derive(Serialize)]
struct Report<'a> {
    forecast: &'a ForecastOutput,
    backtest: &'a Backtest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Monte Carlo Electoral College forecast
#[derive(Parser, Debug)]
#[command(name = "electoral-forecast")]
#[command(about = "Forecast a two-party Electoral College outcome from polling inputs")]
struct Args {
    /// Calibration and run settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Locale tables (TOML); defaults to the built-in 2020 set
    #[arg(long)]
    locales: Option<PathBuf>,

    /// Number of trials
    #[arg(long, short = 'n')]
    trials: Option<u64>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Compare the forecast with actual results
    #[arg(long)]
    backtest: bool,

    /// Actual results (TOML); defaults to the certified 2020 results
    #[arg(long, requires = "backtest")]
    actual: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("electoral_forecast=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ForecastConfig::load(path)?,
        None => ForecastConfig::default(),
    };
    if let Some(trials) = args.trials {
        config.run.trials = trials;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }
    if args.threads.is_some() {
        config.run.threads = args.threads;
    }

    let tables = match &args.locales {
        Some(path) => LocaleTables::load(path)?,
        None => LocaleTables::reference_2020(),
    };

    let simulation = Simulation::new(&tables, &config)?;
    let output = simulation.run()?;

    let backtest = if args.backtest {
        let actual = match &args.actual {
            Some(path) => ActualResults::load(path)?,
            None => ActualResults::reference_2020(),
        };
        Some(Backtest::compare(&output, &actual)?)
    } else {
        None
    };

    match args.format {
        Format::Text => {
            print!("{}", output.summary());
            if let Some(backtest) = &backtest {
                println!();
                print!("{}", backtest.summary());
            }
        }
        Format::Json => {
            let json = match &backtest {
                Some(backtest) => serde_json::to_string_pretty(&Report {
                    forecast: &output,
                    backtest,
                })?,
                None => output.to_json()?,
            };
            println!("{}", json);
        }
    }

    Ok(())
}
