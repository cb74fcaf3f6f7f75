//! Calibration sweep
//!
//! Reruns the forecast across a range of national polling averages and
//! prints how the headline numbers move.

use clap::Parser;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use electoral_forecast::core::error::Result;
use electoral_forecast::core::ForecastConfig;
use electoral_forecast::data::LocaleTables;
use electoral_forecast::forecast::Simulation;

#[derive(Parser, Debug)]
#[command(name = "calibration_sweep")]
#[command(about = "Sweep the trailing national average and report Dem win odds")]
struct Args {
    /// Lowest trailing national average
    #[arg(long, default_value_t = -4.0, allow_negative_numbers = true)]
    from: f64,

    /// Highest trailing national average
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    to: f64,

    /// Step between averages
    #[arg(long, default_value_t = 1.0)]
    step: f64,

    /// Trials per point
    #[arg(long, default_value_t = 20_000)]
    trials: u64,

    /// Random seed shared by every point
    #[arg(long, default_value_t = 2020)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("electoral_forecast=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.step <= 0.0 || args.to < args.from {
        eprintln!("Need step > 0 and to >= from");
        std::process::exit(2);
    }

    let tables = LocaleTables::reference_2020();
    let start = Instant::now();

    println!(
        "{:>8}{:>10}{:>10}{:>10}{:>12}",
        "Natl avg", "Dem win %", "Avg Dem", "Avg GOP", "PV split %"
    );

    let points = ((args.to - args.from) / args.step).floor() as u64;
    for i in 0..=points {
        let average = args.from + i as f64 * args.step;

        let mut config = ForecastConfig::default();
        config.calibration.trailing_national_average = average;
        config.run.trials = args.trials;
        config.run.seed = args.seed;

        let output = Simulation::new(&tables, &config)?.run()?;
        let n = &output.national;
        println!(
            "{:>8.1}{:>10.1}{:>10.0}{:>10.0}{:>12.1}",
            average,
            n.dem_win_fraction * 100.0,
            n.mean_dem_electoral_votes,
            n.mean_gop_electoral_votes,
            n.popular_vote_divergence * 100.0
        );
    }

    println!("Sweep time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
