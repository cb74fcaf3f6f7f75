//! Simulation driver
//!
//! Runs sampler -> resolver -> aggregator once per trial. Trials are split
//! into fixed-size chunks; each chunk gets its own ChaCha stream, a private
//! registry clone and a private tally. Tallies are merged in chunk order,
//! so a seed reproduces the same aggregates on any number of threads.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;

use crate::core::config::{ForecastConfig, RunConfig};
use crate::core::error::Result;
use crate::data::LocaleTables;
use crate::forecast::aggregator::{Tally, TrialSummary};
use crate::forecast::draws::{DrawSource, GaussianDraws};
use crate::forecast::output::ForecastOutput;
use crate::forecast::registry::LocaleRegistry;
use crate::forecast::resolver::SplitResolver;
use crate::forecast::sampler::TrialSampler;

/// A validated, ready-to-run forecast
#[derive(Debug, Clone)]
pub struct Simulation {
    registry: LocaleRegistry,
    resolver: SplitResolver,
    sampler: TrialSampler,
    run: RunConfig,
}

impl Simulation {
    /// Validate configuration and input tables. Every configuration error
    /// surfaces here, before any trial runs.
    pub fn new(tables: &LocaleTables, config: &ForecastConfig) -> Result<Self> {
        config.validate()?;
        let registry = LocaleRegistry::from_tables(tables)?;
        let resolver = SplitResolver::new(&tables.splits, &registry)?;

        Ok(Self {
            registry,
            resolver,
            sampler: TrialSampler::new(config.calibration.clone()),
            run: config.run.clone(),
        })
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Run one trial against a scratch registry
    pub fn run_trial(
        &self,
        registry: &mut LocaleRegistry,
        tally: &mut Tally,
        draws: &mut impl DrawSource,
    ) -> Result<TrialSummary> {
        registry.reset_trial_scratch();
        let national = self.sampler.sample(registry, draws);
        self.resolver.resolve(registry, self.sampler.calibration(), draws);
        tally.record(registry, &national)
    }

    /// Run trials sequentially from a caller-supplied draw source
    pub fn run_with_draws(&self, trials: u64, draws: &mut impl DrawSource) -> Result<ForecastOutput> {
        let start = Instant::now();
        let mut registry = self.registry.clone();
        let mut tally = Tally::new(registry.len());

        for _ in 0..trials {
            self.run_trial(&mut registry, &mut tally, draws)?;
        }

        Ok(ForecastOutput::new(&self.registry, &tally, self.run.seed, start.elapsed()))
    }

    /// Run the configured number of trials in parallel
    pub fn run(&self) -> Result<ForecastOutput> {
        let start = Instant::now();
        let chunks = chunk_sizes(self.run.trials, self.run.chunk_size);

        tracing::info!(
            "Running {} trials in {} chunks (seed {})",
            self.run.trials,
            chunks.len(),
            self.run.seed
        );

        let partials = match self.run.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                pool.install(|| self.run_chunks(&chunks))?
            }
            None => self.run_chunks(&chunks)?,
        };

        let mut tally = Tally::new(self.registry.len());
        for partial in &partials {
            tally.merge(partial);
        }

        let output = ForecastOutput::new(&self.registry, &tally, self.run.seed, start.elapsed());
        tracing::info!(
            "Forecast complete in {}ms: Dem {:.1}%, GOP {:.1}%",
            output.statistics.simulation_time_ms,
            output.national.dem_win_fraction * 100.0,
            output.national.gop_win_fraction * 100.0
        );

        Ok(output)
    }

    fn run_chunks(&self, chunks: &[u64]) -> Result<Vec<Tally>> {
        chunks
            .par_iter()
            .enumerate()
            .map(|(chunk, &trials)| self.run_chunk(chunk as u64, trials))
            .collect()
    }

    fn run_chunk(&self, chunk: u64, trials: u64) -> Result<Tally> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.run.seed);
        rng.set_stream(chunk);
        let mut draws = GaussianDraws::new(rng);

        let mut registry = self.registry.clone();
        let mut tally = Tally::new(registry.len());
        for _ in 0..trials {
            self.run_trial(&mut registry, &mut tally, &mut draws)?;
        }

        tracing::debug!("Chunk {} finished {} trials", chunk, trials);
        Ok(tally)
    }
}

/// Split `trials` into chunks of at most `chunk_size`
fn chunk_sizes(trials: u64, chunk_size: u64) -> Vec<u64> {
    let full = trials / chunk_size;
    let rest = trials % chunk_size;
    let mut chunks = vec![chunk_size; full as usize];
    if rest > 0 {
        chunks.push(rest);
    }
    chunks
}

/// Run a forecast end to end
pub fn simulate(tables: &LocaleTables, config: &ForecastConfig) -> Result<ForecastOutput> {
    Simulation::new(tables, config)?.run()
}
