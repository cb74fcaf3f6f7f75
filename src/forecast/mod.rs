//! Electoral College forecast engine
//!
//! Runs a large ensemble of correlated random trials over every locale and
//! aggregates per-locale and national statistics.

pub mod aggregator;
pub mod backtest;
pub mod draws;
pub mod driver;
pub mod locale;
pub mod output;
pub mod registry;
pub mod resolver;
pub mod sampler;

pub use aggregator::{Tally, TrialSummary, OUTCOME_BINS};
pub use backtest::Backtest;
pub use draws::{DrawSource, GaussianDraws, MeanDraws};
pub use driver::{simulate, Simulation};
pub use locale::{Allocation, Locale, MarginSource};
pub use output::{ForecastOutput, LocaleSummary};
pub use registry::LocaleRegistry;
pub use resolver::SplitResolver;
pub use sampler::{NationalDraws, TrialSampler};
