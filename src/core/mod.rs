pub mod config;
pub mod error;
pub mod types;

pub use config::{Calibration, ForecastConfig, RunConfig};
pub use error::{ForecastError, Result};
