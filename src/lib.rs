//! Electoral Forecast - Monte Carlo Electoral College model

pub mod core;
pub mod data;
pub mod forecast;
