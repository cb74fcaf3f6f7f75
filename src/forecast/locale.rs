//! Locale - one voting unit

use serde::{Deserialize, Serialize};

use crate::core::types::{PollQuality, Side};

/// How a locale's electoral votes relate to its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allocation {
    /// Ordinary winner-take-all state
    Statewide,
    /// At-large votes of a split state
    AtLarge,
    /// One congressional district of a split state
    District,
}

/// Where a locale's trial margin comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginSource {
    /// Drawn by the trial sampler
    Sampled,
    /// Computed by the split resolver from sibling locales
    Resolved,
}

/// A state or district with its static inputs and per-trial scratch margin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    pub code: String,
    pub quality: PollQuality,
    /// Current poll margin relative to the national average.
    /// Meaningless when `quality` is `None`.
    pub poll_margin: f64,
    pub prior_margin: f64,
    pub electoral_votes: u32,
    pub allocation: Allocation,
    pub source: MarginSource,
    /// Simulated margin for the current trial
    pub margin: f64,
}

impl Locale {
    pub fn new(
        code: impl Into<String>,
        quality: PollQuality,
        poll_margin: f64,
        prior_margin: f64,
        electoral_votes: u32,
    ) -> Self {
        Self {
            code: code.into(),
            quality,
            poll_margin,
            prior_margin,
            electoral_votes,
            allocation: Allocation::Statewide,
            source: MarginSource::Sampled,
            margin: 0.0,
        }
    }

    /// An unpolled locale
    pub fn unpolled(code: impl Into<String>, prior_margin: f64, electoral_votes: u32) -> Self {
        Self::new(code, PollQuality::None, 0.0, prior_margin, electoral_votes)
    }

    /// District-level locales never compete for "closest race"
    pub fn is_split_sub_unit(&self) -> bool {
        self.allocation == Allocation::District
    }

    pub fn is_sampled(&self) -> bool {
        self.source == MarginSource::Sampled
    }

    /// Side carrying this locale in the current trial
    pub fn winner(&self) -> Side {
        Side::from_margin(self.margin)
    }
}
