//! Core type definitions used throughout the codebase
//!
//! All margins are Democratic share minus Republican share, in percentage
//! points. Positive margins favor the Democratic side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::ForecastError;

// ============================================================================
// Constants
// ============================================================================

/// Electoral votes awarded nationally in the reference domain
pub const TOTAL_ELECTORAL_VOTES: u32 = 538;

/// Votes needed to win outright given a total
pub fn majority_threshold(total: u32) -> u32 {
    total / 2 + 1
}

// ============================================================================
// Enums
// ============================================================================

/// Subjective assessment of the current polling available for a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollQuality {
    /// Plenty of recent, reputable polling
    High,
    /// Sparse polling, blended with the prior result
    Low,
    /// No usable polling; the current poll margin is meaningless
    None,
}

impl FromStr for PollQuality {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(PollQuality::High),
            "low" => Ok(PollQuality::Low),
            "none" => Ok(PollQuality::None),
            _ => Err(ForecastError::UnknownPollQuality(s.to_string())),
        }
    }
}

impl fmt::Display for PollQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollQuality::High => "High",
            PollQuality::Low => "Low",
            PollQuality::None => "None",
        };
        f.write_str(name)
    }
}

/// Which side a margin favors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Democratic,
    Republican,
}

impl Side {
    /// A locale goes Democratic only on a strictly positive margin
    pub fn from_margin(margin: f64) -> Self {
        if margin > 0.0 {
            Side::Democratic
        } else {
            Side::Republican
        }
    }
}

/// Electoral College result of a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialOutcome {
    Won(Side),
    Tie,
}

impl TrialOutcome {
    pub fn from_tally(dem_evs: u32, gop_evs: u32) -> Self {
        match dem_evs.cmp(&gop_evs) {
            std::cmp::Ordering::Greater => TrialOutcome::Won(Side::Democratic),
            std::cmp::Ordering::Less => TrialOutcome::Won(Side::Republican),
            std::cmp::Ordering::Equal => TrialOutcome::Tie,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            TrialOutcome::Won(side) => Some(*side),
            TrialOutcome::Tie => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_threshold() {
        assert_eq!(majority_threshold(TOTAL_ELECTORAL_VOTES), 270);
        assert_eq!(majority_threshold(3), 2);
    }

    #[test]
    fn test_poll_quality_parse() {
        assert_eq!("High".parse::<PollQuality>().unwrap(), PollQuality::High);
        assert_eq!("low".parse::<PollQuality>().unwrap(), PollQuality::Low);
        assert_eq!(" None ".parse::<PollQuality>().unwrap(), PollQuality::None);
    }

    #[test]
    fn test_poll_quality_unknown_is_configuration_error() {
        let err = "Medium".parse::<PollQuality>().unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, ForecastError::UnknownPollQuality(ref s) if s == "Medium"));
    }

    #[test]
    fn test_zero_margin_goes_republican() {
        assert_eq!(Side::from_margin(0.0), Side::Republican);
        assert_eq!(Side::from_margin(0.01), Side::Democratic);
        assert_eq!(Side::from_margin(-3.0), Side::Republican);
    }

    #[test]
    fn test_trial_outcome() {
        assert_eq!(TrialOutcome::from_tally(300, 238), TrialOutcome::Won(Side::Democratic));
        assert_eq!(TrialOutcome::from_tally(238, 300), TrialOutcome::Won(Side::Republican));
        assert_eq!(TrialOutcome::from_tally(269, 269), TrialOutcome::Tie);
        assert_eq!(TrialOutcome::Tie.winner(), None);
    }
}
