//! Compare a forecast against what actually happened

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::core::error::Result;
use crate::core::types::Side;
use crate::data::ActualResults;
use crate::forecast::output::{signed_margin, ForecastOutput};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocaleMiss {
    pub code: String,
    pub predicted_margin: f64,
    pub actual_margin: f64,
    pub called_correctly: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Backtest {
    /// Sorted by predicted margin, most Republican first
    pub locales: Vec<LocaleMiss>,
    pub correct_calls: usize,
    pub mean_absolute_miss: f64,
    pub predicted_dem_electoral_votes: f64,
    pub predicted_gop_electoral_votes: f64,
    pub actual_dem_electoral_votes: u32,
    pub actual_gop_electoral_votes: u32,
}

impl Backtest {
    /// A locale is called correctly when the mean forecast margin and the
    /// actual margin favor the same side. A mean of exactly zero is a
    /// Republican call, like any zero margin.
    pub fn compare(output: &ForecastOutput, actual: &ActualResults) -> Result<Self> {
        let mut locales = output
            .locales
            .iter()
            .map(|l| -> Result<LocaleMiss> {
                let actual_margin = actual.margin(&l.code)?;
                Ok(LocaleMiss {
                    code: l.code.clone(),
                    predicted_margin: l.mean_margin,
                    actual_margin,
                    called_correctly: Side::from_margin(l.mean_margin)
                        == Side::from_margin(actual_margin),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        locales.sort_by(|a, b| a.predicted_margin.total_cmp(&b.predicted_margin));

        let correct_calls = locales.iter().filter(|l| l.called_correctly).count();
        let mean_absolute_miss = if locales.is_empty() {
            0.0
        } else {
            locales
                .iter()
                .map(|l| (l.predicted_margin - l.actual_margin).abs())
                .sum::<f64>()
                / locales.len() as f64
        };

        Ok(Self {
            locales,
            correct_calls,
            mean_absolute_miss,
            predicted_dem_electoral_votes: output.national.mean_dem_electoral_votes,
            predicted_gop_electoral_votes: output.national.mean_gop_electoral_votes,
            actual_dem_electoral_votes: actual.dem_electoral_votes,
            actual_gop_electoral_votes: actual.gop_electoral_votes,
        })
    }

    pub fn accuracy(&self) -> f64 {
        if self.locales.is_empty() {
            0.0
        } else {
            self.correct_calls as f64 / self.locales.len() as f64
        }
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:^40}", "ACTUAL RESULTS");
        let _ = writeln!(out, "{:<8}{:>12}{:>12}  Call", "Locale", "Predicted", "Actual");
        for l in &self.locales {
            let _ = writeln!(
                out,
                "{:<8}{:>12}{:>12}  {}",
                l.code,
                signed_margin(l.predicted_margin),
                signed_margin(l.actual_margin),
                if l.called_correctly { "ok" } else { "MISS" }
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Locales correctly called: {} / {} ({:.0}%)",
            self.correct_calls,
            self.locales.len(),
            self.accuracy() * 100.0
        );
        let _ = writeln!(out, "Average margin miss: {:.1}", self.mean_absolute_miss);
        let _ = writeln!(
            out,
            "Predicted electoral votes: {:.0} Democratic, {:.0} Republican",
            self.predicted_dem_electoral_votes, self.predicted_gop_electoral_votes
        );
        let _ = writeln!(
            out,
            "Actual electoral votes: {} Democratic, {} Republican",
            self.actual_dem_electoral_votes, self.actual_gop_electoral_votes
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ForecastError;
    use crate::forecast::output::{LocaleSummary, NationalSummary, RunStats};
    use std::collections::HashMap;

    fn summary(code: &str, mean_margin: f64) -> LocaleSummary {
        LocaleSummary {
            code: code.into(),
            electoral_votes: 1,
            dem_win_fraction: 0.5,
            gop_win_fraction: 0.5,
            mean_margin,
            tipping_point_fraction: 0.0,
            smallest_margin_fraction: 0.0,
        }
    }

    fn output(locales: Vec<LocaleSummary>) -> ForecastOutput {
        ForecastOutput {
            national: NationalSummary {
                dem_win_fraction: 0.6,
                gop_win_fraction: 0.4,
                tie_fraction: 0.0,
                mean_dem_electoral_votes: 2.0,
                mean_gop_electoral_votes: 1.0,
                popular_vote_divergence: 0.0,
            },
            locales,
            outcomes: vec![],
            statistics: RunStats {
                trials: 1,
                seed: 0,
                simulation_time_ms: 0,
                skipped_tipping_point: 0,
                skipped_smallest_margin: 0,
            },
        }
    }

    fn actual(pairs: &[(&str, f64)]) -> ActualResults {
        ActualResults {
            margins: pairs.iter().map(|&(c, m)| (c.to_string(), m)).collect::<HashMap<_, _>>(),
            dem_electoral_votes: 2,
            gop_electoral_votes: 1,
        }
    }

    #[test]
    fn test_compare_counts_calls_and_misses() {
        let forecast = output(vec![summary("AA", 4.0), summary("BB", -2.0), summary("CC", 0.0)]);
        let results = actual(&[("AA", 1.0), ("BB", 3.0), ("CC", -1.0)]);

        let backtest = Backtest::compare(&forecast, &results).unwrap();

        assert_eq!(backtest.correct_calls, 2);
        assert!((backtest.mean_absolute_miss - (3.0 + 5.0 + 1.0) / 3.0).abs() < 1e-12);
        assert_eq!(backtest.locales[0].code, "BB");
        assert!(!backtest.locales[0].called_correctly);
        assert!((backtest.accuracy() - 2.0 / 3.0).abs() < 1e-12);
        assert!(backtest.summary().contains("Locales correctly called: 2 / 3"));
    }

    #[test]
    fn test_missing_actual_is_not_found() {
        let forecast = output(vec![summary("AA", 4.0)]);
        let results = actual(&[("BB", 1.0)]);
        let err = Backtest::compare(&forecast, &results).unwrap_err();
        assert!(matches!(err, ForecastError::LocaleNotFound(ref c) if c == "AA"));
    }
}
