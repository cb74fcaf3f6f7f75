//! Forecast output and serialization

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::time::Duration;

use crate::core::error::{ForecastError, Result};
use crate::forecast::aggregator::{Tally, OUTCOME_BIN_LABELS};
use crate::forecast::registry::LocaleRegistry;

/// Final statistics for one locale
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocaleSummary {
    pub code: String,
    pub electoral_votes: u32,
    pub dem_win_fraction: f64,
    pub gop_win_fraction: f64,
    pub mean_margin: f64,
    pub tipping_point_fraction: f64,
    pub smallest_margin_fraction: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBin {
    pub label: String,
    pub fraction: f64,
}

/// National statistics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NationalSummary {
    pub dem_win_fraction: f64,
    pub gop_win_fraction: f64,
    pub tie_fraction: f64,
    pub mean_dem_electoral_votes: f64,
    pub mean_gop_electoral_votes: f64,
    /// Fraction of trials where the popular-vote leader lost the
    /// Electoral College
    pub popular_vote_divergence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub trials: u64,
    pub seed: u64,
    pub simulation_time_ms: u64,
    pub skipped_tipping_point: u64,
    pub skipped_smallest_margin: u64,
}

/// Complete forecast output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub national: NationalSummary,
    /// Sorted by locale code
    pub locales: Vec<LocaleSummary>,
    pub outcomes: Vec<OutcomeBin>,
    pub statistics: RunStats,
}

impl ForecastOutput {
    pub fn new(registry: &LocaleRegistry, tally: &Tally, seed: u64, elapsed: Duration) -> Self {
        let trials = tally.trials.max(1) as f64;

        let mut locales: Vec<LocaleSummary> = registry
            .iter()
            .zip(&tally.locales)
            .map(|(locale, lt)| {
                let dem_win_fraction = tally.fraction(lt.dem_wins);
                LocaleSummary {
                    code: locale.code.clone(),
                    electoral_votes: locale.electoral_votes,
                    dem_win_fraction,
                    gop_win_fraction: 1.0 - dem_win_fraction,
                    mean_margin: lt.margin_sum / trials,
                    tipping_point_fraction: tally.fraction(lt.tipping_points),
                    smallest_margin_fraction: tally.fraction(lt.smallest_margins),
                }
            })
            .collect();
        locales.sort_by(|a, b| a.code.cmp(&b.code));

        let outcomes = OUTCOME_BIN_LABELS
            .iter()
            .zip(tally.histogram)
            .map(|(label, count)| OutcomeBin {
                label: label.to_string(),
                fraction: tally.fraction(count),
            })
            .collect();

        Self {
            national: NationalSummary {
                dem_win_fraction: tally.fraction(tally.dem_wins),
                gop_win_fraction: tally.fraction(tally.gop_wins),
                tie_fraction: tally.fraction(tally.ties),
                mean_dem_electoral_votes: tally.dem_electoral_votes as f64 / trials,
                mean_gop_electoral_votes: tally.gop_electoral_votes as f64 / trials,
                popular_vote_divergence: tally.fraction(tally.popular_vote_divergences),
            },
            locales,
            outcomes,
            statistics: RunStats {
                trials: tally.trials,
                seed,
                simulation_time_ms: elapsed.as_millis() as u64,
                skipped_tipping_point: tally.skipped_tipping_point,
                skipped_smallest_margin: tally.skipped_smallest_margin,
            },
        }
    }

    pub fn locale(&self, code: &str) -> Result<&LocaleSummary> {
        self.locales
            .iter()
            .find(|l| l.code == code)
            .ok_or_else(|| ForecastError::LocaleNotFound(code.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Text report: national odds, per-locale table, outcome brackets
    pub fn summary(&self) -> String {
        let n = &self.national;
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Win %: {:.1} Democratic, {:.1} Republican, {:.1} Ties",
            pct(n.dem_win_fraction),
            pct(n.gop_win_fraction),
            pct(n.tie_fraction)
        );
        let _ = writeln!(
            out,
            "Average electoral votes: {:.0} Democratic, {:.0} Republican",
            n.mean_dem_electoral_votes, n.mean_gop_electoral_votes
        );
        let _ = writeln!(out, "EC winner loses PV, %: {:.1}", pct(n.popular_vote_divergence));
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "{:<8}{:>10}{:>10}{:>12}{:>8}{:>12}",
            "Locale", "Dem win %", "GOP win %", "Avg margin", "Tip %", "Closest %"
        );
        for l in &self.locales {
            let _ = writeln!(
                out,
                "{:<8}{:>10.0}{:>10.0}{:>12}{:>8.1}{:>12.1}",
                l.code,
                pct(l.dem_win_fraction),
                pct(l.gop_win_fraction),
                signed_margin(l.mean_margin),
                pct(l.tipping_point_fraction),
                pct(l.smallest_margin_fraction)
            );
        }
        let _ = writeln!(out);

        for bin in &self.outcomes {
            let _ = writeln!(out, "{:<22}{:>6.1}", format!("{}, %:", bin.label), pct(bin.fraction));
        }

        let s = &self.statistics;
        let _ = writeln!(out);
        let _ = write!(out, "{} trials (seed {}) in {}ms", s.trials, s.seed, s.simulation_time_ms);
        if s.skipped_tipping_point > 0 || s.skipped_smallest_margin > 0 {
            let _ = write!(
                out,
                "; attribution skipped: {} tipping point, {} smallest margin",
                s.skipped_tipping_point, s.skipped_smallest_margin
            );
        }
        out.push('\n');

        out
    }
}

fn pct(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Margin with an explicit sign, one decimal
pub fn signed_margin(margin: f64) -> String {
    let rounded = (margin * 10.0).round() / 10.0;
    if rounded > 0.0 {
        format!("+{:.1}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
