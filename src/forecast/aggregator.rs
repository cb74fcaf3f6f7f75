//! Trial aggregator - running per-locale and national statistics
//!
//! A `Tally` holds raw counts and sums. Tallies from independent workers
//! merge by addition; fractions are only formed once, when the run is
//! finalised.

use serde::{Deserialize, Serialize};

use crate::core::error::{ForecastError, Result};
use crate::core::types::{majority_threshold, Side, TrialOutcome};
use crate::forecast::registry::LocaleRegistry;
use crate::forecast::sampler::NationalDraws;

// ============================================================================
// Outcome histogram
// ============================================================================

pub const OUTCOME_BINS: usize = 16;

/// Exclusive upper edges of the first 15 bins, over Dem EVs - GOP EVs.
/// Bin 15 takes everything from 280 up.
pub const OUTCOME_BIN_EDGES: [i64; OUTCOME_BINS - 1] =
    [-279, -209, -149, -99, -59, -29, -9, 1, 10, 30, 60, 100, 150, 210, 280];

/// Labels matching the betting-market brackets the bins were taken from
pub const OUTCOME_BIN_LABELS: [&str; OUTCOME_BINS] = [
    "GOP win by 280+",
    "GOP win by 210-279",
    "GOP win by 150-209",
    "GOP win by 100-149",
    "GOP win by 60-99",
    "GOP win by 30-59",
    "GOP win by 10-29",
    "GOP win by 0-9",
    "Dem win by 1-9",
    "Dem win by 10-29",
    "Dem win by 30-59",
    "Dem win by 60-99",
    "Dem win by 100-149",
    "Dem win by 150-209",
    "Dem win by 210-279",
    "Dem win by 280+",
];

/// Histogram bin holding an electoral vote margin
pub fn outcome_bin(ev_margin: i64) -> usize {
    OUTCOME_BIN_EDGES.partition_point(|&edge| ev_margin >= edge)
}

// ============================================================================
// Per-trial selections
// ============================================================================

/// Electoral votes won by (Democratic, Republican) side
pub fn tally_electoral_votes(registry: &LocaleRegistry) -> (u32, u32) {
    registry.iter().fold((0, 0), |(dem, gop), locale| match locale.winner() {
        Side::Democratic => (dem + locale.electoral_votes, gop),
        Side::Republican => (dem, gop + locale.electoral_votes),
    })
}

/// The locale that carries the winner to a majority
///
/// Locales are walked from strongest to weakest for the winner. Returns
/// `None` for a tie, or if the majority is never reached.
pub fn tipping_point(registry: &LocaleRegistry, outcome: TrialOutcome) -> Option<usize> {
    let winner = outcome.winner()?;
    let threshold = majority_threshold(registry.expected_total());
    let order = registry.ranked_by_margin(winner == Side::Democratic);

    let mut cumulative = 0;
    for idx in order {
        cumulative += registry.locale(idx).electoral_votes;
        if cumulative >= threshold {
            return Some(idx);
        }
    }
    None
}

/// The whole-state race with the smallest absolute margin
///
/// Districts are excluded. Returns `None` when the two closest eligible
/// races are exactly tied, or when nothing is eligible.
pub fn smallest_margin(registry: &LocaleRegistry) -> Option<usize> {
    let mut eligible = registry
        .ranked_by_abs_margin()
        .into_iter()
        .filter(|&idx| !registry.locale(idx).is_split_sub_unit());

    let closest = eligible.next()?;
    if let Some(runner_up) = eligible.next() {
        if registry.margin(closest).abs() == registry.margin(runner_up).abs() {
            return None;
        }
    }
    Some(closest)
}

/// Did the popular-vote leader lose the Electoral College?
pub fn popular_vote_diverges(popular_vote_margin: f64, outcome: TrialOutcome) -> bool {
    match outcome {
        TrialOutcome::Won(Side::Republican) => popular_vote_margin > 0.0,
        TrialOutcome::Won(Side::Democratic) => popular_vote_margin < 0.0,
        TrialOutcome::Tie => false,
    }
}

/// What one trial contributed
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub dem_electoral_votes: u32,
    pub gop_electoral_votes: u32,
    pub outcome: TrialOutcome,
    pub outcome_bin: usize,
    pub tipping_point: Option<usize>,
    pub smallest_margin: Option<usize>,
    pub popular_vote_diverged: bool,
}

// ============================================================================
// Tally
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleTally {
    pub dem_wins: u64,
    pub margin_sum: f64,
    pub tipping_points: u64,
    pub smallest_margins: u64,
}

/// Running aggregates over some number of trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub trials: u64,
    pub locales: Vec<LocaleTally>,
    pub dem_wins: u64,
    pub gop_wins: u64,
    pub ties: u64,
    pub dem_electoral_votes: u64,
    pub gop_electoral_votes: u64,
    pub histogram: [u64; OUTCOME_BINS],
    pub popular_vote_divergences: u64,
    pub skipped_tipping_point: u64,
    pub skipped_smallest_margin: u64,
}

impl Tally {
    pub fn new(locale_count: usize) -> Self {
        Self {
            trials: 0,
            locales: vec![LocaleTally::default(); locale_count],
            dem_wins: 0,
            gop_wins: 0,
            ties: 0,
            dem_electoral_votes: 0,
            gop_electoral_votes: 0,
            histogram: [0; OUTCOME_BINS],
            popular_vote_divergences: 0,
            skipped_tipping_point: 0,
            skipped_smallest_margin: 0,
        }
    }

    /// Fold one fully resolved trial into the running aggregates
    pub fn record(&mut self, registry: &LocaleRegistry, national: &NationalDraws) -> Result<TrialSummary> {
        debug_assert_eq!(self.locales.len(), registry.len());

        for (locale, tally) in registry.iter().zip(self.locales.iter_mut()) {
            if !locale.margin.is_finite() {
                return Err(ForecastError::NonFiniteMargin {
                    code: locale.code.clone(),
                    margin: locale.margin,
                });
            }
            tally.margin_sum += locale.margin;
            if locale.winner() == Side::Democratic {
                tally.dem_wins += 1;
            }
        }

        let (dem, gop) = tally_electoral_votes(registry);
        self.dem_electoral_votes += u64::from(dem);
        self.gop_electoral_votes += u64::from(gop);

        let outcome = TrialOutcome::from_tally(dem, gop);
        match outcome {
            TrialOutcome::Won(Side::Democratic) => self.dem_wins += 1,
            TrialOutcome::Won(Side::Republican) => self.gop_wins += 1,
            TrialOutcome::Tie => self.ties += 1,
        }

        let bin = outcome_bin(i64::from(dem) - i64::from(gop));
        self.histogram[bin] += 1;

        let tipping = tipping_point(registry, outcome);
        match tipping {
            Some(idx) => self.locales[idx].tipping_points += 1,
            None => {
                self.skipped_tipping_point += 1;
                tracing::debug!("Tipping point skipped: {} - {} electoral votes", dem, gop);
            }
        }

        let closest = smallest_margin(registry);
        match closest {
            Some(idx) => self.locales[idx].smallest_margins += 1,
            None => {
                self.skipped_smallest_margin += 1;
                tracing::debug!("Smallest margin skipped: closest races tied exactly");
            }
        }

        let diverged = popular_vote_diverges(national.popular_vote_margin(), outcome);
        if diverged {
            self.popular_vote_divergences += 1;
        }

        self.trials += 1;

        Ok(TrialSummary {
            dem_electoral_votes: dem,
            gop_electoral_votes: gop,
            outcome,
            outcome_bin: bin,
            tipping_point: tipping,
            smallest_margin: closest,
            popular_vote_diverged: diverged,
        })
    }

    /// Add another worker's tally into this one
    pub fn merge(&mut self, other: &Tally) {
        debug_assert_eq!(self.locales.len(), other.locales.len());

        self.trials += other.trials;
        for (mine, theirs) in self.locales.iter_mut().zip(&other.locales) {
            mine.dem_wins += theirs.dem_wins;
            mine.margin_sum += theirs.margin_sum;
            mine.tipping_points += theirs.tipping_points;
            mine.smallest_margins += theirs.smallest_margins;
        }
        self.dem_wins += other.dem_wins;
        self.gop_wins += other.gop_wins;
        self.ties += other.ties;
        self.dem_electoral_votes += other.dem_electoral_votes;
        self.gop_electoral_votes += other.gop_electoral_votes;
        for (mine, theirs) in self.histogram.iter_mut().zip(other.histogram) {
            *mine += theirs;
        }
        self.popular_vote_divergences += other.popular_vote_divergences;
        self.skipped_tipping_point += other.skipped_tipping_point;
        self.skipped_smallest_margin += other.skipped_smallest_margin;
    }

    /// Fraction of recorded trials; zero before any trial
    pub fn fraction(&self, count: u64) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            count as f64 / self.trials as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PollQuality;
    use crate::forecast::locale::{Allocation, Locale};

    /// Four states and two districts, 20 electoral votes
    fn toy_registry(margins: &[f64; 6]) -> LocaleRegistry {
        let mut locales = vec![
            Locale::new("AA", PollQuality::High, 0.0, 0.0, 7),
            Locale::new("BB", PollQuality::High, 0.0, 0.0, 5),
            Locale::new("CC", PollQuality::High, 0.0, 0.0, 4),
            Locale::new("DD", PollQuality::High, 0.0, 0.0, 2),
            Locale::unpolled("D1", 0.0, 1),
            Locale::unpolled("D2", 0.0, 1),
        ];
        locales[3].allocation = Allocation::AtLarge;
        locales[4].allocation = Allocation::District;
        locales[5].allocation = Allocation::District;
        for (locale, m) in locales.iter_mut().zip(margins) {
            locale.margin = *m;
        }
        LocaleRegistry::new(locales, 20).unwrap()
    }

    fn national(popular: f64) -> NationalDraws {
        NationalDraws {
            election_day_average: popular,
            state_poll_error: 0.0,
            national_poll_error: 0.0,
        }
    }

    #[test]
    fn test_outcome_bins_match_edges() {
        assert_eq!(outcome_bin(-538), 0);
        assert_eq!(outcome_bin(-280), 0);
        assert_eq!(outcome_bin(-279), 1);
        assert_eq!(outcome_bin(-10), 6);
        assert_eq!(outcome_bin(-9), 7);
        assert_eq!(outcome_bin(0), 7);
        assert_eq!(outcome_bin(1), 8);
        assert_eq!(outcome_bin(9), 8);
        assert_eq!(outcome_bin(10), 9);
        assert_eq!(outcome_bin(74), 11);
        assert_eq!(outcome_bin(279), 14);
        assert_eq!(outcome_bin(280), 15);
        assert_eq!(outcome_bin(538), 15);
    }

    #[test]
    fn test_tally_electoral_votes() {
        let registry = toy_registry(&[5.0, -1.0, 0.0, 2.0, 3.0, -3.0]);
        assert_eq!(tally_electoral_votes(&registry), (10, 10));
    }

    #[test]
    fn test_tipping_point_democratic_win() {
        // Dem: AA 7, CC 4, DD 2 = 13 of 20; threshold 11
        let registry = toy_registry(&[9.0, -1.0, 1.0, 4.0, 2.0, -3.0]);
        let outcome = TrialOutcome::from_tally(14, 6);
        // Strongest first: AA(9) 7, DD(4) 9, D1(2) 10, CC(1) 14
        assert_eq!(tipping_point(&registry, outcome), Some(2));
    }

    #[test]
    fn test_tipping_point_republican_win() {
        let registry = toy_registry(&[-9.0, -5.0, 1.0, 4.0, 2.0, -3.0]);
        let outcome = TrialOutcome::from_tally(8, 12);
        // Weakest first: AA(-9) 7, BB(-5) 12
        assert_eq!(tipping_point(&registry, outcome), Some(1));
    }

    #[test]
    fn test_tipping_point_skipped_on_tie() {
        let registry = toy_registry(&[5.0, -1.0, 0.0, 2.0, 3.0, -3.0]);
        assert_eq!(tipping_point(&registry, TrialOutcome::Tie), None);
    }

    #[test]
    fn test_smallest_margin_excludes_districts() {
        let registry = toy_registry(&[9.0, -5.0, 1.5, 4.0, 0.1, -0.2]);
        assert_eq!(smallest_margin(&registry), Some(2));
    }

    #[test]
    fn test_smallest_margin_uses_absolute_value() {
        let registry = toy_registry(&[9.0, -0.5, 1.5, 4.0, 0.1, -0.2]);
        assert_eq!(smallest_margin(&registry), Some(1));
    }

    #[test]
    fn test_smallest_margin_exact_tie_skipped() {
        let registry = toy_registry(&[9.0, -1.5, 1.5, 4.0, 0.1, -0.2]);
        assert_eq!(smallest_margin(&registry), None);
    }

    #[test]
    fn test_popular_vote_divergence() {
        let dem = TrialOutcome::Won(Side::Democratic);
        let gop = TrialOutcome::Won(Side::Republican);
        assert!(popular_vote_diverges(2.0, gop));
        assert!(popular_vote_diverges(-0.5, dem));
        assert!(!popular_vote_diverges(2.0, dem));
        assert!(!popular_vote_diverges(-2.0, gop));
        assert!(!popular_vote_diverges(2.0, TrialOutcome::Tie));
        assert!(!popular_vote_diverges(0.0, gop));
    }

    #[test]
    fn test_record_updates_everything_once() {
        let registry = toy_registry(&[-9.0, -5.0, 1.0, 4.0, 2.0, -3.0]);
        let mut tally = Tally::new(registry.len());

        let summary = tally.record(&registry, &national(1.0)).unwrap();

        assert_eq!(summary.dem_electoral_votes, 7);
        assert_eq!(summary.gop_electoral_votes, 13);
        assert_eq!(summary.outcome, TrialOutcome::Won(Side::Republican));
        assert_eq!(summary.outcome_bin, outcome_bin(-6));
        assert_eq!(summary.tipping_point, Some(1));
        assert_eq!(summary.smallest_margin, Some(2));
        assert!(summary.popular_vote_diverged);

        assert_eq!(tally.trials, 1);
        assert_eq!(tally.gop_wins, 1);
        assert_eq!(tally.dem_electoral_votes, 7);
        assert_eq!(tally.histogram.iter().sum::<u64>(), 1);
        assert_eq!(tally.locales[2].dem_wins, 1);
        assert_eq!(tally.locales[0].dem_wins, 0);
        assert_eq!(tally.locales[0].margin_sum, -9.0);
        assert_eq!(tally.locales[1].tipping_points, 1);
        assert_eq!(tally.locales[2].smallest_margins, 1);
        assert_eq!(tally.popular_vote_divergences, 1);
    }

    #[test]
    fn test_record_counts_skips() {
        let registry = toy_registry(&[5.0, -1.0, 0.0, 2.0, 3.0, -3.0]);
        let mut tally = Tally::new(registry.len());
        let summary = tally.record(&registry, &national(1.0)).unwrap();

        assert_eq!(summary.outcome, TrialOutcome::Tie);
        assert_eq!(tally.ties, 1);
        assert_eq!(tally.skipped_tipping_point, 1);
        assert_eq!(tally.locales.iter().map(|l| l.tipping_points).sum::<u64>(), 0);
    }

    #[test]
    fn test_record_rejects_nan() {
        let registry = toy_registry(&[f64::NAN, -5.0, 1.0, 4.0, 2.0, -3.0]);
        let mut tally = Tally::new(registry.len());
        let err = tally.record(&registry, &national(1.0)).unwrap_err();
        assert!(matches!(err, ForecastError::NonFiniteMargin { ref code, .. } if code == "AA"));
        assert_eq!(tally.trials, 0);
    }

    #[test]
    fn test_merge_adds_counts() {
        let registry = toy_registry(&[-9.0, -5.0, 1.0, 4.0, 2.0, -3.0]);
        let mut a = Tally::new(registry.len());
        let mut b = Tally::new(registry.len());
        a.record(&registry, &national(1.0)).unwrap();
        b.record(&registry, &national(-1.0)).unwrap();
        b.record(&registry, &national(-1.0)).unwrap();

        a.merge(&b);

        assert_eq!(a.trials, 3);
        assert_eq!(a.gop_wins, 3);
        assert_eq!(a.popular_vote_divergences, 1);
        assert_eq!(a.locales[0].margin_sum, -27.0);
        assert_eq!(a.histogram.iter().sum::<u64>(), 3);
        assert!((a.fraction(a.gop_wins) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fraction_before_any_trial() {
        let tally = Tally::new(3);
        assert_eq!(tally.fraction(0), 0.0);
    }
}
