//! Trial sampler - national error terms and per-locale margins
//!
//! One trial draws three national quantities shared by every locale:
//!
//! - the Election Day national polling average (today's average plus drift)
//! - the average state-poll error
//! - the average national-poll error, which contains the state-poll error
//!
//! Each sampled locale then adds its own noise according to its poll
//! quality. Locales whose margin comes from a split group are skipped here.

use serde::{Deserialize, Serialize};

use crate::core::config::Calibration;
use crate::core::types::PollQuality;
use crate::forecast::draws::DrawSource;
use crate::forecast::locale::Locale;
use crate::forecast::registry::LocaleRegistry;

/// Weight on current polls for low-quality locales; the prior result gets
/// the rest
const LOW_QUALITY_POLL_WEIGHT: f64 = 0.5;

/// National draws for one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NationalDraws {
    /// National polling average on Election Day
    pub election_day_average: f64,
    /// Average error of the state polls
    pub state_poll_error: f64,
    /// Average error of the national polls
    pub national_poll_error: f64,
}

impl NationalDraws {
    /// Simulated national popular-vote margin
    pub fn popular_vote_margin(&self) -> f64 {
        self.election_day_average + self.national_poll_error
    }
}

#[derive(Debug, Clone)]
pub struct TrialSampler {
    calibration: Calibration,
}

impl TrialSampler {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Draw the national error terms for a trial
    pub fn draw_national(&self, draws: &mut impl DrawSource) -> NationalDraws {
        let c = &self.calibration;
        let election_day_average = draws.normal(c.trailing_national_average, c.national_drift_std);
        let state_poll_error = draws.normal(0.0, c.state_poll_error_std);
        let national_poll_error = state_poll_error + draws.normal(0.0, c.national_poll_error_std);

        NationalDraws {
            election_day_average,
            state_poll_error,
            national_poll_error,
        }
    }

    /// Draw one locale's margin given the trial's national draws
    pub fn locale_margin(
        &self,
        locale: &Locale,
        national: &NationalDraws,
        draws: &mut impl DrawSource,
    ) -> f64 {
        let c = &self.calibration;
        let prior_lean = locale.prior_margin - c.prior_national_margin;

        match locale.quality {
            PollQuality::High => {
                let shift = draws.normal(0.0, c.poll_shift_std);
                let election_day = national.election_day_average + locale.poll_margin + shift;
                election_day + national.state_poll_error * draws.standard_normal()
            }
            PollQuality::Low => {
                let shift = draws.normal(0.0, c.poll_shift_std);
                let election_day = national.election_day_average
                    + LOW_QUALITY_POLL_WEIGHT * locale.poll_margin
                    + (1.0 - LOW_QUALITY_POLL_WEIGHT) * prior_lean
                    + shift;
                election_day + national.state_poll_error * draws.standard_normal()
            }
            PollQuality::None => {
                let drift = draws.normal(0.0, c.unpolled_drift_std);
                prior_lean + national.election_day_average + drift + national.national_poll_error
            }
        }
    }

    /// Draw a trial: national terms first, then every sampled locale in
    /// canonical order. Scratch margins must already be reset.
    pub fn sample(&self, registry: &mut LocaleRegistry, draws: &mut impl DrawSource) -> NationalDraws {
        let national = self.draw_national(draws);

        for locale in registry.iter_mut().filter(|l| l.is_sampled()) {
            locale.margin = self.locale_margin(locale, &national, draws);
        }

        national
    }
}
