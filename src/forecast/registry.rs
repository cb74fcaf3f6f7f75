//! Locale registry
//!
//! Owns every locale in canonical (input) order. Rankings are handed out
//! as index views and never reorder the locales themselves.

use ahash::{AHashMap, AHashSet};

use crate::core::error::{ForecastError, Result};
use crate::core::types::PollQuality;
use crate::data::{LocaleTables, SplitGroup};
use crate::forecast::locale::{Allocation, Locale, MarginSource};

#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    by_code: AHashMap<String, usize>,
    expected_total: u32,
}

impl LocaleRegistry {
    /// Build and validate a registry from static input tables
    ///
    /// Polled rows come first, then unpolled rows, in table order.
    pub fn from_tables(tables: &LocaleTables) -> Result<Self> {
        let mut locales = Vec::with_capacity(tables.locale_count());

        for row in &tables.polled {
            let quality: PollQuality = row.quality.parse()?;
            if quality == PollQuality::None {
                tracing::warn!("Polled locale {} has poll quality None; poll margin ignored", row.code);
            }
            locales.push(Locale::new(
                row.code.clone(),
                quality,
                row.poll_margin,
                row.prior_margin,
                row.electoral_votes,
            ));
        }
        for row in &tables.unpolled {
            locales.push(Locale::unpolled(
                row.code.clone(),
                row.prior_margin,
                row.electoral_votes,
            ));
        }

        let mut registry = Self::new(locales, tables.expected_total)?;
        registry.apply_split_groups(&tables.splits)?;

        tracing::info!(
            "Registry built: {} locales, {} electoral votes, {} split groups",
            registry.len(),
            registry.total_electoral_votes(),
            tables.splits.len()
        );

        Ok(registry)
    }

    /// Build a registry from ready-made locales, validating codes and the
    /// electoral vote total
    pub fn new(locales: Vec<Locale>, expected_total: u32) -> Result<Self> {
        let mut by_code = AHashMap::with_capacity(locales.len());
        for (idx, locale) in locales.iter().enumerate() {
            if locale.electoral_votes == 0 {
                return Err(ForecastError::InvalidElectoralVotes(format!(
                    "{} has no electoral votes",
                    locale.code
                )));
            }
            if !locale.prior_margin.is_finite() || !locale.poll_margin.is_finite() {
                return Err(ForecastError::InvalidCalibration(format!(
                    "{} has a non-finite input margin",
                    locale.code
                )));
            }
            if by_code.insert(locale.code.clone(), idx).is_some() {
                return Err(ForecastError::DuplicateLocale(locale.code.clone()));
            }
        }

        let found: u32 = locales.iter().map(|l| l.electoral_votes).sum();
        if found != expected_total {
            return Err(ForecastError::ElectoralVoteTotal {
                expected: expected_total,
                found,
            });
        }

        Ok(Self {
            locales,
            by_code,
            expected_total,
        })
    }

    /// Mark the members of each split group
    ///
    /// Paired groups: parent stays sampled, districts are resolved.
    /// Composite groups: districts stay sampled, parent is resolved.
    fn apply_split_groups(&mut self, groups: &[SplitGroup]) -> Result<()> {
        let mut seen = AHashSet::new();

        for group in groups {
            let parent = self.index_of(group.parent())?;
            let districts = group
                .districts()
                .into_iter()
                .map(|code| self.index_of(code))
                .collect::<Result<Vec<_>>>()?;

            if districts.is_empty() {
                return Err(ForecastError::InvalidSplitGroup(format!(
                    "{} has no districts",
                    group.parent()
                )));
            }
            for idx in std::iter::once(parent).chain(districts.iter().copied()) {
                if !seen.insert(idx) {
                    return Err(ForecastError::InvalidSplitGroup(format!(
                        "{} appears in more than one split role",
                        self.locales[idx].code
                    )));
                }
            }

            let (parent_source, district_source) = match group {
                SplitGroup::Paired { .. } => (MarginSource::Sampled, MarginSource::Resolved),
                SplitGroup::Composite { .. } => (MarginSource::Resolved, MarginSource::Sampled),
            };

            let parent_locale = &mut self.locales[parent];
            parent_locale.allocation = Allocation::AtLarge;
            parent_locale.source = parent_source;

            for idx in districts {
                let district = &mut self.locales[idx];
                district.allocation = Allocation::District;
                district.source = district_source;
            }
        }

        Ok(())
    }

    /// Look up a locale by code. A miss is a configuration error.
    pub fn get(&self, code: &str) -> Result<&Locale> {
        self.index_of(code).map(|idx| &self.locales[idx])
    }

    pub fn index_of(&self, code: &str) -> Result<usize> {
        self.by_code
            .get(code)
            .copied()
            .ok_or_else(|| ForecastError::LocaleNotFound(code.to_string()))
    }

    pub fn locale(&self, idx: usize) -> &Locale {
        &self.locales[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Locale> {
        self.locales.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn margin(&self, idx: usize) -> f64 {
        self.locales[idx].margin
    }

    pub fn set_margin(&mut self, idx: usize, margin: f64) {
        self.locales[idx].margin = margin;
    }

    pub fn add_margin(&mut self, idx: usize, delta: f64) {
        self.locales[idx].margin += delta;
    }

    /// Zero every scratch margin before a trial
    pub fn reset_trial_scratch(&mut self) {
        for locale in &mut self.locales {
            locale.margin = 0.0;
        }
    }

    pub fn expected_total(&self) -> u32 {
        self.expected_total
    }

    pub fn total_electoral_votes(&self) -> u32 {
        self.locales.iter().map(|l| l.electoral_votes).sum()
    }

    /// Indices ordered by signed margin
    ///
    /// Equal margins keep canonical order.
    pub fn ranked_by_margin(&self, descending: bool) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.locales.len()).collect();
        order.sort_by(|&a, &b| {
            let ord = self.locales[a].margin.total_cmp(&self.locales[b].margin);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        order
    }

    /// Indices ordered by absolute margin, closest first
    pub fn ranked_by_abs_margin(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.locales.len()).collect();
        order.sort_by(|&a, &b| {
            self.locales[a]
                .margin
                .abs()
                .total_cmp(&self.locales[b].margin.abs())
        });
        order
    }
}
