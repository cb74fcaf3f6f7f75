//! Split-allocation resolver
//!
//! Fills in margins that depend on a sibling locale's trial result. Runs
//! strictly after the sampler.

use crate::core::config::Calibration;
use crate::core::error::Result;
use crate::data::SplitGroup;
use crate::forecast::draws::DrawSource;
use crate::forecast::registry::LocaleRegistry;

#[derive(Debug, Clone, PartialEq)]
enum SplitStep {
    /// Parent margin = mean of the sampled district margins
    Composite { parent: usize, districts: Vec<usize> },
    /// District margins derived from the sampled parent margin
    Paired { parent: usize, first: usize, second: usize },
}

#[derive(Debug, Clone, Default)]
pub struct SplitResolver {
    steps: Vec<SplitStep>,
}

impl SplitResolver {
    /// Resolve group codes against a registry. Composite steps are ordered
    /// before paired steps.
    pub fn new(groups: &[SplitGroup], registry: &LocaleRegistry) -> Result<Self> {
        let mut composite = Vec::new();
        let mut paired = Vec::new();

        for group in groups {
            match group {
                SplitGroup::Composite { parent, districts } => {
                    composite.push(SplitStep::Composite {
                        parent: registry.index_of(parent)?,
                        districts: districts
                            .iter()
                            .map(|code| registry.index_of(code))
                            .collect::<Result<Vec<_>>>()?,
                    });
                }
                SplitGroup::Paired { parent, first, second } => {
                    paired.push(SplitStep::Paired {
                        parent: registry.index_of(parent)?,
                        first: registry.index_of(first)?,
                        second: registry.index_of(second)?,
                    });
                }
            }
        }

        composite.extend(paired);
        Ok(Self { steps: composite })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve every split group for the current trial
    pub fn resolve(
        &self,
        registry: &mut LocaleRegistry,
        calibration: &Calibration,
        draws: &mut impl DrawSource,
    ) {
        for step in &self.steps {
            match step {
                SplitStep::Composite { parent, districts } => {
                    let share = 1.0 / districts.len() as f64;
                    for &district in districts {
                        let margin = registry.margin(district);
                        registry.add_margin(*parent, margin * share);
                    }
                }
                SplitStep::Paired { parent, first, second } => {
                    let gap = draws.normal(calibration.district_gap_mean, calibration.district_gap_std);
                    let (first_margin, second_margin) = split_pair(registry.margin(*parent), gap);
                    registry.set_margin(*first, first_margin);
                    registry.set_margin(*second, second_margin);
                }
            }
        }
    }
}

/// District margins whose average is exactly the parent margin
pub fn split_pair(parent_margin: f64, gap: f64) -> (f64, f64) {
    let first = parent_margin + gap / 2.0;
    let second = 2.0 * parent_margin - first;
    (first, second)
}
