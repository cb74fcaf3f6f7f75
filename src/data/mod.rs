//! Static input tables
//!
//! Locale tables, split-allocation groups and actual results are plain
//! data. They can be loaded from TOML or taken from the built-in 2020
//! reference set.

mod reference_2020;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::error::{ForecastError, Result};
use crate::core::types::TOTAL_ELECTORAL_VOTES;

/// A locale with current polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolledRow {
    pub code: String,
    /// "High", "Low" or "None"; anything else is rejected when the
    /// registry is built
    pub quality: String,
    /// Current poll margin minus the national polling average
    pub poll_margin: f64,
    pub prior_margin: f64,
    pub electoral_votes: u32,
}

/// A locale with no usable polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnpolledRow {
    pub code: String,
    pub prior_margin: f64,
    pub electoral_votes: u32,
}

/// A state whose electoral votes are divided among districts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitGroup {
    /// The statewide margin is sampled; the two district margins are
    /// derived from it with a random gap (Maine)
    Paired {
        parent: String,
        first: String,
        second: String,
    },
    /// The districts are sampled; the statewide margin is their average
    /// (Nebraska)
    Composite {
        parent: String,
        districts: Vec<String>,
    },
}

impl SplitGroup {
    pub fn parent(&self) -> &str {
        match self {
            SplitGroup::Paired { parent, .. } | SplitGroup::Composite { parent, .. } => parent,
        }
    }

    pub fn districts(&self) -> Vec<&str> {
        match self {
            SplitGroup::Paired { first, second, .. } => vec![first.as_str(), second.as_str()],
            SplitGroup::Composite { districts, .. } => {
                districts.iter().map(String::as_str).collect()
            }
        }
    }
}

fn default_total() -> u32 {
    TOTAL_ELECTORAL_VOTES
}

/// Everything the registry is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleTables {
    #[serde(default = "default_total")]
    pub expected_total: u32,
    #[serde(default)]
    pub polled: Vec<PolledRow>,
    #[serde(default)]
    pub unpolled: Vec<UnpolledRow>,
    #[serde(default)]
    pub splits: Vec<SplitGroup>,
}

impl LocaleTables {
    /// The 2020 input set: 17 polled locales, 39 unpolled, Maine and
    /// Nebraska split
    pub fn reference_2020() -> Self {
        reference_2020::locale_tables()
    }

    /// Load tables from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse tables from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn locale_count(&self) -> usize {
        self.polled.len() + self.unpolled.len()
    }
}

/// What actually happened, for comparison against a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualResults {
    /// Actual margin per locale code
    pub margins: HashMap<String, f64>,
    pub dem_electoral_votes: u32,
    pub gop_electoral_votes: u32,
}

impl ActualResults {
    /// Certified 2020 results for every reference locale
    pub fn reference_2020() -> Self {
        reference_2020::actual_results()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn margin(&self, code: &str) -> Result<f64> {
        self.margins
            .get(code)
            .copied()
            .ok_or_else(|| ForecastError::LocaleNotFound(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_tables_shape() {
        let tables = LocaleTables::reference_2020();
        assert_eq!(tables.polled.len(), 17);
        assert_eq!(tables.unpolled.len(), 39);
        assert_eq!(tables.locale_count(), 56);
        assert_eq!(tables.splits.len(), 2);

        let total: u32 = tables.polled.iter().map(|r| r.electoral_votes).sum::<u32>()
            + tables.unpolled.iter().map(|r| r.electoral_votes).sum::<u32>();
        assert_eq!(total, TOTAL_ELECTORAL_VOTES);
    }

    #[test]
    fn test_reference_actuals_cover_every_locale() {
        let tables = LocaleTables::reference_2020();
        let actual = ActualResults::reference_2020();
        assert_eq!(actual.margins.len(), 56);
        for row in &tables.polled {
            assert!(actual.margin(&row.code).is_ok(), "missing {}", row.code);
        }
        for row in &tables.unpolled {
            assert!(actual.margin(&row.code).is_ok(), "missing {}", row.code);
        }
        assert_eq!(actual.dem_electoral_votes + actual.gop_electoral_votes, 538);
    }

    #[test]
    fn test_split_group_accessors() {
        let group = SplitGroup::Composite {
            parent: "NE".into(),
            districts: vec!["NE1".into(), "NE2".into(), "NE3".into()],
        };
        assert_eq!(group.parent(), "NE");
        assert_eq!(group.districts(), vec!["NE1", "NE2", "NE3"]);
    }

    #[test]
    fn test_parse_tables_toml() {
        let tables = LocaleTables::parse_toml(
            r#"
            expected_total = 3

            [[polled]]
            code = "AA"
            quality = "High"
            poll_margin = 1.5
            prior_margin = -2.0
            electoral_votes = 2

            [[unpolled]]
            code = "BB"
            prior_margin = 10.0
            electoral_votes = 1

            [[splits]]
            kind = "composite"
            parent = "AA"
            districts = ["BB"]
            "#,
        )
        .unwrap();

        assert_eq!(tables.expected_total, 3);
        assert_eq!(tables.polled[0].quality, "High");
        assert_eq!(tables.unpolled[0].code, "BB");
        assert!(matches!(tables.splits[0], SplitGroup::Composite { .. }));
    }

    #[test]
    fn test_tables_default_total() {
        let tables = LocaleTables::parse_toml("").unwrap();
        assert_eq!(tables.expected_total, TOTAL_ELECTORAL_VOTES);
        assert!(tables.polled.is_empty());
    }
}
