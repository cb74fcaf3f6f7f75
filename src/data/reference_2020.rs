//! Built-in 2020 reference data
//!
//! State poll margins are relative to the national average and were taken
//! in early fall 2020. Prior margins are the 2016 results.

use std::collections::HashMap;

use super::{ActualResults, LocaleTables, PolledRow, SplitGroup, UnpolledRow};
use crate::core::types::TOTAL_ELECTORAL_VOTES;

/// (code, quality, poll margin, prior margin, electoral votes)
const POLLED: [(&str, &str, f64, f64, u32); 17] = [
    ("NV", "Low", 2.3, 2.42, 6),
    ("AZ", "High", -4.8, -3.55, 11),
    ("TX", "High", -10.2, -8.99, 38),
    ("IA", "High", -8.6, -9.41, 6),
    ("MN", "High", -1.2, 1.52, 10),
    ("WI", "High", -1.7, -0.77, 10),
    ("MI", "High", -0.5, -0.23, 16),
    ("OH", "High", -6.3, -8.13, 18),
    ("GA", "High", -9.6, -5.13, 16),
    ("FL", "High", -3.1, -1.2, 29),
    ("NC", "High", -7.0, -3.66, 15),
    ("VA", "High", 4.9, 5.32, 13),
    ("PA", "High", -0.4, -0.72, 20),
    ("NH", "High", 1.8, 0.37, 4),
    ("NM", "Low", 4.1, 8.21, 5),
    ("SC", "Low", -13.1, -14.27, 9),
    ("ME", "High", 3.2, 2.96, 2),
];

/// (code, prior margin, electoral votes)
///
/// NE carries only its 2 at-large votes and has no prior of its own; its
/// margin is always composed from NE1-NE3.
const UNPOLLED: [(&str, f64, u32); 39] = [
    ("NE2", -2.24, 1),
    ("ME2", -10.29, 1),
    ("CO", 4.91, 9),
    ("OR", 10.98, 7),
    ("DE", 11.37, 3),
    ("AK", -14.73, 3),
    ("MS", -17.83, 6),
    ("UT", -18.08, 6),
    ("MO", -18.64, 10),
    ("IN", -19.17, 11),
    ("CT", 13.64, 7),
    ("NJ", 14.1, 14),
    ("ME1", 14.81, 1),
    ("RI", 15.51, 4),
    ("WA", 15.71, 12),
    ("IL", 17.06, 20),
    ("NY", 22.49, 29),
    ("VT", 26.41, 3),
    ("MD", 26.42, 10),
    ("MA", 27.2, 11),
    ("CA", 30.11, 55),
    ("HI", 32.18, 4),
    ("LA", -19.64, 8),
    ("MT", -20.42, 3),
    ("KS", -20.6, 6),
    ("NE1", -20.72, 1),
    ("TN", -26.01, 11),
    ("AR", -26.92, 6),
    ("AL", -27.73, 9),
    ("SD", -29.79, 3),
    ("KY", -29.84, 8),
    ("ID", -31.77, 4),
    ("ND", -35.73, 3),
    ("OK", -37.08, 7),
    ("WV", -42.07, 5),
    ("WY", -46.3, 3),
    ("NE3", -54.19, 1),
    ("DC", 86.78, 3),
    ("NE", 0.0, 2),
];

/// Certified 2020 margins
const ACTUAL_MARGINS: [(&str, f64); 56] = [
    ("AK", -10.0),
    ("AL", -25.5),
    ("AR", -27.6),
    ("AZ", 0.3),
    ("CA", 29.2),
    ("CO", 13.5),
    ("CT", 20.1),
    ("DC", 86.8),
    ("DE", 19.0),
    ("FL", -3.4),
    ("GA", 0.2),
    ("HI", 29.5),
    ("IA", -8.2),
    ("ID", -30.8),
    ("IL", 17.0),
    ("IN", -16.1),
    ("KS", -14.7),
    ("KY", -25.9),
    ("LA", -18.6),
    ("MA", 33.5),
    ("MD", 33.2),
    ("ME", 9.1),
    ("ME1", 23.1),
    ("ME2", -7.4),
    ("MI", 2.8),
    ("MN", 7.1),
    ("MO", -15.4),
    ("MS", -16.6),
    ("MT", -16.4),
    ("NC", 1.4),
    ("ND", -33.4),
    ("NE", -19.1),
    ("NE1", -14.9),
    ("NE2", 6.5),
    ("NE3", -53.0),
    ("NH", 7.4),
    ("NJ", 15.9),
    ("NM", 10.8),
    ("NV", 2.4),
    ("NY", 23.1),
    ("OH", -8.0),
    ("OK", -33.1),
    ("OR", 16.1),
    ("PA", 1.2),
    ("RI", 20.1),
    ("SC", -11.7),
    ("SD", -26.2),
    ("TN", -23.2),
    ("TX", -5.6),
    ("UT", -20.5),
    ("VA", 10.1),
    ("VT", 35.4),
    ("WA", 19.2),
    ("WI", 0.6),
    ("WV", -38.9),
    ("WY", -43.4),
];

const ACTUAL_DEM_ELECTORAL_VOTES: u32 = 306;
const ACTUAL_GOP_ELECTORAL_VOTES: u32 = 232;

pub(super) fn locale_tables() -> LocaleTables {
    let polled = POLLED
        .iter()
        .map(|&(code, quality, poll_margin, prior_margin, electoral_votes)| PolledRow {
            code: code.to_string(),
            quality: quality.to_string(),
            poll_margin,
            prior_margin,
            electoral_votes,
        })
        .collect();

    let unpolled = UNPOLLED
        .iter()
        .map(|&(code, prior_margin, electoral_votes)| UnpolledRow {
            code: code.to_string(),
            prior_margin,
            electoral_votes,
        })
        .collect();

    let splits = vec![
        SplitGroup::Paired {
            parent: "ME".into(),
            first: "ME1".into(),
            second: "ME2".into(),
        },
        SplitGroup::Composite {
            parent: "NE".into(),
            districts: vec!["NE1".into(), "NE2".into(), "NE3".into()],
        },
    ];

    LocaleTables {
        expected_total: TOTAL_ELECTORAL_VOTES,
        polled,
        unpolled,
        splits,
    }
}

pub(super) fn actual_results() -> ActualResults {
    let margins: HashMap<String, f64> = ACTUAL_MARGINS
        .iter()
        .map(|&(code, margin)| (code.to_string(), margin))
        .collect();

    ActualResults {
        margins,
        dem_electoral_votes: ACTUAL_DEM_ELECTORAL_VOTES,
        gop_electoral_votes: ACTUAL_GOP_ELECTORAL_VOTES,
    }
}
