//! File Priority Scorer
//!
//! Rates each changed file 0-100 so the smart packer can spend its character
//! budget on the files a reviewer most needs to read.
//!
//! ## Scoring
//!
//! 1. Exclusion pattern → 0, nothing overrides it
//! 2. Tier base score: exact names first, wildcards second, default 25
//! 3. Location discount: tests ×0.8, docs ×0.7, scripts/tools ×0.9
//! 4. Generated (by name or content marker) ×0.5

use serde::Serialize;

use super::patterns::{self, GlobSet, HIGH_TIER, LOW_TIER, MEDIUM_TIER};
use crate::constants::scoring::*;

/// Location rules, checked in order; the first rule with a matching marker wins
const LOCATION_RULES: &[(&[&str], u32)] = &[
    (&["tests/", "test/", "__tests__/", "_test."], TEST_PATH_PERCENT),
    (&["docs/", "documentation/"], DOCS_PATH_PERCENT),
    (&["scripts/", "tools/"], SCRIPTS_PATH_PERCENT),
];

/// How a score was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub path: String,
    pub excluded: bool,
    pub base: u8,
    pub location_percent: Option<u32>,
    pub generated: bool,
    pub score: u8,
}

/// Score a changed file.
///
/// `content_sample` is the start of the file's new content when available;
/// only it can reveal generated files whose names look ordinary.
pub fn score_file(path: &str, content_sample: Option<&str>) -> u8 {
    explain(path, content_sample).score
}

/// Score a file when prioritization is disabled: exclusions still apply,
/// everything else gets the default score.
pub fn exclusion_only_score(path: &str) -> u8 {
    if patterns::is_excluded(path) {
        EXCLUDED
    } else {
        DEFAULT_PRIORITY
    }
}

/// Score a changed file and keep the intermediate values
pub fn explain(path: &str, content_sample: Option<&str>) -> ScoreBreakdown {
    if patterns::is_excluded(path) {
        return ScoreBreakdown {
            path: path.to_string(),
            excluded: true,
            base: EXCLUDED,
            location_percent: None,
            generated: false,
            score: EXCLUDED,
        };
    }

    let generated = patterns::is_generated_name(path)
        || content_sample.is_some_and(patterns::has_generated_marker);

    let base = base_score(path);
    let location_percent = location_percent(path);

    let mut score = base;
    if let Some(percent) = location_percent {
        score = discount(score, percent);
    }
    if generated {
        score = discount(score, GENERATED_PERCENT);
    }

    ScoreBreakdown {
        path: path.to_string(),
        excluded: false,
        base,
        location_percent,
        generated,
        score,
    }
}

/// Tier score; an exact name in any tier beats a wildcard in every tier
fn base_score(path: &str) -> u8 {
    let tiers: [(&GlobSet, u8); 3] = [
        (&*HIGH_TIER, HIGH_PRIORITY),
        (&*MEDIUM_TIER, MEDIUM_PRIORITY),
        (&*LOW_TIER, LOW_PRIORITY),
    ];

    tiers
        .iter()
        .find(|(set, _)| set.matches_exact(path))
        .or_else(|| tiers.iter().find(|(set, _)| set.matches_wildcard(path)))
        .map_or(DEFAULT_PRIORITY, |(_, score)| *score)
}

fn location_percent(path: &str) -> Option<u32> {
    LOCATION_RULES
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| path.contains(m)))
        .map(|(_, percent)| *percent)
}

/// Integer discount, truncating
fn discount(score: u8, percent: u32) -> u8 {
    (u32::from(score) * percent / 100) as u8
}
