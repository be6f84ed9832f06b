//! Reduction Strategies
//!
//! Strategy selection plus the four single-pass transformations. The smart
//! hybrid strategy lives in [`super::smart`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::patterns;
use super::provider::{DiffProvider, ProviderResult};
use crate::constants::compression::{COMPACT_CONTEXT_LINES, NO_CHANGES_PLACEHOLDER};
use crate::types::ParseWithDefault;

/// How an oversized diff is reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Per-file statistics only
    Stat,
    /// One line of context plus a numstat header
    Compact,
    /// Drop binary and pattern-excluded files
    Filtered,
    /// Whole enclosing functions around each change
    FunctionContext,
    /// Highest-priority files in full, the rest summarized
    Smart,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Stat,
        Strategy::Compact,
        Strategy::Filtered,
        Strategy::FunctionContext,
        Strategy::Smart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stat => "stat",
            Self::Compact => "compact",
            Self::Filtered => "filtered",
            Self::FunctionContext => "function-context",
            Self::Smart => "smart",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == name)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(Strategy::as_str).collect();
                format!("unknown strategy '{}' (valid: {})", s, valid.join(", "))
            })
    }
}

impl ParseWithDefault for Strategy {
    fn type_name() -> &'static str {
        "compression strategy"
    }

    fn default_value() -> Self {
        Self::Compact
    }

    fn try_parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

/// Output of one strategy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
    pub text: String,
    pub files_included: usize,
    pub files_excluded: usize,
    /// Output length in characters; reported by the smart strategy only
    pub char_count: Option<usize>,
}

impl StrategyOutput {
    pub fn text(text: String) -> Self {
        Self {
            text,
            files_included: 0,
            files_excluded: 0,
            char_count: None,
        }
    }

    fn no_changes() -> Self {
        Self::text(NO_CHANGES_PLACEHOLDER.to_string())
    }
}

// =============================================================================
// Strategies
// =============================================================================

/// Replace the diff with per-file statistics
pub fn stat(provider: &dyn DiffProvider) -> ProviderResult<StrategyOutput> {
    let summary = provider.stat_summary()?;
    if summary.trim().is_empty() {
        return Ok(StrategyOutput::no_changes());
    }
    Ok(StrategyOutput::text(summary))
}

/// Regenerate the diff with one line of context behind a numstat header
pub fn compact(provider: &dyn DiffProvider) -> ProviderResult<StrategyOutput> {
    let stats = provider.numeric_stat()?;
    if stats.is_empty() {
        return Ok(StrategyOutput::no_changes());
    }

    let unified = format!("--unified={}", COMPACT_CONTEXT_LINES);
    let diff = provider.diff_with_options(&[unified.as_str()], &[])?;

    let mut text = format!(
        "# Compact diff: {} files changed ({} line of context)\n",
        stats.len(),
        COMPACT_CONTEXT_LINES
    );
    for stat in &stats {
        text.push_str(&stat.summary_line());
        text.push('\n');
    }
    text.push('\n');
    text.push_str(&diff);

    Ok(StrategyOutput::text(text))
}

/// Drop binary files and files matching the exclusion patterns
pub fn filtered(provider: &dyn DiffProvider) -> ProviderResult<StrategyOutput> {
    let files = provider.name_only_list()?;
    if files.is_empty() {
        return Ok(StrategyOutput::no_changes());
    }

    let binaries: HashSet<String> = provider
        .numeric_stat()?
        .into_iter()
        .filter(|stat| stat.is_binary())
        .map(|stat| stat.path)
        .collect();

    let (included, excluded): (Vec<String>, Vec<String>) = files
        .into_iter()
        .partition(|path| !binaries.contains(path) && !patterns::is_excluded(path));

    debug!(
        "Filtered strategy: {} included, {} excluded",
        included.len(),
        excluded.len()
    );

    if included.is_empty() {
        let summary = provider.stat_summary()?;
        let text = format!(
            "# All {} changed files are binary or excluded by pattern; showing statistics only\n\n{}",
            excluded.len(),
            summary
        );
        return Ok(StrategyOutput {
            text,
            files_included: 0,
            files_excluded: excluded.len(),
            char_count: None,
        });
    }

    let diff = provider.diff_with_options(&[], &included)?;
    let mut text = String::new();
    if !excluded.is_empty() {
        text.push_str(&format!(
            "# Filtered diff: {} files omitted (binary, lock, minified or generated)\n",
            excluded.len()
        ));
        for path in &excluded {
            text.push_str(&format!("#   {}\n", path));
        }
        text.push('\n');
    }
    text.push_str(&diff);

    Ok(StrategyOutput {
        text,
        files_included: included.len(),
        files_excluded: excluded.len(),
        char_count: None,
    })
}

/// Regenerate the diff with whole enclosing functions as context
pub fn function_context(provider: &dyn DiffProvider) -> ProviderResult<StrategyOutput> {
    let diff = provider.diff_with_options(&["--function-context"], &[])?;
    if diff.trim().is_empty() {
        return Ok(StrategyOutput::no_changes());
    }
    Ok(StrategyOutput::text(diff))
}
