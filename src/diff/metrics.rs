//! Diff size metrics, change statistics and the threshold policy.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::provider::DiffProvider;
use crate::config::StrategyConfig;

static DIFF_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^diff --git ").expect("valid regex"));
static FILES_CHANGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) files? changed").expect("valid regex"));
static INSERTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) insertions?\(\+\)").expect("valid regex"));
static DELETIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+) deletions?\(-\)").expect("valid regex"));

/// Size snapshot of a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSizeMetrics {
    /// UTF-8 length
    pub bytes: usize,
    /// Unicode scalar values
    pub chars: usize,
    /// Newline characters
    pub lines: usize,
    /// Changed files
    pub files: usize,
}

/// Measure `diff`.
///
/// The file count comes from the provider's name-only listing; without a
/// provider, or when the listing fails, `diff --git` headers are counted.
pub fn measure(diff: &str, provider: Option<&dyn DiffProvider>) -> DiffSizeMetrics {
    let files = match provider.map(|p| p.name_only_list()) {
        Some(Ok(names)) => names.len(),
        Some(Err(e)) => {
            debug!("Name-only listing failed, counting diff headers: {}", e);
            count_file_headers(diff)
        }
        None => count_file_headers(diff),
    };

    DiffSizeMetrics {
        bytes: diff.len(),
        chars: diff.chars().count(),
        lines: diff.bytes().filter(|b| *b == b'\n').count(),
        files,
    }
}

fn count_file_headers(diff: &str) -> usize {
    DIFF_HEADER.find_iter(diff).count()
}

/// Whether either threshold is exceeded
pub fn should_compress(metrics: &DiffSizeMetrics, config: &StrategyConfig) -> bool {
    metrics.bytes as u64 > config.size_threshold_bytes
        || metrics.files as u64 > config.files_threshold
}

/// Totals from a `--shortstat` summary line, for display only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeStatistics {
    pub insertions: u64,
    pub deletions: u64,
    pub files_changed: u64,
}

impl ChangeStatistics {
    /// Parse `"N files changed, N insertions(+), N deletions(-)"`.
    ///
    /// Each clause is optional and independently defaults to 0.
    pub fn parse(summary: &str) -> Self {
        Self {
            insertions: capture_count(&INSERTIONS, summary),
            deletions: capture_count(&DELETIONS, summary),
            files_changed: capture_count(&FILES_CHANGED, summary),
        }
    }
}

fn capture_count(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::StaticDiff;
    use crate::diff::provider::{NumStat, ProviderResult};
    use crate::types::ProviderError;

    struct FailingProvider;

    impl DiffProvider for FailingProvider {
        fn full_diff(&self) -> ProviderResult<String> {
            Err(ProviderError::Unsupported {
                operation: "full_diff".into(),
            })
        }
        fn name_only_list(&self) -> ProviderResult<Vec<String>> {
            Err(ProviderError::command_failed("git diff --name-only", Some(1), "boom"))
        }
        fn numeric_stat(&self) -> ProviderResult<Vec<NumStat>> {
            Ok(Vec::new())
        }
        fn stat_summary(&self) -> ProviderResult<String> {
            Ok(String::new())
        }
        fn shortstat(&self) -> ProviderResult<String> {
            Ok(String::new())
        }
        fn diff_with_options(&self, _: &[&str], _: &[String]) -> ProviderResult<String> {
            Ok(String::new())
        }
        fn content_at_index(&self, path: &str) -> ProviderResult<String> {
            Err(ProviderError::NotFound { path: path.into() })
        }
    }

    const TWO_FILES: &str = "diff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n@@ -1 +1 @@\n-x\n+y\ndiff --git a/b.rs b/b.rs\n--- a/b.rs\n+++ b/b.rs\n@@ -1 +1 @@\n-é\n+ü\n";

    #[test]
    fn test_measure_counts() {
        let metrics = measure(TWO_FILES, None);
        assert_eq!(metrics.files, 2);
        assert_eq!(metrics.lines, 12);
        assert_eq!(metrics.bytes, TWO_FILES.len());
        // é and ü are two bytes each
        assert_eq!(metrics.chars, TWO_FILES.len() - 2);
    }

    #[test]
    fn test_measure_prefers_listing() {
        let provider = StaticDiff::parse(TWO_FILES);
        let metrics = measure("diff --git a/x b/x\n", Some(&provider));
        assert_eq!(metrics.files, 2);
    }

    #[test]
    fn test_measure_falls_back_on_listing_failure() {
        let metrics = measure(TWO_FILES, Some(&FailingProvider));
        assert_eq!(metrics.files, 2);
    }

    #[test]
    fn test_header_must_start_line() {
        let diff = "+ diff --git a/x b/x\ndiff --git a/y b/y\n";
        assert_eq!(measure(diff, None).files, 1);
    }

    #[test]
    fn test_should_compress_or_semantics() {
        let config = StrategyConfig {
            size_threshold_bytes: u64::MAX,
            files_threshold: 100,
            ..Default::default()
        };
        let by_files = DiffSizeMetrics {
            files: 101,
            ..Default::default()
        };
        assert!(should_compress(&by_files, &config));

        let config = StrategyConfig {
            size_threshold_bytes: 50_000,
            files_threshold: u64::MAX,
            ..Default::default()
        };
        let by_bytes = DiffSizeMetrics {
            bytes: 50_001,
            files: 1,
            ..Default::default()
        };
        assert!(should_compress(&by_bytes, &config));

        let at_limit = DiffSizeMetrics {
            bytes: 50_000,
            files: 1,
            ..Default::default()
        };
        assert!(!should_compress(&at_limit, &config));
    }

    #[test]
    fn test_change_statistics_full() {
        let stats =
            ChangeStatistics::parse(" 3 files changed, 45 insertions(+), 12 deletions(-)");
        assert_eq!(
            stats,
            ChangeStatistics {
                insertions: 45,
                deletions: 12,
                files_changed: 3
            }
        );
    }

    #[test]
    fn test_change_statistics_partial_and_singular() {
        let stats = ChangeStatistics::parse(" 1 file changed, 1 deletion(-)");
        assert_eq!(stats.files_changed, 1);
        assert_eq!(stats.insertions, 0);
        assert_eq!(stats.deletions, 1);

        assert_eq!(ChangeStatistics::parse("nonsense"), ChangeStatistics::default());
    }
}
