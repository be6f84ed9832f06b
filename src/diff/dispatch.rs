//! Strategy Dispatcher
//!
//! Runs one reduction strategy and packages its output with before/after
//! metrics. A failing provider never surfaces as an error here: the original
//! diff is returned untouched with strategy `none`.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::metrics::{measure, should_compress};
use super::provider::DiffProvider;
use super::smart;
use super::strategy::{self, Strategy, StrategyOutput};
use crate::config::StrategyConfig;
use crate::constants::compression::NO_CHANGES_PLACEHOLDER;
use crate::types::ParseWithDefault;

/// Strategy name reported when the diff was passed through unchanged
pub const NO_STRATEGY: &str = "none";

/// Before/after details of a reduction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionMetadata {
    pub strategy: String,
    /// Bytes in the original diff
    pub original_size: usize,
    /// Bytes in the returned diff
    pub compressed_size: usize,
    pub files_included: usize,
    pub files_excluded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionResult {
    pub compressed_diff: String,
    pub metadata: CompressionMetadata,
}

impl CompressionResult {
    /// The original diff, unchanged
    pub fn passthrough(original_diff: &str) -> Self {
        Self {
            compressed_diff: original_diff.to_string(),
            metadata: CompressionMetadata {
                strategy: NO_STRATEGY.to_string(),
                original_size: original_diff.len(),
                compressed_size: original_diff.len(),
                files_included: 0,
                files_excluded: 0,
                char_count: None,
                token_limit: None,
            },
        }
    }

    /// Whether a strategy actually ran
    pub fn is_compressed(&self) -> bool {
        self.metadata.strategy != NO_STRATEGY
    }

    /// Fall back to `original_diff` when a strategy produced blank output, or
    /// found no changes in a diff that has content
    pub fn or_original(self, original_diff: &str) -> Self {
        if !self.is_compressed() {
            return self;
        }
        if self.compressed_diff.trim().is_empty() {
            warn!(
                "{} strategy produced empty output, using original diff",
                self.metadata.strategy
            );
            return Self::passthrough(original_diff);
        }
        if self.compressed_diff == NO_CHANGES_PLACEHOLDER && !original_diff.trim().is_empty() {
            warn!(
                "{} strategy found no files in a non-empty diff, using original diff",
                self.metadata.strategy
            );
            return Self::passthrough(original_diff);
        }
        self
    }
}

/// Run the strategy named `strategy_name`; unknown names run `compact`.
pub fn apply(
    provider: &dyn DiffProvider,
    strategy_name: &str,
    original_diff: &str,
    config: &StrategyConfig,
) -> CompressionResult {
    apply_strategy(
        provider,
        Strategy::parse_or_default(strategy_name),
        original_diff,
        config,
    )
}

/// Run `strategy` against the provider's change set
pub fn apply_strategy(
    provider: &dyn DiffProvider,
    strategy: Strategy,
    original_diff: &str,
    config: &StrategyConfig,
) -> CompressionResult {
    debug!("Applying {} strategy", strategy);

    let output = match strategy {
        Strategy::Stat => strategy::stat(provider),
        Strategy::Compact => strategy::compact(provider),
        Strategy::Filtered => strategy::filtered(provider),
        Strategy::FunctionContext => strategy::function_context(provider),
        Strategy::Smart => smart::pack(provider, config).map(|outcome| StrategyOutput {
            text: outcome.output,
            files_included: outcome.priority_count,
            files_excluded: outcome.remaining_count,
            char_count: Some(outcome.char_count),
        }),
    };

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            warn!("{} strategy failed, using original diff: {}", strategy, e);
            return CompressionResult::passthrough(original_diff);
        }
    };

    let token_limit = (strategy == Strategy::Smart).then_some(config.token_limit);
    let result = CompressionResult {
        metadata: CompressionMetadata {
            strategy: strategy.as_str().to_string(),
            original_size: original_diff.len(),
            compressed_size: output.text.len(),
            files_included: output.files_included,
            files_excluded: output.files_excluded,
            char_count: output.char_count,
            token_limit,
        },
        compressed_diff: output.text,
    };

    info!(
        "Compressed diff with {} strategy: {} -> {} bytes",
        strategy, result.metadata.original_size, result.metadata.compressed_size
    );
    result
}

/// Reduce `original_diff` with the configured strategy when it is over a
/// threshold; otherwise return it unchanged.
pub fn compress_if_needed(
    provider: &dyn DiffProvider,
    original_diff: &str,
    config: &StrategyConfig,
) -> CompressionResult {
    if !config.enabled {
        debug!("Compression disabled");
        return CompressionResult::passthrough(original_diff);
    }

    let metrics = measure(original_diff, Some(provider));
    if !should_compress(&metrics, config) {
        debug!(
            "Diff under thresholds ({} bytes, {} files)",
            metrics.bytes, metrics.files
        );
        return CompressionResult::passthrough(original_diff);
    }

    info!(
        "Diff over thresholds ({} bytes, {} files), applying {}",
        metrics.bytes, metrics.files, config.strategy
    );
    apply_strategy(provider, config.strategy, original_diff, config).or_original(original_diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::StaticDiff;
    use crate::diff::provider::{NumStat, ProviderResult};
    use crate::types::ProviderError;

    struct BrokenProvider;

    fn broken() -> ProviderError {
        ProviderError::command_failed("git diff --cached", Some(128), "fatal: not a git repository")
    }

    impl DiffProvider for BrokenProvider {
        fn full_diff(&self) -> ProviderResult<String> {
            Err(broken())
        }
        fn name_only_list(&self) -> ProviderResult<Vec<String>> {
            Err(broken())
        }
        fn numeric_stat(&self) -> ProviderResult<Vec<NumStat>> {
            Err(broken())
        }
        fn stat_summary(&self) -> ProviderResult<String> {
            Err(broken())
        }
        fn shortstat(&self) -> ProviderResult<String> {
            Err(broken())
        }
        fn diff_with_options(&self, _: &[&str], _: &[String]) -> ProviderResult<String> {
            Err(broken())
        }
        fn content_at_index(&self, _: &str) -> ProviderResult<String> {
            Err(broken())
        }
    }

    fn file_diff(path: &str, body_lines: usize) -> String {
        let mut diff = format!(
            "diff --git a/{p} b/{p}\n--- a/{p}\n+++ b/{p}\n@@ -0,0 +1,{n} @@\n",
            p = path,
            n = body_lines
        );
        for i in 0..body_lines {
            diff.push_str(&format!("+    value_{} = compute({})  # {}\n", i, i, path));
        }
        diff
    }

    #[test]
    fn test_failing_provider_returns_original() {
        let original = "diff --git a/a.rs b/a.rs\n+ü\n";
        for strategy in Strategy::ALL {
            let result = apply(
                &BrokenProvider,
                strategy.as_str(),
                original,
                &StrategyConfig::default(),
            );
            assert_eq!(result.metadata.strategy, NO_STRATEGY);
            assert_eq!(result.compressed_diff, original);
            assert_eq!(result.metadata.compressed_size, result.metadata.original_size);
        }
    }

    #[test]
    fn test_stat_never_empty_for_real_changes() {
        let source = file_diff("src/app.py", 3);
        let result = apply(
            &StaticDiff::parse(&source),
            "stat",
            &source,
            &StrategyConfig::default(),
        );
        assert!(!result.compressed_diff.trim().is_empty());
        assert_eq!(result.metadata.strategy, "stat");
    }

    #[test]
    fn test_smart_metadata_has_limits() {
        let source = file_diff("src/app.py", 3);
        let result = apply(
            &StaticDiff::parse(&source),
            "smart",
            &source,
            &StrategyConfig::default(),
        );
        assert_eq!(result.metadata.token_limit, Some(100_000));
        assert_eq!(
            result.metadata.char_count,
            Some(result.compressed_diff.chars().count())
        );

        let json = serde_json::to_value(&result.metadata).unwrap();
        assert_eq!(json["token_limit"], 100_000);

        let compact = apply(
            &StaticDiff::parse(&source),
            "compact",
            &source,
            &StrategyConfig::default(),
        );
        let json = serde_json::to_value(&compact.metadata).unwrap();
        assert!(json.get("char_count").is_none());
        assert!(json.get("token_limit").is_none());
    }

    #[test]
    fn test_or_original_replaces_blank_output() {
        let blank = CompressionResult {
            compressed_diff: "  \n".to_string(),
            metadata: CompressionMetadata {
                strategy: "filtered".to_string(),
                original_size: 10,
                compressed_size: 3,
                files_included: 0,
                files_excluded: 0,
                char_count: None,
                token_limit: None,
            },
        };
        let result = blank.or_original("original!!");
        assert_eq!(result.compressed_diff, "original!!");
        assert_eq!(result.metadata.strategy, NO_STRATEGY);

        let kept = CompressionResult::passthrough("x").or_original("y");
        assert_eq!(kept.compressed_diff, "x");
    }

    #[test]
    fn test_or_original_replaces_placeholder_for_real_diff() {
        let unparsed = "Index: notes.txt\n===\nsomething changed\n";
        for strategy in Strategy::ALL {
            let result = apply(
                &StaticDiff::parse(unparsed),
                strategy.as_str(),
                unparsed,
                &StrategyConfig::default(),
            )
            .or_original(unparsed);
            assert_eq!(result.compressed_diff, unparsed, "{}", strategy);
            assert!(!result.is_compressed());
        }

        let empty = apply(&StaticDiff::parse(""), "stat", "", &StrategyConfig::default())
            .or_original("");
        assert_eq!(empty.compressed_diff, NO_CHANGES_PLACEHOLDER);
    }

    #[test]
    fn test_plain_unified_diff_is_compressed() {
        let original = "--- a/app.py\n+++ b/app.py\n@@ -1 +1 @@\n-old\n+new\n";
        let config = StrategyConfig {
            size_threshold_bytes: 10,
            strategy: Strategy::Stat,
            ..Default::default()
        };
        let result = compress_if_needed(&StaticDiff::parse(original), original, &config);
        assert_eq!(result.metadata.strategy, "stat");
        assert!(result.compressed_diff.contains("app.py"));
        assert_ne!(result.compressed_diff, NO_CHANGES_PLACEHOLDER);
    }

    #[test]
    fn test_compress_if_needed_respects_thresholds() {
        let source = file_diff("src/app.py", 3);
        let provider = StaticDiff::parse(&source);

        let result = compress_if_needed(&provider, &source, &StrategyConfig::default());
        assert!(!result.is_compressed());
        assert_eq!(result.compressed_diff, source);

        let config = StrategyConfig {
            size_threshold_bytes: 10,
            strategy: Strategy::Stat,
            ..Default::default()
        };
        let result = compress_if_needed(&provider, &source, &config);
        assert_eq!(result.metadata.strategy, "stat");

        let disabled = StrategyConfig {
            enabled: false,
            ..config
        };
        let result = compress_if_needed(&provider, &source, &disabled);
        assert!(!result.is_compressed());
    }

    #[test]
    fn test_scenario_many_excluded_files_smart() {
        let mut source = String::new();
        for i in 0..3 {
            source.push_str(&file_diff(&format!("service/module_{}.py", i), 200));
        }
        for i in 0..100 {
            source.push_str(&file_diff(&format!("packages/p{}/package-lock.json", i), 5));
        }
        for i in 0..47 {
            source.push_str(&file_diff(&format!("static/bundle_{}.min.js", i), 5));
        }

        let provider = StaticDiff::parse(&source);
        let config = StrategyConfig {
            max_priority_files: 15,
            token_limit: 100_000,
            ..Default::default()
        };

        assert!(should_compress(&measure(&source, Some(&provider)), &config));

        let result = apply(&provider, "smart", &source, &config);
        assert_eq!(result.metadata.strategy, "smart");
        assert!(result.metadata.files_included <= 3);
        assert_eq!(result.metadata.files_included, 3);
        assert_eq!(result.metadata.files_excluded, 147);

        let (_, stat_section) = result
            .compressed_diff
            .split_once("# Remaining files (statistics only)\n")
            .unwrap();
        assert_eq!(stat_section.lines().count(), 147);
        assert!(result.metadata.compressed_size < result.metadata.original_size);
    }

    #[test]
    fn test_scenario_single_large_file_stat() {
        let source = file_diff("src/big.py", 1_500);
        assert!(source.len() > 60_000);

        let provider = StaticDiff::parse(&source);
        let config = StrategyConfig::default();
        let metrics = measure(&source, Some(&provider));
        assert_eq!(metrics.files, 1);
        assert!(should_compress(&metrics, &config));

        let result = apply(&provider, "stat", &source, &config);
        assert!(result.metadata.compressed_size < result.metadata.original_size);
    }

    #[test]
    fn test_scenario_unknown_strategy_runs_compact() {
        let source = file_diff("src/app.py", 3);
        let result = apply(
            &StaticDiff::parse(&source),
            "bogus",
            &source,
            &StrategyConfig::default(),
        );
        assert_eq!(result.metadata.strategy, "compact");
        assert!(result.compressed_diff.starts_with("# Compact diff:"));
    }
}
