//! Smart Hybrid Packer
//!
//! Shows the highest-priority files as full diffs and summarizes everything
//! else as statistics, shrinking the full-diff set until the output fits the
//! character budget.
//!
//! ## Loop
//!
//! Each pass renders header + priority diffs + remaining statistics. A file
//! whose diff would push header and body past the budget is demoted together
//! with every file after it in that pass; demotions accumulate and shrink the
//! next pass. A pass without demotions either fits (done) or shrinks the
//! attempted count to 80%. After [`MAX_ITERATIONS`] passes the output degrades to
//! statistics for every file.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::provider::{DiffProvider, NumStat, ProviderResult};
use super::scorer;
use crate::config::StrategyConfig;
use crate::constants::compression::NO_CHANGES_PLACEHOLDER;
use crate::constants::smart::{CONTENT_SAMPLE_CHARS, MAX_ITERATIONS, SHRINK_PERCENT};
use crate::types::truncate_chars;

/// Result of a packing run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOutcome {
    pub output: String,
    /// Files shown as full diffs
    pub priority_count: usize,
    /// Files shown as statistics only
    pub remaining_count: usize,
    /// Characters in `output`
    pub char_count: usize,
}

impl PackOutcome {
    fn new(output: String, priority_count: usize, remaining_count: usize) -> Self {
        let char_count = output.chars().count();
        Self {
            output,
            priority_count,
            remaining_count,
            char_count,
        }
    }
}

#[derive(Debug, Clone)]
struct RankedFile<'a> {
    path: &'a str,
    score: u8,
}

/// Pack the provider's change set under `config.token_limit` characters.
///
/// Provider errors are returned as-is; the dispatcher turns them into a
/// fallback to the original diff.
pub fn pack(provider: &dyn DiffProvider, config: &StrategyConfig) -> ProviderResult<PackOutcome> {
    let files = provider.name_only_list()?;
    if files.is_empty() {
        return Ok(PackOutcome::new(NO_CHANGES_PLACEHOLDER.to_string(), 0, 0));
    }

    let stats = provider.numeric_stat()?;
    let stat_by_path: HashMap<&str, &NumStat> =
        stats.iter().map(|s| (s.path.as_str(), s)).collect();

    let candidates = rank(provider, &files, config);
    debug!(
        "Smart packer: {} files, {} candidates for full diff",
        files.len(),
        candidates.len()
    );

    let mut demoted: HashSet<&str> = HashSet::new();
    let mut attempt = config.max_priority_files.min(candidates.len());

    for iteration in 1..=MAX_ITERATIONS {
        let eligible: Vec<&RankedFile> = candidates
            .iter()
            .filter(|file| !demoted.contains(file.path))
            .take(attempt)
            .collect();

        // The pass header counts toward the limit
        let mut body = String::new();
        let mut body_chars = header(eligible.len(), files.len() - eligible.len())
            .chars()
            .count();
        let mut kept: Vec<&str> = Vec::new();
        let mut demoted_this_pass = 0usize;

        for file in eligible {
            if demoted_this_pass > 0 {
                demoted.insert(file.path);
                demoted_this_pass += 1;
                continue;
            }

            let mut diff = provider.diff_with_options(&[], &[file.path.to_string()])?;
            if !diff.is_empty() && !diff.ends_with('\n') {
                diff.push('\n');
            }
            let diff_chars = diff.chars().count();

            if body_chars + diff_chars > config.token_limit {
                debug!(
                    "Pass {}: {} ({} chars) crosses the limit, demoting it and later files",
                    iteration, file.path, diff_chars
                );
                demoted.insert(file.path);
                demoted_this_pass += 1;
                continue;
            }

            body.push_str(&diff);
            body_chars += diff_chars;
            kept.push(file.path);
        }

        let kept_set: HashSet<&str> = kept.iter().copied().collect();
        let remaining: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|path| !kept_set.contains(path))
            .collect();

        let output = render(&kept, &remaining, &body, &stat_by_path);
        let outcome = PackOutcome::new(output, kept.len(), remaining.len());

        if demoted_this_pass > 0 {
            attempt = attempt.saturating_sub(demoted_this_pass);
            debug!(
                "Pass {}: demoted {} files, next attempt {}",
                iteration, demoted_this_pass, attempt
            );
            continue;
        }

        if outcome.char_count <= config.token_limit {
            info!(
                "Smart packer converged on pass {}: {} full, {} summarized, {} chars",
                iteration, outcome.priority_count, outcome.remaining_count, outcome.char_count
            );
            return Ok(outcome);
        }

        attempt = (attempt * SHRINK_PERCENT / 100).max(1);
        debug!(
            "Pass {}: {} chars over limit {}, next attempt {}",
            iteration, outcome.char_count, config.token_limit, attempt
        );
    }

    info!(
        "Smart packer did not converge in {} passes, using statistics only",
        MAX_ITERATIONS
    );
    let output = format!(
        "# Smart diff: character limit of {} exceeded; statistics only for all {} files\n\n{}",
        config.token_limit,
        files.len(),
        provider.stat_summary()?
    );
    Ok(PackOutcome::new(output, 0, files.len()))
}

/// Score files and order the non-excluded ones by descending score.
///
/// Ties keep enumeration order.
fn rank<'a>(
    provider: &dyn DiffProvider,
    files: &'a [String],
    config: &StrategyConfig,
) -> Vec<RankedFile<'a>> {
    let mut ranked: Vec<RankedFile<'a>> = files
        .iter()
        .map(|path| {
            let score = if config.smart_priority_enabled {
                score_with_sample(provider, path)
            } else {
                scorer::exclusion_only_score(path)
            };
            RankedFile {
                path: path.as_str(),
                score,
            }
        })
        .filter(|file| file.score > 0)
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

fn score_with_sample(provider: &dyn DiffProvider, path: &str) -> u8 {
    if super::patterns::is_excluded(path) {
        return 0;
    }
    let sample = match provider.content_at_index(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!("No content sample for {}: {}", path, e);
            None
        }
    };
    let sample = sample
        .as_deref()
        .map(|content| truncate_chars(content, CONTENT_SAMPLE_CHARS));
    scorer::score_file(path, sample)
}

fn header(priority: usize, remaining: usize) -> String {
    format!(
        "# Smart diff: {} files with full diff, {} files summarized\n\n",
        priority, remaining
    )
}

fn render(
    kept: &[&str],
    remaining: &[&str],
    body: &str,
    stat_by_path: &HashMap<&str, &NumStat>,
) -> String {
    let mut output = header(kept.len(), remaining.len());
    output.push_str(body);

    if !remaining.is_empty() {
        if !body.is_empty() {
            output.push('\n');
        }
        output.push_str("# Remaining files (statistics only)\n");
        for path in remaining {
            match stat_by_path.get(path) {
                Some(stat) => output.push_str(&stat.summary_line()),
                None => output.push_str(&format!("  {}", path)),
            }
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::StaticDiff;
    use crate::types::ProviderError;
    use proptest::prelude::*;
    use std::cell::Cell;

    fn file_diff(path: &str, body_lines: usize) -> String {
        let mut diff = format!(
            "diff --git a/{p} b/{p}\n--- a/{p}\n+++ b/{p}\n@@ -0,0 +1,{n} @@\n",
            p = path,
            n = body_lines
        );
        for i in 0..body_lines {
            diff.push_str(&format!("+line {} of {}\n", i, path));
        }
        diff
    }

    fn config(max_priority_files: usize, token_limit: usize) -> StrategyConfig {
        StrategyConfig {
            max_priority_files,
            token_limit,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_change_set() {
        let outcome = pack(&StaticDiff::parse(""), &config(15, 100_000)).unwrap();
        assert_eq!(outcome.output, NO_CHANGES_PLACEHOLDER);
        assert_eq!(outcome.priority_count, 0);
    }

    #[test]
    fn test_converges_first_pass_under_limit() {
        let source: String = (0..5).map(|i| file_diff(&format!("src/m{}.rs", i), 3)).collect();
        let outcome = pack(&StaticDiff::parse(&source), &config(15, 100_000)).unwrap();
        assert_eq!(outcome.priority_count, 5);
        assert_eq!(outcome.remaining_count, 0);
        assert_eq!(outcome.char_count, outcome.output.chars().count());
        assert!(
            outcome
                .output
                .starts_with("# Smart diff: 5 files with full diff, 0 files summarized")
        );
    }

    #[test]
    fn test_priority_count_capped_by_config() {
        let source: String = (0..8).map(|i| file_diff(&format!("src/m{}.rs", i), 2)).collect();
        let outcome = pack(&StaticDiff::parse(&source), &config(3, 100_000)).unwrap();
        assert_eq!(outcome.priority_count, 3);
        assert_eq!(outcome.remaining_count, 5);
        assert!(outcome.output.contains("# Remaining files (statistics only)"));
    }

    #[test]
    fn test_higher_scores_first() {
        let source = format!(
            "{}{}{}",
            file_diff("docs/guide.md", 2),
            file_diff("Makefile", 2),
            file_diff("src/core.rs", 2)
        );
        let outcome = pack(&StaticDiff::parse(&source), &config(1, 100_000)).unwrap();
        assert_eq!(outcome.priority_count, 1);
        assert!(outcome.output.contains("+line 0 of src/core.rs"));
        assert!(!outcome.output.contains("+line 0 of Makefile"));
    }

    #[test]
    fn test_excluded_files_only_summarized() {
        let source = format!(
            "{}{}",
            file_diff("package-lock.json", 2),
            file_diff("app.py", 2)
        );
        let outcome = pack(&StaticDiff::parse(&source), &config(15, 100_000)).unwrap();
        assert_eq!(outcome.priority_count, 1);
        assert_eq!(outcome.remaining_count, 1);
        assert!(outcome.output.contains("  package-lock.json (+2 -0)"));
        assert!(!outcome.output.contains("+line 0 of package-lock.json"));
    }

    #[test]
    fn test_demotion_keeps_files_before_limit() {
        // Room for two file diffs but not three
        let source: String = (0..4)
            .map(|i| file_diff(&format!("src/m{}.rs", i), 40))
            .collect();
        let one_file = file_diff("src/m0.rs", 40).len();
        let outcome = pack(&StaticDiff::parse(&source), &config(4, one_file * 2 + 300)).unwrap();
        assert_eq!(outcome.priority_count, 2);
        assert_eq!(outcome.remaining_count, 2);
        assert!(outcome.char_count <= one_file * 2 + 300);
    }

    #[test]
    fn test_header_counts_toward_limit() {
        // All ten diffs fit on their own; the header pushes the last one over
        let source: String = (0..10)
            .map(|i| file_diff(&format!("src/m{}.rs", i), 40))
            .collect();
        let one_file = file_diff("src/m0.rs", 40).len();
        let limit = one_file * 10 + 10;
        let outcome = pack(&StaticDiff::parse(&source), &config(10, limit)).unwrap();
        assert_eq!(outcome.priority_count, 9);
        assert_eq!(outcome.remaining_count, 1);
        assert!(outcome.char_count <= limit);
        assert!(outcome.output.contains("  src/m9.rs (+40 -0)"));
    }

    #[test]
    fn test_single_oversized_file_falls_back_to_stats() {
        let source = file_diff("src/huge.rs", 400);
        let limit = 1_000;
        assert!(source.len() > limit);

        let outcome = pack(&StaticDiff::parse(&source), &config(15, limit)).unwrap();
        assert_eq!(outcome.priority_count, 0);
        assert_eq!(outcome.char_count, outcome.output.chars().count());
        assert!(!outcome.output.contains("+line 0"));
        assert!(outcome.output.contains("src/huge.rs"));
    }

    #[test]
    fn test_unconverged_uses_stat_only_header() {
        // Statistics alone exceed the tiny budget, so no pass can fit
        let source: String = (0..30)
            .map(|i| file_diff(&format!("src/module_with_long_name_{}.rs", i), 1))
            .collect();
        let outcome = pack(&StaticDiff::parse(&source), &config(2, 100)).unwrap();
        assert_eq!(outcome.priority_count, 0);
        assert_eq!(outcome.remaining_count, 30);
        assert!(
            outcome
                .output
                .starts_with("# Smart diff: character limit of 100 exceeded")
        );
        assert_eq!(outcome.char_count, outcome.output.chars().count());
    }

    #[test]
    fn test_priority_disabled_keeps_enumeration_order() {
        let source = format!("{}{}", file_diff("README.md", 2), file_diff("src/a.rs", 2));
        let mut cfg = config(1, 100_000);
        cfg.smart_priority_enabled = false;
        let outcome = pack(&StaticDiff::parse(&source), &cfg).unwrap();
        assert!(outcome.output.contains("+line 0 of README.md"));
        assert!(!outcome.output.contains("+line 0 of src/a.rs"));
    }

    struct CountingProvider {
        inner: StaticDiff,
        samples: Cell<usize>,
    }

    impl DiffProvider for CountingProvider {
        fn full_diff(&self) -> ProviderResult<String> {
            self.inner.full_diff()
        }
        fn name_only_list(&self) -> ProviderResult<Vec<String>> {
            self.inner.name_only_list()
        }
        fn numeric_stat(&self) -> ProviderResult<Vec<NumStat>> {
            self.inner.numeric_stat()
        }
        fn stat_summary(&self) -> ProviderResult<String> {
            self.inner.stat_summary()
        }
        fn shortstat(&self) -> ProviderResult<String> {
            self.inner.shortstat()
        }
        fn diff_with_options(&self, options: &[&str], paths: &[String]) -> ProviderResult<String> {
            self.inner.diff_with_options(options, paths)
        }
        fn content_at_index(&self, path: &str) -> ProviderResult<String> {
            self.samples.set(self.samples.get() + 1);
            Err(ProviderError::NotFound { path: path.into() })
        }
    }

    #[test]
    fn test_excluded_files_not_sampled() {
        let source = format!("{}{}", file_diff("yarn.lock", 1), file_diff("a.rs", 1));
        let provider = CountingProvider {
            inner: StaticDiff::parse(&source),
            samples: Cell::new(0),
        };
        let outcome = pack(&provider, &config(15, 100_000)).unwrap();
        assert_eq!(provider.samples.get(), 1);
        assert_eq!(outcome.priority_count, 1);
    }

    fn proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn prop_pack_terminates_with_accurate_count(
            sizes in proptest::collection::vec(1usize..60, 1..12),
            max_files in 1usize..20,
            limit in 200usize..4000,
        ) {
            let source: String = sizes
                .iter()
                .enumerate()
                .map(|(i, n)| file_diff(&format!("src/f{}.rs", i), *n))
                .collect();
            let outcome = pack(&StaticDiff::parse(&source), &config(max_files, limit)).unwrap();

            prop_assert_eq!(outcome.char_count, outcome.output.chars().count());
            prop_assert!(outcome.priority_count <= max_files);
            prop_assert_eq!(outcome.priority_count + outcome.remaining_count, sizes.len());
        }
    }
}
