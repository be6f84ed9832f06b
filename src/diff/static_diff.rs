//! In-memory diff provider.
//!
//! Answers every [`DiffProvider`] request from a unified diff that is already
//! in memory (piped on stdin, saved to a file). The diff is split into
//! per-file sections on `diff --git` headers, or on `---`/`+++` marker pairs
//! when the diff has no git headers.
//!
//! Context options such as `--unified=1` cannot be re-applied to text that
//! was generated with fixed context, so they are ignored; `--stat`,
//! `--numstat`, `--shortstat` and `--name-only` are rendered from the
//! sections.

use std::sync::LazyLock;

use regex::Regex;

use super::provider::{DiffProvider, NumStat, ProviderResult};
use crate::types::ProviderError;

static GIT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git a/(.*?) b/(.*?)$").expect("valid regex"));

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -\d+(?:,(\d+))? \+\d+(?:,(\d+))? @@").expect("valid regex")
});

/// Widest +/- bar in the `--stat` rendering
const STAT_GRAPH_WIDTH: u64 = 40;

#[derive(Debug, Clone)]
struct FileSection {
    path: String,
    text: String,
    added: u64,
    deleted: u64,
    binary: bool,
    removed: bool,
    /// The `+++` marker line has been read
    markers_seen: bool,
    /// New-side lines visible in the hunks
    new_lines: Vec<String>,
}

impl FileSection {
    fn new(path: String) -> Self {
        Self {
            path,
            text: String::new(),
            added: 0,
            deleted: 0,
            binary: false,
            removed: false,
            markers_seen: false,
            new_lines: Vec::new(),
        }
    }

    fn numstat(&self) -> NumStat {
        if self.binary {
            NumStat::new(None, None, self.path.clone())
        } else {
            NumStat::new(Some(self.added), Some(self.deleted), self.path.clone())
        }
    }
}

/// Lines still expected in the current hunk
#[derive(Debug, Clone, Copy, Default)]
struct HunkLines {
    old: u64,
    new: u64,
}

impl HunkLines {
    /// Counts from an `@@ -a,b +c,d @@` header; an omitted count is 1.
    /// An unreadable header keeps the hunk open until the next file.
    fn parse(header: &str) -> Self {
        let Some(caps) = HUNK_HEADER.captures(header) else {
            return Self {
                old: u64::MAX,
                new: u64::MAX,
            };
        };
        let count = |group: usize| {
            caps.get(group)
                .map_or(Some(1), |m| m.as_str().parse().ok())
                .unwrap_or(u64::MAX)
        };
        Self {
            old: count(1),
            new: count(2),
        }
    }

    fn is_open(&self) -> bool {
        self.old > 0 || self.new > 0
    }
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Path named by a `---`/`+++` marker, without the `a/`/`b/` prefix or a
/// trailing timestamp; `None` for `/dev/null`.
fn marker_path(marker: &str) -> Option<&str> {
    let path = marker.split('\t').next().unwrap_or(marker).trim_end();
    if path.is_empty() || path == "/dev/null" {
        return None;
    }
    Some(
        path.strip_prefix("b/")
            .or_else(|| path.strip_prefix("a/"))
            .unwrap_or(path),
    )
}

/// Diff provider over an in-memory unified diff
#[derive(Debug, Clone, Default)]
pub struct StaticDiff {
    source: String,
    sections: Vec<FileSection>,
}

impl StaticDiff {
    /// Split a unified diff into file sections.
    ///
    /// Sections start at `diff --git` headers. Plain unified diffs (`diff -u`
    /// output, hand-made patches) have none, so a `---`/`+++` marker pair
    /// outside a hunk starts a section too. Hunk line counts decide where a
    /// hunk ends, so removed lines that begin with `--` stay in their hunk.
    ///
    /// Text before the first section is kept in [`full_diff`] but belongs to
    /// no file.
    ///
    /// [`full_diff`]: DiffProvider::full_diff
    pub fn parse(diff: &str) -> Self {
        let lines: Vec<&str> = diff.split_inclusive('\n').collect();
        let mut sections: Vec<FileSection> = Vec::new();
        let mut hunk = HunkLines::default();

        for (index, line) in lines.iter().enumerate() {
            let bare = trim_eol(line);

            if let Some(caps) = GIT_HEADER.captures(bare) {
                let path = caps.get(2).map_or("", |m| m.as_str()).to_string();
                sections.push(FileSection::new(path));
                hunk = HunkLines::default();
            } else if !hunk.is_open()
                && sections.last().is_none_or(|s| s.markers_seen)
                && let Some(old) = bare.strip_prefix("--- ")
                && let Some(new) = lines
                    .get(index + 1)
                    .and_then(|next| trim_eol(next).strip_prefix("+++ "))
            {
                let path = marker_path(new).or_else(|| marker_path(old)).unwrap_or_default();
                sections.push(FileSection::new(path.to_string()));
            }

            let Some(section) = sections.last_mut() else {
                continue;
            };
            section.text.push_str(line);

            if bare.starts_with("@@") {
                hunk = HunkLines::parse(bare);
                continue;
            }

            if hunk.is_open() {
                match bare.chars().next() {
                    Some('+') => {
                        section.added += 1;
                        section.new_lines.push(bare[1..].to_string());
                        hunk.new = hunk.new.saturating_sub(1);
                        continue;
                    }
                    Some('-') => {
                        section.deleted += 1;
                        hunk.old = hunk.old.saturating_sub(1);
                        continue;
                    }
                    Some(' ') | None => {
                        section.new_lines.push(bare.get(1..).unwrap_or_default().to_string());
                        hunk.old = hunk.old.saturating_sub(1);
                        hunk.new = hunk.new.saturating_sub(1);
                        continue;
                    }
                    // "\ No newline at end of file"
                    Some('\\') => continue,
                    Some(_) => hunk = HunkLines::default(),
                }
            }

            if bare.starts_with("Binary files ") || bare == "GIT binary patch" {
                section.binary = true;
            } else if bare.starts_with("deleted file mode") {
                section.removed = true;
            } else if let Some(marker) = bare.strip_prefix("+++ ") {
                section.markers_seen = true;
                match marker_path(marker) {
                    Some(path) => section.path = path.to_string(),
                    None => section.removed = true,
                }
            } else if let Some(path) = bare.strip_prefix("rename to ") {
                section.path = path.to_string();
            }
        }

        Self {
            source: diff.to_string(),
            sections,
        }
    }

    /// Number of files in the diff
    pub fn file_count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn select(&self, paths: &[String]) -> Vec<&FileSection> {
        if paths.is_empty() {
            return self.sections.iter().collect();
        }
        self.sections
            .iter()
            .filter(|s| paths.iter().any(|p| *p == s.path))
            .collect()
    }
}

impl DiffProvider for StaticDiff {
    fn full_diff(&self) -> ProviderResult<String> {
        Ok(self.source.clone())
    }

    fn name_only_list(&self) -> ProviderResult<Vec<String>> {
        Ok(self.sections.iter().map(|s| s.path.clone()).collect())
    }

    fn numeric_stat(&self) -> ProviderResult<Vec<NumStat>> {
        Ok(self.sections.iter().map(FileSection::numstat).collect())
    }

    fn stat_summary(&self) -> ProviderResult<String> {
        Ok(render_stat(&self.select(&[])))
    }

    fn shortstat(&self) -> ProviderResult<String> {
        Ok(render_shortstat(&self.select(&[])))
    }

    fn diff_with_options(&self, options: &[&str], paths: &[String]) -> ProviderResult<String> {
        let selected = self.select(paths);

        if options.contains(&"--stat") {
            return Ok(render_stat(&selected));
        }
        if options.contains(&"--shortstat") {
            return Ok(render_shortstat(&selected));
        }
        if options.contains(&"--numstat") {
            return Ok(selected
                .iter()
                .map(|s| {
                    let stat = s.numstat();
                    let count = |n: Option<u64>| n.map_or("-".to_string(), |n| n.to_string());
                    format!("{}\t{}\t{}\n", count(stat.added), count(stat.deleted), stat.path)
                })
                .collect());
        }
        if options.contains(&"--name-only") {
            return Ok(selected.iter().map(|s| format!("{}\n", s.path)).collect());
        }

        if paths.is_empty() {
            return Ok(self.source.clone());
        }
        Ok(selected.iter().map(|s| s.text.as_str()).collect())
    }

    fn content_at_index(&self, path: &str) -> ProviderResult<String> {
        let not_found = || ProviderError::NotFound {
            path: path.to_string(),
        };
        let section = self
            .sections
            .iter()
            .find(|s| s.path == path)
            .ok_or_else(not_found)?;

        if section.binary || section.removed || section.new_lines.is_empty() {
            return Err(not_found());
        }

        let mut content = section.new_lines.join("\n");
        content.push('\n');
        Ok(content)
    }
}

// =============================================================================
// Stat Rendering
// =============================================================================

/// `git diff --stat` style report
fn render_stat(sections: &[&FileSection]) -> String {
    if sections.is_empty() {
        return String::new();
    }

    let name_width = sections.iter().map(|s| s.path.chars().count()).max().unwrap_or(0);
    let max_changes = sections
        .iter()
        .filter(|s| !s.binary)
        .map(|s| s.added + s.deleted)
        .max()
        .unwrap_or(0);
    let count_width = max_changes.to_string().len();

    let mut out = String::new();
    for section in sections {
        if section.binary {
            out.push_str(&format!(" {:<name_width$} | Bin\n", section.path));
            continue;
        }

        let total = section.added + section.deleted;
        let (plus, minus) = if max_changes > STAT_GRAPH_WIDTH {
            (
                section.added * STAT_GRAPH_WIDTH / max_changes,
                section.deleted * STAT_GRAPH_WIDTH / max_changes,
            )
        } else {
            (section.added, section.deleted)
        };
        out.push_str(&format!(
            " {:<name_width$} | {:>count_width$} {}{}\n",
            section.path,
            total,
            "+".repeat(plus as usize),
            "-".repeat(minus as usize),
        ));
    }

    out.push(' ');
    out.push_str(&render_shortstat(sections));
    out.push('\n');
    out
}

/// `git diff --shortstat` style line (without leading space)
fn render_shortstat(sections: &[&FileSection]) -> String {
    if sections.is_empty() {
        return String::new();
    }

    let files = sections.len();
    let insertions: u64 = sections.iter().map(|s| s.added).sum();
    let deletions: u64 = sections.iter().map(|s| s.deleted).sum();

    let mut line = format!(
        "{} file{} changed",
        files,
        if files == 1 { "" } else { "s" }
    );
    // git prints both clauses when both are zero
    if insertions > 0 || deletions == 0 {
        line.push_str(&format!(
            ", {} insertion{}(+)",
            insertions,
            if insertions == 1 { "" } else { "s" }
        ));
    }
    if deletions > 0 || insertions == 0 {
        line.push_str(&format!(
            ", {} deletion{}(-)",
            deletions,
            if deletions == 1 { "" } else { "s" }
        ));
    }
    line
}
