//! Diff Provider
//!
//! The collaborator interface the compression engine reads diff data from,
//! and its git CLI implementation.
//!
//! Every operation returns `Result<_, ProviderError>` so callers can tell
//! "tool failed" apart from "no matching files" (an empty, successful value).

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::types::ProviderError;

/// Listings report a rename as delete + add, so `--name-only` and
/// `--numstat` name the same paths
const NO_RENAMES: &str = "--no-renames";

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// =============================================================================
// Numeric Stat
// =============================================================================

/// One line of a `--numstat` report.
///
/// Binary files report `-` for both counts, stored here as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumStat {
    pub added: Option<u64>,
    pub deleted: Option<u64>,
    pub path: String,
}

impl NumStat {
    pub fn new(added: Option<u64>, deleted: Option<u64>, path: impl Into<String>) -> Self {
        Self {
            added,
            deleted,
            path: path.into(),
        }
    }

    /// Parse `"<added>\t<deleted>\t<path>"`.
    ///
    /// Non-numeric counts (git prints `-` for binaries) become `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(3, '\t');
        let added = parts.next()?;
        let deleted = parts.next()?;
        let path = parts.next()?.trim();
        if path.is_empty() {
            return None;
        }
        Some(Self {
            added: added.trim().parse().ok(),
            deleted: deleted.trim().parse().ok(),
            path: path.to_string(),
        })
    }

    /// Parse a whole `--numstat` report, skipping malformed lines
    pub fn parse_report(report: &str) -> Vec<Self> {
        report
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(Self::parse_line)
            .collect()
    }

    /// Both counts are placeholders
    pub fn is_binary(&self) -> bool {
        self.added.is_none() && self.deleted.is_none()
    }

    /// Single-line summary used in compact headers and stat sections
    pub fn summary_line(&self) -> String {
        if self.is_binary() {
            format!("  {} (binary)", self.path)
        } else {
            format!(
                "  {} (+{} -{})",
                self.path,
                self.added.unwrap_or(0),
                self.deleted.unwrap_or(0)
            )
        }
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Source of diff data for one change set (staged index, commit range, or an
/// in-memory diff).
pub trait DiffProvider {
    /// Complete unified diff
    fn full_diff(&self) -> ProviderResult<String>;

    /// Changed paths, one per file
    fn name_only_list(&self) -> ProviderResult<Vec<String>>;

    /// Per-file insertion/deletion counts
    fn numeric_stat(&self) -> ProviderResult<Vec<NumStat>>;

    /// Human-readable per-file statistics (`--stat`)
    fn stat_summary(&self) -> ProviderResult<String>;

    /// One-line totals (`--shortstat`)
    fn shortstat(&self) -> ProviderResult<String>;

    /// Diff regenerated with extra options, optionally restricted to `paths`
    fn diff_with_options(&self, options: &[&str], paths: &[String]) -> ProviderResult<String>;

    /// Content of `path` as it stands in the change set's new version
    fn content_at_index(&self, path: &str) -> ProviderResult<String>;
}

// =============================================================================
// Git CLI Provider
// =============================================================================

/// Which change set the git provider describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffTarget {
    /// Changes staged in the index (`git diff --cached`)
    Staged,
    /// Changes on `head` since it diverged from `base` (`git diff base...head`)
    Range { base: String, head: String },
}

impl DiffTarget {
    /// Parse `BASE..HEAD` or `BASE...HEAD`; an empty side means `HEAD`
    pub fn parse_range(spec: &str) -> Option<Self> {
        let (base, head) = spec
            .split_once("...")
            .or_else(|| spec.split_once(".."))?;
        let base = base.trim();
        if base.is_empty() {
            return None;
        }
        let head = match head.trim() {
            "" => "HEAD",
            other => other,
        };
        Some(Self::Range {
            base: base.to_string(),
            head: head.to_string(),
        })
    }

    /// Revision whose tree holds the "new" content
    fn content_revision(&self) -> &str {
        match self {
            // `git show :path` reads the index
            Self::Staged => "",
            Self::Range { head, .. } => head,
        }
    }
}

impl std::fmt::Display for DiffTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staged => write!(f, "staged changes"),
            Self::Range { base, head } => write!(f, "{}...{}", base, head),
        }
    }
}

/// Diff provider backed by the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
    workdir: Option<PathBuf>,
    target: DiffTarget,
}

impl GitCli {
    pub fn new(binary: impl Into<String>, target: DiffTarget) -> Self {
        Self {
            binary: binary.into(),
            workdir: None,
            target,
        }
    }

    /// Run git inside `dir` instead of the current directory
    pub fn with_workdir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.workdir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// `git --version` output
    pub fn version(&self) -> ProviderResult<String> {
        self.run(&["--version"]).map(|out| out.trim().to_string())
    }

    /// Whether the working directory is inside a git work tree
    pub fn is_inside_work_tree(&self) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    /// Current branch name, or `None` on a detached HEAD
    pub fn current_branch(&self) -> ProviderResult<Option<String>> {
        let out = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = out.trim();
        if name.is_empty() || name == "HEAD" {
            Ok(None)
        } else {
            Ok(Some(name.to_string()))
        }
    }

    fn diff_args<'a>(&'a self, extra: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec!["diff", "--no-color", "--no-ext-diff"];
        match &self.target {
            DiffTarget::Staged => args.push("--cached"),
            DiffTarget::Range { .. } => {}
        }
        args.extend_from_slice(extra);
        args
    }

    fn run_diff(&self, extra: &[&str], paths: &[String]) -> ProviderResult<String> {
        let range;
        let mut args = self.diff_args(extra);
        if let DiffTarget::Range { base, head } = &self.target {
            range = format!("{}...{}", base, head);
            args.push(&range);
        }
        if !paths.is_empty() {
            args.push("--");
            args.extend(paths.iter().map(String::as_str));
        }
        self.run(&args)
    }

    fn run(&self, args: &[&str]) -> ProviderResult<String> {
        let command = format!("{} {}", self.binary, args.join(" "));
        debug!("Running: {}", command);

        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| ProviderError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProviderError::command_failed(
                command,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        String::from_utf8(output.stdout).map_err(|_| ProviderError::InvalidUtf8 { command })
    }
}

impl DiffProvider for GitCli {
    fn full_diff(&self) -> ProviderResult<String> {
        self.run_diff(&[], &[])
    }

    fn name_only_list(&self) -> ProviderResult<Vec<String>> {
        let out = self.run_diff(&["--name-only", NO_RENAMES], &[])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn numeric_stat(&self) -> ProviderResult<Vec<NumStat>> {
        let out = self.run_diff(&["--numstat", NO_RENAMES], &[])?;
        Ok(NumStat::parse_report(&out))
    }

    fn stat_summary(&self) -> ProviderResult<String> {
        self.run_diff(&["--stat"], &[])
    }

    fn shortstat(&self) -> ProviderResult<String> {
        self.run_diff(&["--shortstat"], &[])
            .map(|out| out.trim().to_string())
    }

    fn diff_with_options(&self, options: &[&str], paths: &[String]) -> ProviderResult<String> {
        self.run_diff(options, paths)
    }

    fn content_at_index(&self, path: &str) -> ProviderResult<String> {
        let object = format!("{}:{}", self.target.content_revision(), path);
        self.run(&["show", &object])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numstat_parse_line() {
        assert_eq!(
            NumStat::parse_line("12\t3\tsrc/main.rs"),
            Some(NumStat::new(Some(12), Some(3), "src/main.rs"))
        );
        let binary = NumStat::parse_line("-\t-\tassets/logo.png").unwrap();
        assert!(binary.is_binary());
        assert_eq!(NumStat::parse_line("garbage"), None);
        assert_eq!(NumStat::parse_line("1\t2\t"), None);
    }

    #[test]
    fn test_numstat_path_with_tabs_kept() {
        let stat = NumStat::parse_line("1\t0\tdir/odd\tname.txt").unwrap();
        assert_eq!(stat.path, "dir/odd\tname.txt");
    }

    #[test]
    fn test_numstat_summary_line() {
        assert_eq!(
            NumStat::new(Some(5), Some(0), "a.rs").summary_line(),
            "  a.rs (+5 -0)"
        );
        assert_eq!(
            NumStat::new(None, None, "b.png").summary_line(),
            "  b.png (binary)"
        );
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            DiffTarget::parse_range("main...feature"),
            Some(DiffTarget::Range {
                base: "main".to_string(),
                head: "feature".to_string()
            })
        );
        assert_eq!(
            DiffTarget::parse_range("origin/main.."),
            Some(DiffTarget::Range {
                base: "origin/main".to_string(),
                head: "HEAD".to_string()
            })
        );
        assert_eq!(DiffTarget::parse_range("main"), None);
        assert_eq!(DiffTarget::parse_range("..feature"), None);
    }

    #[test]
    fn test_diff_args_for_targets() {
        let staged = GitCli::new("git", DiffTarget::Staged);
        assert_eq!(
            staged.diff_args(&["--stat"]),
            vec!["diff", "--no-color", "--no-ext-diff", "--cached", "--stat"]
        );

        let range = GitCli::new(
            "git",
            DiffTarget::Range {
                base: "main".into(),
                head: "HEAD".into(),
            },
        );
        assert!(!range.diff_args(&[]).contains(&"--cached"));
        assert_eq!(range.target.content_revision(), "HEAD");
    }

    #[test]
    fn test_outside_work_tree() {
        let dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::new("git", DiffTarget::Staged).with_workdir(dir.path());
        assert!(!git.is_inside_work_tree());
    }

    #[cfg(unix)]
    #[test]
    fn test_listings_disable_rename_detection() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let stub = dir.path().join("git-args");
        std::fs::write(&stub, "#!/bin/sh\nprintf '1\\t0\\t%s\\n' \"$*\"\n").unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let git = GitCli::new(stub.to_string_lossy(), DiffTarget::Staged);
        let names = git.name_only_list().unwrap();
        assert!(names[0].contains("--name-only --no-renames"));
        let stats = git.numeric_stat().unwrap();
        assert!(stats[0].path.contains("--numstat --no-renames"));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let git = GitCli::new("definitely-not-a-real-git-binary", DiffTarget::Staged);
        let err = git.full_diff().unwrap_err();
        assert!(err.is_tool_unavailable());
    }
}
