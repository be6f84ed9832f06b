//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::config::{Config, StrategyConfig};
use crate::diff::{DiffProvider, DiffTarget, GitCli, StaticDiff};
use crate::types::{DiffpackError, Result};

/// Where a command reads its diff from
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Diff a revision range (BASE..HEAD or BASE...HEAD) instead of the index
    #[arg(long, value_name = "RANGE", conflicts_with_all = ["stdin", "diff_file"])]
    pub range: Option<String>,

    /// Read a unified diff from stdin
    #[arg(long, conflicts_with = "diff_file")]
    pub stdin: bool,

    /// Read a unified diff from a file
    #[arg(long, value_name = "FILE")]
    pub diff_file: Option<PathBuf>,
}

/// Resolved diff source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    Git(DiffTarget),
    Stdin,
    File(PathBuf),
}

impl SourceArgs {
    pub fn resolve(&self) -> Result<DiffSource> {
        if self.stdin {
            return Ok(DiffSource::Stdin);
        }
        if let Some(path) = &self.diff_file {
            return Ok(DiffSource::File(path.clone()));
        }
        match &self.range {
            Some(spec) => DiffTarget::parse_range(spec)
                .map(DiffSource::Git)
                .ok_or_else(|| DiffpackError::InvalidRange(spec.clone())),
            None => Ok(DiffSource::Git(DiffTarget::Staged)),
        }
    }
}

/// A diff loaded for a command, with the provider that describes it
pub struct LoadedDiff {
    pub provider: Box<dyn DiffProvider>,
    pub original: String,
    /// Present when the diff comes from a repository
    pub git: Option<GitCli>,
}

/// Command execution context
///
/// Carries the loaded configuration and the validated compression parameters
/// built from it once per process.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub strategy: StrategyConfig,
}

impl CommandContext {
    pub fn new(config: Config) -> Self {
        let strategy = config.strategy_config();
        Self { config, strategy }
    }

    /// Git CLI for the configured binary
    pub fn git(&self, target: DiffTarget) -> GitCli {
        GitCli::new(self.config.git.binary.clone(), target)
    }

    /// Load the diff a command works on.
    ///
    /// An empty diff is [`DiffpackError::NoChanges`].
    pub fn load_diff(&self, source: &DiffSource) -> Result<LoadedDiff> {
        let loaded = match source {
            DiffSource::Git(target) => {
                let git = self.git(target.clone());
                if !git.is_inside_work_tree() {
                    return Err(DiffpackError::NotARepository);
                }
                let original = git.full_diff()?;
                debug!("Loaded {} ({} bytes)", target, original.len());
                LoadedDiff {
                    provider: Box::new(git.clone()),
                    original,
                    git: Some(git),
                }
            }
            DiffSource::Stdin => {
                let mut original = String::new();
                io::stdin().read_to_string(&mut original)?;
                Self::static_diff(original)
            }
            DiffSource::File(path) => Self::static_diff(fs::read_to_string(path)?),
        };

        if loaded.original.trim().is_empty() {
            return Err(DiffpackError::NoChanges);
        }
        Ok(loaded)
    }

    fn static_diff(original: String) -> LoadedDiff {
        LoadedDiff {
            provider: Box::new(StaticDiff::parse(&original)),
            original,
            git: None,
        }
    }

    /// Current branch for prompt context.
    ///
    /// Repository diffs require a branch; in-memory diffs fall back to
    /// `unknown` when no repository is around.
    pub fn current_branch(&self, loaded: &LoadedDiff) -> Result<String> {
        match &loaded.git {
            Some(git) => git.current_branch()?.ok_or(DiffpackError::DetachedHead),
            None => {
                let git = self.git(DiffTarget::Staged);
                match git.current_branch() {
                    Ok(Some(branch)) => Ok(branch),
                    Ok(None) => Ok("HEAD".to_string()),
                    Err(e) => {
                        debug!("No branch available: {}", e);
                        Ok("unknown".to_string())
                    }
                }
            }
        }
    }
}
