//! diffpack - Diff Reduction for Commit-Message Prompts
//!
//! Measures a git change set and, when it is too large for a language-model
//! prompt, reduces it with one of several strategies before it is embedded.
//!
//! ## Core Features
//!
//! - **Thresholds**: size and file-count triggers decide whether to compress
//! - **Strategies**: stat, compact, filtered, function-context and smart
//! - **Priority Scoring**: path tiers, location discounts, generated-file detection
//! - **Diff Sources**: the git CLI or an in-memory unified diff
//!
//! ## Quick Start
//!
//! ```ignore
//! use diffpack::{ConfigLoader, DiffTarget, DiffProvider, GitCli, compress_if_needed};
//!
//! let config = ConfigLoader::load()?.strategy_config();
//! let git = GitCli::new("git", DiffTarget::Staged);
//! let original = git.full_diff()?;
//! let result = compress_if_needed(&git, &original, &config);
//! println!("{}", result.compressed_diff);
//! ```
//!
//! ## Modules
//!
//! - [`diff`]: providers, scoring, strategies and the dispatcher
//! - [`prompt`]: commit-message prompt assembly and reply extraction
//! - [`config`]: layered configuration

pub mod cli;
pub mod config;
pub mod constants;
pub mod diff;
pub mod prompt;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, StrategyConfig};

// Error Types
pub use types::{DiffpackError, ProviderError, Result};

// =============================================================================
// Diff Re-exports
// =============================================================================

pub use diff::{
    ChangeStatistics, CompressionMetadata, CompressionResult, DiffProvider, DiffSizeMetrics,
    DiffTarget, GitCli, StaticDiff, Strategy, apply_strategy, compress_if_needed, measure,
    score_file, should_compress,
};

// =============================================================================
// Prompt Re-exports
// =============================================================================

pub use prompt::{GitContext, build_commit_prompt, extract_commit_message};
