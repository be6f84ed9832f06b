//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Layers
//!
//! - **ProviderError**: a diff provider (git CLI or in-memory diff) could not
//!   answer a request. The compression dispatcher consumes these and falls
//!   back to the original diff, so they rarely escape the library.
//! - **DiffpackError**: application-level failures surfaced by CLI commands
//!   (configuration, repository state, I/O).
//!
//! ## Design Principles
//!
//! - "No matching files" is a valid value, never an error
//! - Tool failures carry the command line and stderr for debugging
//! - No panic/unwrap in library code

use thiserror::Error;

// =============================================================================
// Provider Error
// =============================================================================

/// Failure of a diff provider operation
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The tool could not be started at all (missing binary, permissions)
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully
    #[error("`{command}` exited with {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| format!("status {}", c)))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The tool produced output that is not valid UTF-8
    #[error("`{command}` produced non-UTF-8 output")]
    InvalidUtf8 { command: String },

    /// Requested path has no content (deleted, binary, or unknown)
    #[error("no content available for {path}")]
    NotFound { path: String },

    /// Operation is not supported by this provider
    #[error("operation not supported: {operation}")]
    Unsupported { operation: String },
}

impl ProviderError {
    /// Create a command failure from captured process output
    pub fn command_failed(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            code,
            stderr: stderr.into().trim().to_string(),
        }
    }

    /// Whether the failure means the tool itself is unusable
    /// (as opposed to a single request failing)
    pub fn is_tool_unavailable(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DiffpackError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Diff provider error: {0}")]
    Provider(#[from] ProviderError),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("No staged changes found. Use 'git add' to stage changes.")]
    NoChanges,

    #[error("Not in a git repository")]
    NotARepository,

    #[error("Not on a branch (detached HEAD state)")]
    DetachedHead,

    #[error("Invalid revision range '{0}': expected BASE..HEAD or BASE...HEAD")]
    InvalidRange(String),
}

pub type Result<T> = std::result::Result<T, DiffpackError>;

impl DiffpackError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
