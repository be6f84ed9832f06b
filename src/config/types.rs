//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/diffpack/) and project (.diffpack/) level configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::compression as limits;
use crate::constants::prompt::DEFAULT_TICKET_PREFIX;
use crate::diff::Strategy;
use crate::types::ParseWithDefault;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Diff compression settings
    pub compression: CompressionConfig,

    /// Git invocation settings
    pub git: GitConfig,

    /// Prompt assembly settings
    pub prompt: PromptConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            compression: CompressionConfig::default(),
            git: GitConfig::default(),
            prompt: PromptConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Build the validated compression parameters for this process.
    pub fn strategy_config(&self) -> StrategyConfig {
        self.compression.to_strategy_config()
    }
}

// =============================================================================
// Compression Configuration
// =============================================================================

/// Raw compression settings as written in config files and environment.
///
/// Numeric fields are signed so out-of-range values survive deserialization
/// and can be clamped with a warning instead of failing the whole load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Master switch; when false diffs are passed through untouched
    pub enabled: bool,

    /// Diff size (bytes) above which compression runs
    pub size_threshold_bytes: u64,

    /// Changed-file count above which compression runs
    pub files_threshold: u64,

    /// Strategy name: stat, compact, filtered, function-context, smart
    pub strategy: String,

    /// Files shown in full by the smart strategy (1-50)
    pub max_priority_files: i64,

    /// Character budget for the smart strategy (min 10000)
    pub token_limit: i64,

    /// Rank files by priority score in the smart strategy
    pub smart_priority_enabled: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_threshold_bytes: limits::DEFAULT_SIZE_THRESHOLD_BYTES,
            files_threshold: limits::DEFAULT_FILES_THRESHOLD,
            strategy: Strategy::Compact.as_str().to_string(),
            max_priority_files: limits::DEFAULT_MAX_PRIORITY_FILES as i64,
            token_limit: limits::DEFAULT_TOKEN_LIMIT as i64,
            smart_priority_enabled: true,
        }
    }
}

impl CompressionConfig {
    /// Clamp and default the raw settings into a [`StrategyConfig`].
    ///
    /// Never fails: invalid values are replaced and logged.
    pub fn to_strategy_config(&self) -> StrategyConfig {
        let min = limits::MIN_PRIORITY_FILES as i64;
        let max = limits::MAX_PRIORITY_FILES as i64;
        let max_priority_files = if (min..=max).contains(&self.max_priority_files) {
            self.max_priority_files as usize
        } else {
            let clamped = self.max_priority_files.clamp(min, max) as usize;
            warn!(
                "max_priority_files={} outside valid range [{}, {}], clamping to {}",
                self.max_priority_files, min, max, clamped
            );
            clamped
        };

        let token_limit = if self.token_limit < limits::MIN_TOKEN_LIMIT as i64 {
            warn!(
                "token_limit={} too small (minimum {}), using default {}",
                self.token_limit,
                limits::MIN_TOKEN_LIMIT,
                limits::DEFAULT_TOKEN_LIMIT
            );
            limits::DEFAULT_TOKEN_LIMIT
        } else {
            self.token_limit as usize
        };

        StrategyConfig {
            enabled: self.enabled,
            size_threshold_bytes: self.size_threshold_bytes,
            files_threshold: self.files_threshold,
            strategy: Strategy::parse_or_default(&self.strategy),
            max_priority_files,
            token_limit,
            smart_priority_enabled: self.smart_priority_enabled,
        }
    }
}

/// Validated, immutable compression parameters.
///
/// Built once per command from [`Config`] and passed by reference into the
/// compression engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyConfig {
    pub enabled: bool,
    pub size_threshold_bytes: u64,
    pub files_threshold: u64,
    pub strategy: Strategy,
    pub max_priority_files: usize,
    pub token_limit: usize,
    pub smart_priority_enabled: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        CompressionConfig::default().to_strategy_config()
    }
}

// =============================================================================
// Git Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Git executable name or path
    pub binary: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
        }
    }
}

// =============================================================================
// Prompt Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Ticket prefix matched at the start of branch names (e.g. IOTIL-123-fix)
    pub ticket_prefix: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            ticket_prefix: DEFAULT_TICKET_PREFIX.to_string(),
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no CLI flag or RUST_LOG is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_config() {
        let config = StrategyConfig::default();
        assert!(config.enabled);
        assert_eq!(config.size_threshold_bytes, 50_000);
        assert_eq!(config.files_threshold, 100);
        assert_eq!(config.strategy, Strategy::Compact);
        assert_eq!(config.max_priority_files, 15);
        assert_eq!(config.token_limit, 100_000);
        assert!(config.smart_priority_enabled);
    }

    #[test]
    fn test_max_priority_files_clamped() {
        let mut raw = CompressionConfig {
            max_priority_files: 0,
            ..Default::default()
        };
        assert_eq!(raw.to_strategy_config().max_priority_files, 1);

        raw.max_priority_files = -4;
        assert_eq!(raw.to_strategy_config().max_priority_files, 1);

        raw.max_priority_files = 200;
        assert_eq!(raw.to_strategy_config().max_priority_files, 50);

        raw.max_priority_files = 50;
        assert_eq!(raw.to_strategy_config().max_priority_files, 50);
    }

    #[test]
    fn test_small_token_limit_reset_to_default() {
        let raw = CompressionConfig {
            token_limit: 9_999,
            ..Default::default()
        };
        assert_eq!(raw.to_strategy_config().token_limit, 100_000);

        let raw = CompressionConfig {
            token_limit: 10_000,
            ..Default::default()
        };
        assert_eq!(raw.to_strategy_config().token_limit, 10_000);
    }

    #[test]
    fn test_invalid_strategy_defaults_to_compact() {
        let raw = CompressionConfig {
            strategy: "zip".to_string(),
            ..Default::default()
        };
        assert_eq!(raw.to_strategy_config().strategy, Strategy::Compact);

        let raw = CompressionConfig {
            strategy: "function-context".to_string(),
            ..Default::default()
        };
        assert_eq!(
            raw.to_strategy_config().strategy,
            Strategy::FunctionContext
        );
    }

    #[test]
    fn test_parse_sections() {
        let config: Config = toml::from_str(
            r#"
version = "1.0"

[compression]
strategy = "smart"
token_limit = 20000

[prompt]
ticket_prefix = "PROJ"
"#,
        )
        .expect("valid toml");

        assert_eq!(config.compression.strategy, "smart");
        assert_eq!(config.compression.token_limit, 20_000);
        assert_eq!(config.compression.files_threshold, 100);
        assert_eq!(config.prompt.ticket_prefix, "PROJ");
        assert_eq!(config.git.binary, "git");
    }
}
