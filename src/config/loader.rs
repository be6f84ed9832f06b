//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/diffpack/config.toml)
//! 3. Project config (.diffpack/config.toml)
//! 4. Environment variables (DIFFPACK_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DiffpackError, Result};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "DIFFPACK_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let global = Self::global_config_path();
        Self::load_from_paths(global.as_deref(), &Self::project_config_path())
    }

    /// Load configuration from explicit global/project paths plus environment.
    ///
    /// Missing files are skipped.
    pub fn load_from_paths(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // e.g. DIFFPACK_COMPRESSION__TOKEN_LIMIT -> compression.token_limit
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        figment
            .extract()
            .map_err(|e| DiffpackError::Config(format!("Configuration error: {}", e)))
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DiffpackError::Config(format!("Configuration error: {}", e)))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/diffpack/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("diffpack"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".diffpack")
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// `DIFFPACK_*` variables currently set, sorted by name
    pub fn env_overrides() -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        vars.sort();
        vars
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render a configuration as JSON or TOML
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| DiffpackError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DiffpackError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default_config(&global_dir, force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_default_config(&Self::project_dir(), force)
    }

    /// Write the default config file into `dir`, returning its path.
    ///
    /// An existing file is left alone unless `force` is set.
    pub fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_content())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default config content (TOML)
    fn default_config_content() -> String {
        r#"# diffpack Configuration
# Project settings in .diffpack/config.toml override ~/.config/diffpack/config.toml.
# Environment variables override both, e.g. DIFFPACK_COMPRESSION__STRATEGY=smart

version = "1.0"

[compression]
enabled = true
# Compress when the diff exceeds either threshold
size_threshold_bytes = 50000
files_threshold = 100
# stat | compact | filtered | function-context | smart
strategy = "compact"
# smart strategy: files shown in full (1-50) and character budget (min 10000)
max_priority_files = 15
token_limit = 100000
smart_priority_enabled = true

[git]
binary = "git"

[prompt]
ticket_prefix = "IOTIL"

[logging]
level = "warn"
"#
        .to_string()
    }
}
