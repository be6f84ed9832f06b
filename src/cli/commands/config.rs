//! Config Command
//!
//! Manage diffpack configuration.
//!
//! Usage:
//!   diffpack config show [-f json|toml]
//!   diffpack config path
//!   diffpack config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(config: &Config, format: &str) -> Result<()> {
    println!("{}", ConfigLoader::render(config, format == "json")?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();

    let overrides = ConfigLoader::env_overrides();
    if !overrides.is_empty() {
        println!();
        println!("Environment overrides:");
        for (key, value) in overrides {
            println!("  {}={}", key, value);
        }
    }
    Ok(())
}

/// Write a default config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };

    let scope = if global { "global" } else { "project" };
    Output::new().success(&format!("Initialized {} configuration", scope));
    println!("  Config: {}", path.display());
    Ok(())
}
