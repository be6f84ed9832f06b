//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/diffpack/config.toml)
//! 3. Project config (.diffpack/config.toml)
//! 4. Environment variables (DIFFPACK_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX};
pub use types::*;
