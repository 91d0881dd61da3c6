//! Config file handling
//!
//! Both subcommands accept an optional TOML file holding a
//! `ListStaggerConfig` or an `AnimatorConfig`. Missing list fields fall back
//! to their defaults; command-line flags override whatever the file says.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Load a TOML config file
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Load `path` if given, otherwise use `T::default()`
pub fn load_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => load(path),
        None => Ok(T::default()),
    }
}
