//! Centralized path helpers for the config directory.

use std::env;
use std::path::PathBuf;

use crate::core::app;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "PANTRY_CONFIG_DIR";

/// Project directories from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/pantry-recipes/), or `PANTRY_CONFIG_DIR` when set.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.config_dir().to_path_buf())
}
