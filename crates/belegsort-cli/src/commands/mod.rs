//! Subcommands.

pub mod config;
pub mod inspect;
pub mod sort;

use std::path::{Path, PathBuf};

use belegsort_core::SortConfig;

/// `<config_dir>/belegsort/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("belegsort")
        .join("config.json")
}

/// Config from `--config`, else the default file if it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SortConfig> {
    let config = match config_path {
        Some(path) => SortConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                SortConfig::from_file(&default_path)?
            } else {
                SortConfig::default()
            }
        }
    };
    Ok(config)
}
