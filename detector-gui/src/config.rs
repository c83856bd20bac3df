//! # GUI Configuration
//!
//! Optional TOML file with the detector settings and the data file location.
//! Lookup order: `$DETECTOR_CONFIG`, `./detector.toml`, then
//! `<platform config dir>/config.toml`.

use anyhow::{Context, Result, anyhow};
use detector_core::DetectorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the JSON file holding e-mails and patterns.
const DATA_FILE_NAME: &str = "sound_detector_data.json";

#[derive(Debug, Default, Deserialize)]
pub struct GuiConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Overrides the default data file location.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "sound-detector")
}

/// Finds the first existing configuration file.
pub fn find_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("DETECTOR_CONFIG") {
        return Some(PathBuf::from(explicit));
    }
    let local = PathBuf::from("detector.toml");
    if local.exists() {
        return Some(local);
    }
    let platform = project_dirs()?.config_dir().join("config.toml");
    platform.exists().then_some(platform)
}

pub fn load_config(path: &Path) -> Result<GuiConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Loads the configuration, falling back to defaults on any problem.
pub fn load_or_default() -> GuiConfig {
    let Some(path) = find_config_path() else {
        return GuiConfig::default();
    };
    match load_config(&path) {
        Ok(config) => {
            log::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("Failed to load config: {e:#}");
            GuiConfig::default()
        }
    }
}

impl GuiConfig {
    /// Where e-mails and patterns are stored.
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        let dirs = project_dirs().ok_or_else(|| anyhow!("Could not find data directory"))?;
        Ok(dirs.data_local_dir().join(DATA_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: GuiConfig = toml::from_str(
            r#"
            data_file = "/tmp/sounds.json"

            [detector]
            cooldown_ms = 8000
            "#,
        )
        .unwrap();
        assert_eq!(config.detector.cooldown_ms, 8000);
        assert_eq!(config.detector.tick_interval_ms, 16);
        assert_eq!(config.data_path().unwrap(), PathBuf::from("/tmp/sounds.json"));
    }

    #[test]
    fn empty_file_is_default() {
        let config: GuiConfig = toml::from_str("").unwrap();
        assert_eq!(config.detector, DetectorConfig::default());
        assert!(config.data_file.is_none());
    }
}
