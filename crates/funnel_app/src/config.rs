//! Optional `ron` configuration for the command-line driver.

use std::fs;
use std::path::{Path, PathBuf};

use funnel_engine::{EngineConfig, NormalizerSettings, DEFAULT_STORE_KEY};
use funnel_logging::LogDestination;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "./funnel.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store_dir: PathBuf,
    pub store_key: String,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
    pub log: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let normalizer = NormalizerSettings::default();
        Self {
            store_dir: PathBuf::from("./funnel_store"),
            store_key: DEFAULT_STORE_KEY.to_string(),
            max_width: normalizer.max_width,
            max_height: normalizer.max_height,
            jpeg_quality: normalizer.jpeg_quality,
            log: LogDestination::default().to_string(),
        }
    }
}

impl AppConfig {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default_with_store(self.store_dir.clone());
        config.store_key = self.store_key.clone();
        config.normalizer = NormalizerSettings {
            max_width: self.max_width,
            max_height: self.max_height,
            jpeg_quality: self.jpeg_quality,
        };
        config
    }

    /// Falls back to the terminal when the configured name is unknown.
    pub fn log_destination(&self) -> LogDestination {
        self.log.parse().unwrap_or_default()
    }
}

/// A loaded config plus anything worth warning about once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<String>,
}

/// Reads `path`, or [`DEFAULT_CONFIG_FILE`] when none is given.
///
/// A missing default file is silent; every other problem yields defaults and
/// a warning.
pub fn load(path: Option<&Path>) -> LoadedConfig {
    let explicit = path.is_some();
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
    let mut warnings = Vec::new();

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            return LoadedConfig {
                config: AppConfig::default(),
                warnings,
            };
        }
        Err(err) => {
            warnings.push(format!("Failed to read config {:?}: {}", path, err));
            return LoadedConfig {
                config: AppConfig::default(),
                warnings,
            };
        }
    };

    let config = match ron::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            warnings.push(format!("Failed to parse config {:?}: {}", path, err));
            AppConfig::default()
        }
    };
    if config.log.parse::<LogDestination>().is_err() {
        warnings.push(format!(
            "Unknown log destination {:?} in {:?}; using terminal",
            config.log, path
        ));
    }

    LoadedConfig { config, warnings }
}
