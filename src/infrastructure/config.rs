use std::path::{Path, PathBuf};

use config::ConfigError;
use serde::Deserialize;

use crate::utils;

const CONFIG: &str = include_str!("../../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub _data_dir: PathBuf,
    #[serde(default)]
    pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CounterConfig {
    /// Milliseconds between timer ticks
    pub tick_rate_ms: u64,
    /// Stop after this many ticks; 0 runs until interrupted
    pub max_ticks: u64,
    pub step: i64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 1000,
            max_ticks: 10,
            step: 1,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub counter: CounterConfig,
}

impl Config {
    /// Load the embedded defaults layered with files from the config directory
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(&utils::get_config_dir(), &utils::get_data_dir())
    }

    pub fn load_from(config_dir: &Path, data_dir: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::embedded()?;
        let mut builder = config::Config::builder()
            .set_default("_data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("_config_dir", config_dir.to_string_lossy().as_ref())?
            .set_default("counter.tick_rate_ms", defaults.counter.tick_rate_ms)?
            .set_default("counter.max_ticks", defaults.counter.max_ticks)?
            .set_default("counter.step", defaults.counter.step)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults shipped with the binary
    pub fn embedded() -> Result<Self, ConfigError> {
        json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.counter.tick_rate_ms == 0 {
            return Err(ConfigError::Message(String::from(
                "counter.tick_rate_ms must be greater than zero",
            )));
        }
        Ok(())
    }
}
