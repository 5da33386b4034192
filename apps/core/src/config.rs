use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR_NAME: &str = "keylaunch";
const CONFIG_FILE_NAME: &str = "config.toml";
const COUNTS_FILE_NAME: &str = "launch-counts.conf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descriptor directories, scanned in this order.
    pub app_dirs: Vec<PathBuf>,
    pub counts_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
    pub log_dir: PathBuf,
    pub tick_interval_ms: u64,
    pub blink_interval_ms: u64,
    pub working_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let config_base = stable_app_config_dir();
        Self {
            app_dirs: vec![
                PathBuf::from("/usr/share/applications"),
                PathBuf::from("/usr/local/share/applications"),
                data_home().join("applications"),
            ],
            counts_path: config_base.join(COUNTS_FILE_NAME),
            config_path: config_base.join(CONFIG_FILE_NAME),
            log_dir: stable_app_data_dir().join("logs"),
            tick_interval_ms: 10,
            blink_interval_ms: 700,
            working_dir: home_dir(),
        }
    }
}

pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

fn data_home() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
}

fn config_home() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
}

pub fn stable_app_config_dir() -> PathBuf {
    config_home().join(APP_DIR_NAME)
}

pub fn stable_app_data_dir() -> PathBuf {
    data_home().join(APP_DIR_NAME)
}

/// Loads the config at `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| stable_app_config_dir().join(CONFIG_FILE_NAME));

    let mut config = match fs::read_to_string(&config_path) {
        Ok(contents) => parse(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };
    config.config_path = config_path;
    validate(&config)?;
    Ok(config)
}

pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    let encoded = toml::to_string_pretty(config)?;
    if let Some(parent) = config.config_path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: config.config_path.clone(),
            source,
        })?;
    }
    fs::write(&config.config_path, encoded).map_err(|source| ConfigError::Write {
        path: config.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(1..=100).contains(&cfg.tick_interval_ms) {
        return Err(ConfigError::Invalid(
            "tick_interval_ms must be between 1 and 100".into(),
        ));
    }

    if !(100..=5000).contains(&cfg.blink_interval_ms) {
        return Err(ConfigError::Invalid(
            "blink_interval_ms must be between 100 and 5000".into(),
        ));
    }

    if cfg.blink_interval_ms <= cfg.tick_interval_ms {
        return Err(ConfigError::Invalid(
            "blink_interval_ms must exceed tick_interval_ms".into(),
        ));
    }

    if cfg.counts_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("counts_path is required".into()));
    }

    Ok(())
}
