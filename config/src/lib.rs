//! Optional configuration file for uidgraph.
//!
//! Read from `~/.uidgraph/config.toml`. A missing file means defaults: the
//! value set `{0, 1000}` and unbounded spawn retry.
//!
//! ```toml
//! [model]
//! values = [0, 1, 1000]
//!
//! [harness]
//! spawn_retry = "backoff"
//! max_attempts = 8
//! initial_delay_ms = 10
//! max_delay_ms = 1000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use uidgraph_harness::{BackoffConfig, SpawnRetry};
use uidgraph_types::{ValueSet, ValueSetError};

#[derive(Debug, Default, Deserialize)]
pub struct UidGraphConfig {
    pub model: Option<ModelConfig>,
    pub harness: Option<HarnessConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelConfig {
    /// Candidate uids, in enumeration order.
    pub values: Option<Vec<u32>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub spawn_retry: SpawnRetryMode,
    /// Backoff only. Failed attempts tolerated before the run aborts.
    pub max_attempts: Option<u32>,
    /// Backoff only. Delay before the first retry.
    pub initial_delay_ms: Option<u64>,
    /// Backoff only. Cap on any single delay.
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpawnRetryMode {
    #[default]
    Unbounded,
    Backoff,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid [model] values in config")]
    Invalid(#[from] ValueSetError),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path.as_path()),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl UidGraphConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".uidgraph").join("config.toml"))
}

/// Effective run settings after defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub values: ValueSet,
    pub spawn_retry: SpawnRetry,
}

impl Settings {
    pub fn resolve(config: Option<&UidGraphConfig>) -> Result<Self, ConfigError> {
        let Some(config) = config else {
            return Ok(Self::default());
        };

        let values = match config.model.as_ref().and_then(|m| m.values.as_ref()) {
            Some(values) => ValueSet::new(values.iter().copied())?,
            None => ValueSet::default(),
        };

        let spawn_retry = config
            .harness
            .as_ref()
            .map_or(SpawnRetry::Unbounded, HarnessConfig::spawn_retry);

        Ok(Self {
            values,
            spawn_retry,
        })
    }
}

impl HarnessConfig {
    fn spawn_retry(&self) -> SpawnRetry {
        match self.spawn_retry {
            SpawnRetryMode::Unbounded => SpawnRetry::Unbounded,
            SpawnRetryMode::Backoff => {
                let defaults = BackoffConfig::default();
                SpawnRetry::Backoff(BackoffConfig {
                    max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
                    initial_delay: self
                        .initial_delay_ms
                        .map_or(defaults.initial_delay, Duration::from_millis),
                    max_delay: self
                        .max_delay_ms
                        .map_or(defaults.max_delay, Duration::from_millis),
                })
            }
        }
    }
}
