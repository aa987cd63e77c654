//! Run configuration
//!
//! Everything except `alpha` and `beta` has a default, so a YAML file only
//! needs the keys it wants to change:
//!
//! ```yaml
//! engine:
//!   base_iteration_bound: 50
//!   parallel: true
//! parse:
//!   strict_tokens: true
//! format: csv
//! ```

use crate::graph::ParseOptions;
use crate::output::OutputFormat;
use decirank_algorithms::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine tuning, input parsing and output format for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub engine: EngineConfig,
    pub parse: ParseOptions,
    pub format: OutputFormat,
}

impl RankConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: RankConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Reading config from {:?}", path);
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
