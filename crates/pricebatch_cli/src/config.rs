//! Optional RON configuration file for the CLI.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command-line flags override whatever the file sets.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use batch_logging::batch_info;
use pricebatch_engine::{DispatchSettings, EngineSettings, PredictSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api_base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub output_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        let predict = PredictSettings::default();
        Self {
            api_base_url: predict.api_base_url,
            connect_timeout_secs: predict.connect_timeout.as_secs(),
            request_timeout_secs: predict.request_timeout.as_secs(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        batch_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            predict: PredictSettings {
                api_base_url: self.api_base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            dispatch: DispatchSettings::default(),
        }
    }
}
