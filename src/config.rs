// config.rs

//! Client configuration, read from `~/.config/cool-crazy-app/client.yml`.

use color_eyre::eyre::{eyre, Result};
use log::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4443";
const FILE_NAME: &str = "client.yml";
const CONFIG_DIR: &str = ".config";
const APP_CONFIG_DIR: &str = env!("CARGO_PKG_NAME");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base url of the backend serving `/api/config`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl ClientConfig {
    /// Returns the path of the config file in the user's home directory.
    pub fn default_path() -> Result<PathBuf> {
        match dirs::home_dir() {
            Some(home) => Ok(home.join(CONFIG_DIR).join(APP_CONFIG_DIR).join(FILE_NAME)),
            None => Err(eyre!("No $HOME directory found for client config")),
        }
    }

    /// Loads the config from `path`, or from the default path if `None`.
    /// A missing file gives the default config.
    pub fn load(path: Option<&Path>) -> Result<ClientConfig> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            debug!(
                "No config file at {}, using endpoint {}",
                path.display(),
                DEFAULT_ENDPOINT
            );
            return Ok(ClientConfig::default());
        }
        let config_string = fs::read_to_string(&path)?;
        let config: ClientConfig = serde_yaml::from_str(&config_string)
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replaces the endpoint if `endpoint` is given.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }
}
