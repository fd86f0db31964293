//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::{Credentials, API_BASE, DEFAULT_TIMEOUT_SECS};
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Schoology API consumer credentials.
///
/// Usually supplied through `SCHOOLOGY_API_CONSUMER_KEY` and
/// `SCHOOLOGY_API_CONSUMER_SECRET` rather than written to the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub consumer_key: String,

    #[serde(default)]
    pub consumer_secret: String,
}

/// Sync options configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsConfig {
    /// Root of the downloaded photo tree.
    #[serde(default = "default_photos_directory")]
    pub photos_directory: PathBuf,

    /// JSON file recording which albums were already downloaded.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Schoology API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Connect and read-idle timeout, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Whether to show per-album download progress.
    #[serde(default = "default_true")]
    pub show_downloads: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            photos_directory: default_photos_directory(),
            state_file: default_state_file(),
            api_base: default_api_base(),
            request_timeout_seconds: default_request_timeout(),
            show_downloads: true,
        }
    }
}

fn default_photos_directory() -> PathBuf {
    PathBuf::from("photos")
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".config.json")
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Credentials to hand to the API client.
    pub fn api_credentials(&self) -> Credentials {
        Credentials::new(
            self.credentials.consumer_key.clone(),
            self.credentials.consumer_secret.clone(),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.options.request_timeout_seconds)
    }
}
