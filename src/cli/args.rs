//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Schoology album mirroring CLI.
#[derive(Parser, Debug)]
#[command(
    name = "schoology-photos",
    version,
    about = "Download Schoology section albums for your children",
    long_about = "Walks every course section of each child linked to your Schoology account \
                  and downloads new album photos and videos into a local folder tree.\n\n\
                  Albums already downloaded are remembered in a state file and skipped on later runs."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to the sync state file.
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Root directory for downloaded photos.
    #[arg(short = 'd', long = "directory")]
    pub photos_directory: Option<PathBuf>,

    /// Schoology API consumer key.
    #[arg(long = "consumer-key", env = "SCHOOLOGY_API_CONSUMER_KEY", hide_env_values = true)]
    pub consumer_key: Option<String>,

    /// Schoology API consumer secret.
    #[arg(long = "consumer-secret", env = "SCHOOLOGY_API_CONSUMER_SECRET", hide_env_values = true)]
    pub consumer_secret: Option<String>,

    /// Schoology API base URL.
    #[arg(long = "api-base")]
    pub api_base: Option<String>,

    /// Connect and read-idle timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Hide download progress information.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(key) = self.consumer_key {
            config.credentials.consumer_key = key;
        }

        if let Some(secret) = self.consumer_secret {
            config.credentials.consumer_secret = secret;
        }

        if let Some(state) = self.state {
            config.options.state_file = state;
        }

        if let Some(dir) = self.photos_directory {
            config.options.photos_directory = dir;
        }

        if let Some(api_base) = self.api_base {
            config.options.api_base = api_base;
        }

        if let Some(timeout) = self.timeout {
            config.options.request_timeout_seconds = timeout;
        }

        if self.quiet {
            config.options.show_downloads = false;
        }
    }
}
