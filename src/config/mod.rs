//! Configuration module for schoology-photos.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - CLI argument and environment merging
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, CredentialsConfig, OptionsConfig};
pub use validation::validate_config;
