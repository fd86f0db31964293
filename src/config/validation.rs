//! Configuration validation logic.

use regex::Regex;
use url::Url;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_credential("consumer_key", &config.credentials.consumer_key)?;
    validate_credential("consumer_secret", &config.credentials.consumer_secret)?;
    validate_api_base(&config.options.api_base)?;
    validate_timeout(config.options.request_timeout_seconds)?;

    Ok(())
}

/// Validate a consumer key or secret.
pub fn validate_credential(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::MissingConfig(format!(
            "{} (set SCHOOLOGY_API_{} or add it to the config file)",
            field,
            field.to_uppercase()
        )));
    }

    let lower = value.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_") {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Value appears to be a placeholder. Use the key and secret from your Schoology API page."
                .to_string(),
        });
    }

    // Schoology issues hex keys and secrets.
    let pattern = Regex::new(r"^[A-Za-z0-9]+$").expect("static regex");
    if !pattern.is_match(value) {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Value must be alphanumeric (check for stray quotes or whitespace)"
                .to_string(),
        });
    }

    Ok(())
}

/// Validate the API base URL.
pub fn validate_api_base(api_base: &str) -> Result<()> {
    let url = Url::parse(api_base)?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(Error::ConfigValidation {
            field: "api_base".to_string(),
            message: format!("Unsupported URL scheme '{}'", url.scheme()),
        });
    }

    Ok(())
}

/// Validate the request timeout.
pub fn validate_timeout(seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(Error::ConfigValidation {
            field: "request_timeout_seconds".to_string(),
            message: "Timeout must be at least 1 second".to_string(),
        });
    }

    Ok(())
}
