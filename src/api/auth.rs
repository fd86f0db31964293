//! Authentication and request signing utilities.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random nonce sent with every request.
const NONCE_LENGTH: usize = 8;

/// Two-legged OAuth consumer credentials.
#[derive(Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

/// Generate a random alphanumeric nonce.
pub fn generate_nonce(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Build the OAuth 1.0 PLAINTEXT authorization header value.
///
/// Schoology accepts PLAINTEXT signatures over TLS, so the signature is simply
/// the consumer secret followed by `&` (there is no token secret).
pub fn build_authorization_header(credentials: &Credentials, timestamp: u64, nonce: &str) -> String {
    format!(
        "OAuth realm=\"Schoology%20API\",oauth_consumer_key=\"{}\",oauth_signature_method=\"PLAINTEXT\",oauth_timestamp=\"{}\",oauth_nonce=\"{}\",oauth_version=\"1.0\",oauth_signature=\"{}&\"",
        credentials.consumer_key, timestamp, nonce, credentials.consumer_secret
    )
}

/// Build a fresh authorization header for a single request.
pub fn fresh_authorization_header(credentials: &Credentials) -> String {
    build_authorization_header(credentials, unix_timestamp(), &generate_nonce(NONCE_LENGTH))
}
