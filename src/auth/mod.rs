//! Authentication header management for the Selling Partner API.
//!
//! The SP-API authenticates with an LWA access token carried in the
//! `x-amz-access-token` header. Token acquisition and refresh are the
//! caller's responsibility; this module only injects the headers.

use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

/// Trait for managing authentication headers
pub trait AuthManager: Send + Sync {
    /// Get the authentication headers for a request
    fn get_headers(&self) -> HeaderMap;

    /// Validate the access token format
    fn validate_token(&self) -> Result<(), String>;
}

/// Access-token authentication manager for SP-API requests
pub struct AccessTokenAuthManager {
    access_token: SecretString,
}

impl AccessTokenAuthManager {
    /// Create a new access-token authentication manager
    pub fn new(access_token: SecretString) -> Self {
        Self { access_token }
    }
}

impl AuthManager for AccessTokenAuthManager {
    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = self.access_token.expose_secret().parse() {
            headers.insert("x-amz-access-token", value);
        }

        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert(
            "user-agent",
            concat!("integrations-selling-partner/", env!("CARGO_PKG_VERSION"))
                .parse()
                .unwrap(),
        );

        headers
    }

    fn validate_token(&self) -> Result<(), String> {
        let token = self.access_token.expose_secret();
        if token.is_empty() {
            return Err("Access token must not be empty".to_string());
        }
        if token.chars().any(|c| c.is_control() || c == '\n') {
            return Err("Access token contains invalid characters".to_string());
        }
        Ok(())
    }
}
