//! Error types for the Selling Partner API client.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Selling Partner operations
pub type SellingPartnerResult<T> = Result<T, SellingPartnerError>;

/// Main error type for the Selling Partner API client.
///
/// This enum covers all possible error scenarios with rich context for debugging
/// and proper retry handling.
#[derive(Error, Debug, Clone)]
pub enum SellingPartnerError {
    /// Configuration error (invalid settings, missing required fields)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Authentication error (invalid access token, missing credentials)
    #[error("Authentication error: {message}")]
    Authentication {
        /// Error message describing the authentication issue
        message: String,
    },

    /// Validation error (invalid request parameters, constraints violated)
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue
        message: String,
    },

    /// Rate limit error (request quota exceeded)
    #[error("Rate limit error: {message}")]
    RateLimit {
        /// Error message describing the rate limit issue
        message: String,
        /// Duration to wait before retrying (if provided by the API)
        retry_after: Option<Duration>,
    },

    /// Network error (connection failed, timeout, DNS issues)
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// Server error (5xx responses from the SP-API)
    #[error("Server error: {message}")]
    Server {
        /// Error message from the server
        message: String,
        /// HTTP status code
        status_code: Option<u16>,
    },

    /// Resource not found error
    #[error("Not found: {resource_type} {message}")]
    NotFound {
        /// Error message
        message: String,
        /// Type of resource that was not found
        resource_type: String,
    },

    /// Request rejected by an open circuit breaker.
    ///
    /// Signals "not attempted", not "attempted and failed": the wrapped
    /// operation was never invoked. Callers should back off rather than retry
    /// immediately. A unit variant, so the rejection path allocates nothing.
    #[error("circuit open: request rejected without execution")]
    CircuitOpen,

    /// Internal error (unexpected conditions, library bugs)
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
    },
}

impl SellingPartnerError {
    /// Returns true if this error is retryable with exponential backoff.
    ///
    /// Retryable errors include:
    /// - Rate limit errors (429)
    /// - Network errors (connection issues, timeouts)
    /// - Server errors (5xx)
    ///
    /// `CircuitOpen` is deliberately not retryable: the breaker is already
    /// protecting the downstream dependency.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SellingPartnerError::RateLimit { .. }
                | SellingPartnerError::Network { .. }
                | SellingPartnerError::Server { .. }
        )
    }

    /// Returns true if this is the circuit-open rejection sentinel.
    ///
    /// Lets callers distinguish "the breaker is protecting you" from "the
    /// call itself failed".
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, SellingPartnerError::CircuitOpen)
    }

    /// Returns the retry-after duration if available.
    ///
    /// This is typically set in rate limit errors when the API provides
    /// a Retry-After header.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SellingPartnerError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

// Conversions from common error types
impl From<reqwest::Error> for SellingPartnerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SellingPartnerError::Network {
                message: format!("Request timed out: {}", err),
            }
        } else if err.is_connect() {
            SellingPartnerError::Network {
                message: format!("Connection failed: {}", err),
            }
        } else {
            SellingPartnerError::Network {
                message: format!("Network error: {}", err),
            }
        }
    }
}

impl From<serde_json::Error> for SellingPartnerError {
    fn from(err: serde_json::Error) -> Self {
        SellingPartnerError::Internal {
            message: format!("JSON serialization/deserialization error: {}", err),
        }
    }
}

impl From<url::ParseError> for SellingPartnerError {
    fn from(err: url::ParseError) -> Self {
        SellingPartnerError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
