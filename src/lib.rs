//! # Amazon Selling Partner API Client Core
//!
//! Production-ready Rust client core for the Amazon Selling Partner API
//! (SP-API).
//!
//! ## Features
//!
//! - Circuit breaker protection: requests to a degrading endpoint are shed
//!   automatically and recovery is probed after a cooldown
//! - Generic verb helpers routed through the breaker, ready for per-resource
//!   SP-API methods to be layered on top
//! - Regional endpoint selection (NA / EU / FE, plus sandbox hosts)
//! - Secure credential handling with `SecretString`
//! - Rich error taxonomy with a distinct circuit-open rejection sentinel
//!
//! LWA token refresh and AWS SigV4 signing are out of scope: the access token
//! is supplied by the caller's credential provider.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_selling_partner::{create_client, SellingPartnerConfig};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SellingPartnerConfig::builder()
//!         .access_token(SecretString::new("Atza|...".to_string()))
//!         .build()?;
//!
//!     let client = create_client(config)?;
//!
//!     // Or create from environment variables
//!     // let client = create_client_from_env()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Main client interface and factory functions
//! - `config` - Configuration types and builder
//! - `auth` - Authentication header management
//! - `transport` - HTTP transport layer
//! - `resilience` - Circuit breaker guarding the endpoint
//! - `errors` - Error types and taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod resilience;
pub mod transport;

// Development/testing modules
#[cfg(test)]
pub mod mocks;

// Re-exports for convenience
pub use auth::{AccessTokenAuthManager, AuthManager};
pub use client::{
    create_client, create_client_from_env, SellingPartnerClient, SellingPartnerClientImpl,
};
pub use config::{Endpoint, SellingPartnerConfig, SellingPartnerConfigBuilder};
pub use errors::{SellingPartnerError, SellingPartnerResult};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerHook, CircuitState};
pub use transport::{HttpTransport, ReqwestTransport};

/// The default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The default consecutive-failure threshold before the circuit trips open
pub const DEFAULT_MAX_FAILURES: u32 = 5;

/// The default minimum open-state duration in seconds before a probe is admitted
pub const DEFAULT_OPEN_TIMEOUT_SECS: u64 = 60;
