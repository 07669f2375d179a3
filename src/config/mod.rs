//! Configuration types for the Selling Partner API client.

use crate::errors::{SellingPartnerError, SellingPartnerResult};
use crate::resilience::CircuitBreakerConfig;
use crate::DEFAULT_TIMEOUT_SECS;
use secrecy::SecretString;
use std::time::Duration;

/// Regional SP-API endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// North America (US, CA, MX, BR marketplaces)
    NorthAmerica,
    /// Europe (EU, UK, IN, AE, and related marketplaces)
    Europe,
    /// Far East (JP, AU, SG marketplaces)
    FarEast,
    /// Custom endpoint (e.g. a sandbox host)
    Custom(String),
}

impl Endpoint {
    /// Returns the base URL for this endpoint
    pub fn base_url(&self) -> String {
        match self {
            Endpoint::NorthAmerica => "https://sellingpartnerapi-na.amazon.com".to_string(),
            Endpoint::Europe => "https://sellingpartnerapi-eu.amazon.com".to_string(),
            Endpoint::FarEast => "https://sellingpartnerapi-fe.amazon.com".to_string(),
            Endpoint::Custom(url) => url.clone(),
        }
    }

    /// Parses an endpoint from its short region code or a full URL
    pub fn parse(s: &str) -> Self {
        match s {
            "na" => Endpoint::NorthAmerica,
            "eu" => Endpoint::Europe,
            "fe" => Endpoint::FarEast,
            other => Endpoint::Custom(other.to_string()),
        }
    }
}

/// Configuration for the Selling Partner API client.
#[derive(Clone)]
pub struct SellingPartnerConfig {
    /// LWA access token for authentication, supplied by the caller's
    /// credential provider (this crate does not refresh it)
    pub access_token: SecretString,
    /// Regional endpoint to call
    pub endpoint: Endpoint,
    /// Request timeout
    pub timeout: Duration,
    /// Circuit breaker settings guarding the endpoint
    pub breaker: CircuitBreakerConfig,
}

impl SellingPartnerConfig {
    /// Creates a new configuration builder
    pub fn builder() -> SellingPartnerConfigBuilder {
        SellingPartnerConfigBuilder::default()
    }

    /// Creates a configuration from environment variables
    pub fn from_env() -> SellingPartnerResult<Self> {
        let access_token = std::env::var("SPAPI_ACCESS_TOKEN").map_err(|_| {
            SellingPartnerError::Configuration {
                message: "SPAPI_ACCESS_TOKEN environment variable not set".to_string(),
            }
        })?;

        let endpoint = std::env::var("SPAPI_ENDPOINT")
            .map(|s| Endpoint::parse(&s))
            .unwrap_or(Endpoint::NorthAmerica);

        let timeout_secs = std::env::var("SPAPI_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            access_token: SecretString::new(access_token),
            endpoint,
            timeout: Duration::from_secs(timeout_secs),
            breaker: CircuitBreakerConfig::default(),
        })
    }
}

/// Builder for SellingPartnerConfig
#[derive(Default)]
pub struct SellingPartnerConfigBuilder {
    access_token: Option<SecretString>,
    endpoint: Option<Endpoint>,
    timeout: Option<Duration>,
    breaker: Option<CircuitBreakerConfig>,
}

impl SellingPartnerConfigBuilder {
    /// Sets the access token
    pub fn access_token(mut self, access_token: SecretString) -> Self {
        self.access_token = Some(access_token);
        self
    }

    /// Sets the regional endpoint
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the circuit breaker configuration
    pub fn breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Builds the configuration
    pub fn build(self) -> SellingPartnerResult<SellingPartnerConfig> {
        let access_token =
            self.access_token
                .ok_or_else(|| SellingPartnerError::Configuration {
                    message: "Access token is required".to_string(),
                })?;

        Ok(SellingPartnerConfig {
            access_token,
            endpoint: self.endpoint.unwrap_or(Endpoint::NorthAmerica),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            breaker: self.breaker.unwrap_or_default(),
        })
    }
}
