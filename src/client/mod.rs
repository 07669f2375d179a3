//! Client interface and implementation for the Selling Partner API.
//!
//! The client composes the transport, the auth manager and one shared circuit
//! breaker per endpoint: every request is routed through
//! [`CircuitBreaker::execute`], so a degrading endpoint is shed automatically.
//! Per-resource SP-API methods are built on top of the generic verb helpers.

use crate::auth::{AccessTokenAuthManager, AuthManager};
use crate::config::SellingPartnerConfig;
use crate::errors::{SellingPartnerError, SellingPartnerResult};
use crate::resilience::CircuitBreaker;
use crate::transport::{HttpTransport, ReqwestTransport};
use bytes::Bytes;
use http::{Method, Response};
use std::sync::Arc;
use url::Url;

/// Trait defining the main Selling Partner client interface
#[async_trait::async_trait]
pub trait SellingPartnerClient: Send + Sync {
    /// Send a request to an SP-API path through the circuit breaker
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> SellingPartnerResult<Response<Bytes>>;
}

/// Implementation of the Selling Partner client
pub struct SellingPartnerClientImpl {
    config: Arc<SellingPartnerConfig>,
    transport: Arc<dyn HttpTransport>,
    auth_manager: Arc<dyn AuthManager>,
    breaker: Arc<CircuitBreaker>,
}

impl SellingPartnerClientImpl {
    /// Create a new client from configuration
    pub fn new(config: SellingPartnerConfig) -> SellingPartnerResult<Self> {
        let config = Arc::new(config);

        let transport = Arc::new(ReqwestTransport::new(config.timeout)?) as Arc<dyn HttpTransport>;

        let auth_manager = Arc::new(AccessTokenAuthManager::new(config.access_token.clone()))
            as Arc<dyn AuthManager>;

        auth_manager
            .validate_token()
            .map_err(|e| SellingPartnerError::Configuration {
                message: format!("Invalid access token: {}", e),
            })?;

        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));

        Ok(Self {
            config,
            transport,
            auth_manager,
            breaker,
        })
    }

    /// Create a new client with custom transport and auth manager (for testing)
    #[cfg(test)]
    pub fn with_dependencies(
        config: SellingPartnerConfig,
        transport: Arc<dyn HttpTransport>,
        auth_manager: Arc<dyn AuthManager>,
    ) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker.clone()));
        Self {
            config: Arc::new(config),
            transport,
            auth_manager,
            breaker,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &SellingPartnerConfig {
        &self.config
    }

    /// Get the circuit breaker guarding this client's endpoint
    pub fn breaker(&self) -> Arc<CircuitBreaker> {
        self.breaker.clone()
    }

    /// Send a GET request to an SP-API path
    pub async fn get(&self, path: &str) -> SellingPartnerResult<Response<Bytes>> {
        self.send(Method::GET, path, None).await
    }

    /// Send a POST request with a JSON body to an SP-API path
    pub async fn post(&self, path: &str, body: Bytes) -> SellingPartnerResult<Response<Bytes>> {
        self.send(Method::POST, path, Some(body)).await
    }

    fn build_url(&self, path: &str) -> SellingPartnerResult<Url> {
        let base = Url::parse(&self.config.endpoint.base_url())?;
        base.join(path).map_err(SellingPartnerError::from)
    }
}

#[async_trait::async_trait]
impl SellingPartnerClient for SellingPartnerClientImpl {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> SellingPartnerResult<Response<Bytes>> {
        let url = self.build_url(path)?;
        let headers = self.auth_manager.get_headers();
        let transport = self.transport.clone();

        self.breaker
            .execute(|| async move { transport.send(method, url, headers, body).await })
            .await
    }
}

/// Create a new Selling Partner client from configuration
pub fn create_client(config: SellingPartnerConfig) -> SellingPartnerResult<SellingPartnerClientImpl> {
    SellingPartnerClientImpl::new(config)
}

/// Create a new Selling Partner client from environment variables
pub fn create_client_from_env() -> SellingPartnerResult<SellingPartnerClientImpl> {
    let config = SellingPartnerConfig::from_env()?;
    create_client(config)
}
