//! Mock implementations for testing.
//!
//! Hand-written mocks of the transport and auth seams so client and
//! resilience behavior can be tested without a network.

use crate::auth::AuthManager;
use crate::errors::{SellingPartnerError, SellingPartnerResult};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use url::Url;

type ScriptedOutcome = Result<(StatusCode, Bytes), SellingPartnerError>;

/// Mock HTTP transport that plays back scripted outcomes in order and counts
/// how many times it was actually invoked.
pub struct MockHttpTransport {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    calls: AtomicU32,
}

impl MockHttpTransport {
    /// Create a new mock transport with no scripted outcomes
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: AtomicU32::new(0),
        }
    }

    /// Queue a successful response
    pub fn push_response(&self, status: StatusCode, body: impl Into<Bytes>) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok((status, body.into())));
    }

    /// Queue an error outcome
    pub fn push_error(&self, error: SellingPartnerError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    /// Number of times `send` was invoked
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(
        &self,
        _method: Method,
        url: Url,
        _headers: HeaderMap,
        _body: Option<Bytes>,
    ) -> SellingPartnerResult<Response<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(Ok((status, body))) => {
                Response::builder()
                    .status(status)
                    .body(body)
                    .map_err(|e| SellingPartnerError::Internal {
                        message: format!("Failed to build mock response: {}", e),
                    })
            }
            Some(Err(error)) => Err(error),
            None => Err(SellingPartnerError::Internal {
                message: format!("No mock outcome scripted for request to {}", url),
            }),
        }
    }
}

/// Mock auth manager with fixed headers
pub struct MockAuthManager {
    headers: HeaderMap,
    validation_result: Result<(), String>,
}

impl MockAuthManager {
    /// Create a new mock auth manager that validates successfully
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-access-token", "Atza|mock-token".parse().unwrap());
        Self {
            headers,
            validation_result: Ok(()),
        }
    }

    /// Create a mock auth manager that fails validation
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            headers: HeaderMap::new(),
            validation_result: Err(message.into()),
        }
    }
}

impl Default for MockAuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager for MockAuthManager {
    fn get_headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    fn validate_token(&self) -> Result<(), String> {
        self.validation_result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_transport_plays_back_in_order() {
        let transport = MockHttpTransport::new();
        transport.push_response(StatusCode::OK, &b"first"[..]);
        transport.push_error(SellingPartnerError::Network {
            message: "Connection failed".to_string(),
        });

        let url = Url::parse("https://sellingpartnerapi-na.amazon.com/test").unwrap();

        let first = tokio_test::block_on(transport.send(
            Method::GET,
            url.clone(),
            HeaderMap::new(),
            None,
        ));
        assert_eq!(&first.unwrap().body()[..], &b"first"[..]);

        let second =
            tokio_test::block_on(transport.send(Method::GET, url.clone(), HeaderMap::new(), None));
        assert!(matches!(second, Err(SellingPartnerError::Network { .. })));

        // Script exhausted
        let third = tokio_test::block_on(transport.send(Method::GET, url, HeaderMap::new(), None));
        assert!(third.is_err());
        assert_eq!(transport.call_count(), 3);
    }
}
