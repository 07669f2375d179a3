//! HTTP transport implementations.

use crate::errors::{SellingPartnerError, SellingPartnerResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, Response, StatusCode};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// One error entry in an SP-API error response body
#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    message: String,
}

/// SP-API error response envelope: `{"errors": [{"code", "message", ...}]}`
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    errors: Vec<ApiError>,
}

/// Extracts the first error message from an SP-API error body, falling back
/// to the raw body when it is not the documented envelope.
fn error_message(body: &Bytes) -> String {
    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let first = &parsed.errors[0];
            format!("{}: {}", first.code, first.message)
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

/// HTTP transport trait for making requests to the Selling Partner API.
///
/// The circuit breaker and client treat this as an opaque fallible operation;
/// nothing above this layer inspects the wire exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and return the response body
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> SellingPartnerResult<Response<Bytes>>;
}

/// Reqwest-based HTTP transport implementation
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport with the given request timeout
    pub fn new(timeout: Duration) -> SellingPartnerResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            SellingPartnerError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            }
        })?;

        Ok(Self { client })
    }

    fn to_reqwest_method(&self, method: Method) -> reqwest::Method {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::DELETE => reqwest::Method::DELETE,
            Method::PATCH => reqwest::Method::PATCH,
            _ => reqwest::Method::GET,
        }
    }

    fn to_reqwest_headers(&self, headers: HeaderMap) -> reqwest::header::HeaderMap {
        let mut reqwest_headers = reqwest::header::HeaderMap::new();
        for (name, value) in headers.iter() {
            if let Ok(header_name) =
                reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes())
            {
                if let Ok(header_value) = reqwest::header::HeaderValue::from_bytes(value.as_bytes())
                {
                    reqwest_headers.insert(header_name, header_value);
                }
            }
        }
        reqwest_headers
    }

    fn map_http_error(
        &self,
        status: reqwest::StatusCode,
        headers: &reqwest::header::HeaderMap,
        body: &Bytes,
    ) -> SellingPartnerError {
        let body_str = error_message(body);

        match status.as_u16() {
            401 | 403 => SellingPartnerError::Authentication {
                message: format!("Authentication failed: {}", body_str),
            },
            429 => {
                let retry_after = headers
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .map(Duration::from_secs);
                SellingPartnerError::RateLimit {
                    message: format!("Rate limit exceeded: {}", body_str),
                    retry_after,
                }
            }
            404 => SellingPartnerError::NotFound {
                message: body_str.to_string(),
                resource_type: "resource".to_string(),
            },
            400 => SellingPartnerError::Validation {
                message: format!("Validation error: {}", body_str),
            },
            500..=599 => SellingPartnerError::Server {
                message: format!("Server error: {}", body_str),
                status_code: Some(status.as_u16()),
            },
            _ => SellingPartnerError::Internal {
                message: format!("HTTP error {}: {}", status.as_u16(), body_str),
            },
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> SellingPartnerResult<Response<Bytes>> {
        let reqwest_method = self.to_reqwest_method(method);
        let reqwest_headers = self.to_reqwest_headers(headers);

        tracing::debug!(method = %reqwest_method, url = %url, "sending SP-API request");

        let mut request = self
            .client
            .request(reqwest_method, url.as_str())
            .headers(reqwest_headers);

        if let Some(body_data) = body {
            request = request.body(body_data.to_vec());
        }

        let response = request.send().await?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let body_bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(self.map_http_error(status, &response_headers, &body_bytes));
        }

        let mut http_response = Response::builder().status(
            StatusCode::from_u16(status.as_u16()).map_err(|e| SellingPartnerError::Internal {
                message: format!("Invalid status code: {}", e),
            })?,
        );

        for (name, value) in response_headers.iter() {
            http_response = http_response.header(name.as_str(), value.as_bytes());
        }

        let response =
            http_response
                .body(body_bytes)
                .map_err(|e| SellingPartnerError::Internal {
                    message: format!("Failed to build response: {}", e),
                })?;

        Ok(response)
    }
}
