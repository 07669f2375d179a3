//! HTTP transport layer for the Selling Partner API.

mod http_transport;

pub use http_transport::{HttpTransport, ReqwestTransport};
