//! Error types for the Selling Partner API client.

mod error;

pub use error::{SellingPartnerError, SellingPartnerResult};
