//! Lookup error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while resolving a barcode.
///
/// `NotFound` is an expected outcome; every other variant except
/// `EmptyBarcode` is a network-class failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    /// The decoded payload was empty
    #[error("Barcode is empty")]
    EmptyBarcode,
    /// The database answered but has no product for this barcode
    #[error("No product found for barcode {0}")]
    NotFound(String),
    /// The request did not complete within the configured timeout
    #[error("Lookup timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Transport(String),
    /// Non-success HTTP status
    #[error("Product database returned status {0}")]
    Status(u16),
    /// The body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedBody(String),
}

impl LookupError {
    /// True for failures caused by the network or the remote service.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            LookupError::Timeout(_)
                | LookupError::Transport(_)
                | LookupError::Status(_)
                | LookupError::MalformedBody(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}
