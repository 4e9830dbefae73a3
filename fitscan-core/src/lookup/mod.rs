//! Barcode-to-product lookup.
//!
//! [`ProductLookupClient`] talks to a Nutritionix-compatible item search
//! endpoint. The [`ProductSource`] trait lets scan sessions run against any
//! lookup implementation, including in-memory fakes.

mod client;
mod error;

use std::future::Future;

pub use client::{LookupConfig, ProductLookupClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use error::LookupError;

use crate::models::Product;

/// Resolves a barcode payload into a product.
pub trait ProductSource: Send + Sync {
    fn lookup(&self, barcode: &str) -> impl Future<Output = Result<Product, LookupError>> + Send;
}
