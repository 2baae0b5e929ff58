//! The transport contract

use crate::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Performs a GET for an endpoint and returns the raw response body
///
/// Implementations own authentication, retries, timeouts and rate limiting.
/// The fetchers treat every error from here as opaque and pass it through
/// unchanged.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body for `endpoint`, a path relative to the API root that may
    /// carry a query string
    async fn get(&self, endpoint: &str, cancel: &CancellationToken) -> Result<String>;
}
