//! Non-paginated envelope fetch

use super::transport::Transport;
use crate::decode::EnvelopeDecoder;
use crate::error::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fetches endpoints that answer with a single `data` payload
#[derive(Clone)]
pub struct NonPaginatedFetcher {
    transport: Arc<dyn Transport>,
    decoder: EnvelopeDecoder,
}

impl NonPaginatedFetcher {
    /// Create a fetcher over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            decoder: EnvelopeDecoder::new(),
        }
    }

    /// Fetch `endpoint` and unwrap its payload, `None` when `data` is absent
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let body = self.transport.get(endpoint, cancel).await?;
        self.decoder.decode_data(&body)
    }
}

impl std::fmt::Debug for NonPaginatedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonPaginatedFetcher").finish_non_exhaustive()
    }
}
