//! Single page fetch and the paginated fetcher

use super::stream::ItemStream;
use super::transport::Transport;
use crate::decode::{EnvelopeDecoder, Page};
use crate::error::Result;
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::form_urlencoded;

/// Number of items requested per page
pub const PAGE_SIZE: u16 = 100;

/// Build the request path for one page
///
/// A blank cursor is treated as no cursor. The cursor is form-encoded since
/// tokens are opaque and may contain `+`, `/` or `=`.
pub fn paginated_endpoint(endpoint: &str, page_size: u16, cursor: Option<&str>) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    let mut url = format!("{endpoint}{separator}limit={page_size}");

    if let Some(cursor) = cursor.filter(|c| !c.trim().is_empty()) {
        url.push_str("&cursor=");
        url.extend(form_urlencoded::byte_serialize(cursor.as_bytes()));
    }

    url
}

/// Fetches and decodes individual pages
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    decoder: EnvelopeDecoder,
}

impl PageFetcher {
    /// Create a page fetcher over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            decoder: EnvelopeDecoder::new(),
        }
    }

    /// Fetch the page of `endpoint` that starts at `cursor`
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        cursor: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Page<T>> {
        let url = paginated_endpoint(endpoint, PAGE_SIZE, cursor);
        let body = self.transport.get(&url, cancel).await?;
        let page: Page<T> = self.decoder.decode_page(&body)?;

        debug!(
            "Fetched page {}: {} items, more pages: {}",
            url,
            page.len(),
            page.has_next()
        );
        Ok(page)
    }

    /// Start fetching a page on the runtime without waiting for it
    pub(crate) fn spawn_page<T>(
        &self,
        endpoint: Arc<str>,
        cursor: Option<String>,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<Page<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let fetcher = self.clone();
        tokio::spawn(async move {
            fetcher
                .fetch_page(&endpoint, cursor.as_deref(), &cancel)
                .await
        })
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("page_size", &PAGE_SIZE)
            .finish_non_exhaustive()
    }
}

/// Streams every item behind a cursor-paginated endpoint
#[derive(Debug, Clone)]
pub struct PaginatedFetcher {
    pages: PageFetcher,
}

impl PaginatedFetcher {
    /// Create a paginated fetcher over a transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            pages: PageFetcher::new(transport),
        }
    }

    /// Stream all items of `endpoint`, starting from its first page
    ///
    /// The first page is requested immediately, before the stream is polled.
    /// Must be called from within a tokio runtime.
    pub fn fetch_items<T>(&self, endpoint: &str, cancel: &CancellationToken) -> ItemStream<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        ItemStream::start(self.pages.clone(), Arc::from(endpoint), cancel.clone())
    }

    /// Collect every item of `endpoint` into a vector
    pub async fn fetch_all<T>(&self, endpoint: &str, cancel: &CancellationToken) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.fetch_items(endpoint, cancel).try_collect().await
    }

    /// The underlying single-page fetcher
    pub fn pages(&self) -> &PageFetcher {
        &self.pages
    }
}
