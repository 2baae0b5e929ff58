//! Pipelined item stream over a cursor chain

use super::paginated::PageFetcher;
use crate::decode::Page;
use crate::error::{Error, Result};
use futures::{ready, Stream};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type PageTask<T> = JoinHandle<Result<Page<T>>>;

/// Where the stream is in the page chain
enum ChainState<T> {
    /// Waiting on a page request that is already in flight
    Fetching(PageTask<T>),
    /// Handing out a page's items; the next page may already be in flight
    Yielding {
        items: std::vec::IntoIter<T>,
        next: Option<PageTask<T>>,
    },
    /// Chain exhausted, faulted or cancelled
    Done,
}

/// Ordered stream of every item behind a paginated endpoint
///
/// Yields `Ok` items in page order, then ends. A failed page or a triggered
/// cancellation token produces a single `Err` after the items already yielded,
/// and the stream ends there. Page requests that are already in flight when
/// the stream ends are left to finish and their results discarded.
///
/// Cancellation is cooperative: the token is checked before each item and
/// before waiting on a page, but an in-flight page is still awaited, so a
/// transport that ignores the token delays the `Cancelled` error until its
/// request completes.
pub struct ItemStream<T> {
    fetcher: PageFetcher,
    endpoint: Arc<str>,
    cancel: CancellationToken,
    state: ChainState<T>,
    pages: usize,
}

// The state never hands out pinned references to its fields; `JoinHandle` is
// `Unpin` and items are moved out by value.
impl<T> Unpin for ItemStream<T> {}

impl<T> ItemStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn start(fetcher: PageFetcher, endpoint: Arc<str>, cancel: CancellationToken) -> Self {
        let first = fetcher.spawn_page(Arc::clone(&endpoint), None, cancel.clone());
        Self {
            fetcher,
            endpoint,
            cancel,
            state: ChainState::Fetching(first),
            pages: 0,
        }
    }

    /// Number of pages received so far
    pub fn pages_received(&self) -> usize {
        self.pages
    }

    /// The endpoint this stream walks
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn fail(&mut self, err: Error) -> Poll<Option<Result<T>>> {
        debug!(
            "Item stream for {} stopped after {} pages: {}",
            self.endpoint, self.pages, err
        );
        self.state = ChainState::Done;
        Poll::Ready(Some(Err(err)))
    }
}

impl<T> Stream for ItemStream<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                ChainState::Done => return Poll::Ready(None),

                ChainState::Fetching(task) => {
                    if this.cancel.is_cancelled() {
                        return this.fail(Error::Cancelled);
                    }

                    let page = match ready!(Pin::new(task).poll(cx)) {
                        Ok(Ok(page)) => page,
                        Ok(Err(err)) => return this.fail(err),
                        Err(join_err) => {
                            return this.fail(Error::Task {
                                message: join_err.to_string(),
                            })
                        }
                    };
                    this.pages += 1;

                    // Request the next page before handing out any item of this one.
                    let next = page.next_cursor.map(|cursor| {
                        this.fetcher.spawn_page(
                            Arc::clone(&this.endpoint),
                            Some(cursor),
                            this.cancel.clone(),
                        )
                    });

                    this.state = ChainState::Yielding {
                        items: page.items.into_iter(),
                        next,
                    };
                }

                ChainState::Yielding { items, next } => {
                    if this.cancel.is_cancelled() {
                        return this.fail(Error::Cancelled);
                    }

                    if let Some(item) = items.next() {
                        return Poll::Ready(Some(Ok(item)));
                    }

                    this.state = match next.take() {
                        Some(task) => ChainState::Fetching(task),
                        None => {
                            debug!(
                                "Item stream for {} finished after {} pages",
                                this.endpoint, this.pages
                            );
                            ChainState::Done
                        }
                    };
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            ChainState::Done => (0, Some(0)),
            ChainState::Fetching(_) => (0, None),
            ChainState::Yielding { items, next } => {
                let upper = if next.is_some() { None } else { Some(items.len()) };
                (items.len(), upper)
            }
        }
    }
}

impl<T> std::fmt::Debug for ItemStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            ChainState::Fetching(_) => "fetching",
            ChainState::Yielding { .. } => "yielding",
            ChainState::Done => "done",
        };
        f.debug_struct("ItemStream")
            .field("endpoint", &self.endpoint)
            .field("pages", &self.pages)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
