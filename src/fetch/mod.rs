//! Page fetching and pipelined pagination
//!
//! # Overview
//!
//! - [`Transport`] - the narrow fetch contract the core depends on
//! - [`PageFetcher`] - one decoded page for an endpoint and optional cursor
//! - [`PaginatedFetcher`] / [`ItemStream`] - the whole cursor chain as one
//!   ordered, lazy stream of items
//! - [`NonPaginatedFetcher`] - unwraps a single `data` payload
//!
//! Pages are requested as `GET <endpoint>?limit=100[&cursor=<token>]`. The
//! first page is requested as soon as a stream is created, and each following
//! page is requested as soon as its predecessor arrives, so the next round
//! trip overlaps with the consumer working through the current page. Items
//! still come out strictly in page order.

mod paginated;
mod single;
mod stream;
mod transport;

pub use paginated::{paginated_endpoint, PageFetcher, PaginatedFetcher, PAGE_SIZE};
pub use single::NonPaginatedFetcher;
pub use stream::ItemStream;
pub use transport::Transport;

#[cfg(test)]
mod tests;
