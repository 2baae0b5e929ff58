// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # fivetran-fetch
//!
//! Client-side data access for the Fivetran REST API.
//!
//! ## Features
//!
//! - **Pipelined Pagination**: Walks `next_cursor` chains as one ordered item
//!   stream while the next page is already in flight
//! - **Envelope Decoding**: Unwraps `{ code, data: { items, next_cursor } }`
//!   responses with forgiving key matching
//! - **Single-Flight Cache**: Memoizes listings per key for a TTL, computing
//!   each missing key once no matter how many callers ask
//! - **Cancellation**: Every fetch observes a [`CancellationToken`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fivetran_fetch::api::ApiClient;
//! use fivetran_fetch::config::ClientConfig;
//! use fivetran_fetch::http::Credentials;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> fivetran_fetch::Result<()> {
//!     let credentials = Credentials::new("key", "secret")?;
//!     let client = ApiClient::connect(&ClientConfig::default(), credentials)?;
//!     let cancel = CancellationToken::new();
//!
//!     for group in client.cached_groups(&cancel).await?.iter() {
//!         for mapping in client.lineage(&group.id, &cancel).await? {
//!             println!("{mapping}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                ApiClient (api)  /  CLI (cli)             │
//! ├───────────────┬──────────────────────────┬───────────────┤
//! │ TtlCache      │ PaginatedFetcher         │ NonPaginated  │
//! │ (cache)       │ ItemStream (fetch)       │ Fetcher       │
//! ├───────────────┴──────────────┬───────────┴───────────────┤
//! │ EnvelopeDecoder (decode)     │ Transport trait (fetch)   │
//! │                              │ HttpClient (http)         │
//! └──────────────────────────────┴───────────────────────────┘
//! ```
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Response envelope decoding
pub mod decode;

/// Single-flight TTL cache
pub mod cache;

/// Page fetching and pipelined pagination
pub mod fetch;

/// HTTP client with retry and rate limiting
pub mod http;

/// Client configuration
pub mod config;

/// Typed Fivetran API access
pub mod api;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::ApiClient;
pub use cache::TtlCache;
pub use fetch::{ItemStream, NonPaginatedFetcher, PaginatedFetcher, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
