//! Single-flight TTL cache
//!
//! Memoizes the result of an async computation per key for a bounded time
//! window. Concurrent callers asking for the same missing key wait on one
//! another so the computation runs at most once per key per window; callers
//! on different keys never wait on each other.
//!
//! # Example
//!
//! ```rust,ignore
//! let cache: TtlCache<String, Arc<Vec<Group>>> = TtlCache::new();
//! let groups = cache
//!     .get_or_add("groups".to_string(), || load_groups(), Duration::from_secs(300))
//!     .await?;
//! ```

mod ttl;

pub use ttl::TtlCache;
