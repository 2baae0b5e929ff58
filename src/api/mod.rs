//! Fivetran REST API surface
//!
//! [`ApiClient`] is an explicitly constructed handle over the fetchers. It
//! exposes the listings the lineage report needs (groups, connectors of a
//! group, schema configuration of a connector) and memoizes the listings
//! with a [`TtlCache`](crate::cache::TtlCache).
//!
//! In Fivetran terms a *group* is the destination-side equivalent of a
//! database; connectors belong to exactly one group.

mod client;
mod types;

pub use client::{ApiClient, SCHEMA_FETCH_CONCURRENCY};
pub use types::{Connector, ConnectorSchemas, Group, LineageMapping, SchemaConfig, TableConfig};
