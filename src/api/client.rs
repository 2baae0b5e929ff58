//! API client handle

use super::types::{Connector, ConnectorSchemas, Group, LineageMapping};
use crate::cache::TtlCache;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::fetch::{ItemStream, NonPaginatedFetcher, PaginatedFetcher, Transport};
use crate::http::{Credentials, HttpClient};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Maximum schema requests in flight while building a lineage report
pub const SCHEMA_FETCH_CONCURRENCY: usize = 8;

/// Typed access to the listings of one Fivetran account
///
/// Cloning is not supported; share it behind an `Arc` so every caller sees
/// the same caches.
pub struct ApiClient {
    paginated: PaginatedFetcher,
    single: NonPaginatedFetcher,
    groups: TtlCache<(), Arc<Vec<Group>>>,
    connectors: TtlCache<String, Arc<Vec<Connector>>>,
    cache_ttl: Duration,
}

impl ApiClient {
    /// Create a client over any transport
    pub fn new(transport: Arc<dyn Transport>, cache_ttl: Duration) -> Self {
        Self {
            paginated: PaginatedFetcher::new(Arc::clone(&transport)),
            single: NonPaginatedFetcher::new(transport),
            groups: TtlCache::new(),
            connectors: TtlCache::new(),
            cache_ttl,
        }
    }

    /// Create a client that talks HTTP according to `config`
    pub fn connect(config: &ClientConfig, credentials: Credentials) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::with_credentials(config.http_client_config(), credentials)?;
        info!("Using Fivetran API at {}", config.base_url);
        Ok(Self::new(Arc::new(http), config.cache_ttl()))
    }

    /// How long cached listings stay fresh
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Stream every group in the account
    pub fn groups(&self, cancel: &CancellationToken) -> ItemStream<Group> {
        self.paginated.fetch_items("groups", cancel)
    }

    /// All groups, served from the cache while fresh
    pub async fn cached_groups(&self, cancel: &CancellationToken) -> Result<Arc<Vec<Group>>> {
        self.groups
            .get_or_add(
                (),
                || async move {
                    let groups: Vec<Group> = self.paginated.fetch_all("groups", cancel).await?;
                    debug!("Loaded {} groups", groups.len());
                    Ok(Arc::new(groups))
                },
                self.cache_ttl,
            )
            .await
    }

    /// All groups, failing when the account has none
    pub async fn require_groups(&self, cancel: &CancellationToken) -> Result<Arc<Vec<Group>>> {
        let groups = self.cached_groups(cancel).await?;
        if groups.is_empty() {
            return Err(Error::empty("groups"));
        }
        Ok(groups)
    }

    /// Stream the connectors of one group
    pub fn connectors(&self, group_id: &str, cancel: &CancellationToken) -> ItemStream<Connector> {
        self.paginated
            .fetch_items(&format!("groups/{group_id}/connectors"), cancel)
    }

    /// Connectors of one group, served from the cache while fresh
    pub async fn cached_connectors(
        &self,
        group_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<Vec<Connector>>> {
        self.connectors
            .get_or_add(
                group_id.to_string(),
                || async move {
                    let endpoint = format!("groups/{group_id}/connectors");
                    let connectors: Vec<Connector> =
                        self.paginated.fetch_all(&endpoint, cancel).await?;
                    debug!("Loaded {} connectors for group {}", connectors.len(), group_id);
                    Ok(Arc::new(connectors))
                },
                self.cache_ttl,
            )
            .await
    }

    /// Schema configuration of one connector, `None` when the API sends no data
    pub async fn connector_schemas(
        &self,
        connector_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ConnectorSchemas>> {
        self.single
            .fetch(&format!("connectors/{connector_id}/schemas"), cancel)
            .await
    }

    /// Source-to-destination table mappings for every connector in a group
    ///
    /// Schemas are requested concurrently; the result keeps connector order.
    pub async fn lineage(
        &self,
        group_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<LineageMapping>> {
        let connectors = self.cached_connectors(group_id, cancel).await?;
        if connectors.is_empty() {
            return Err(Error::empty(format!("connectors for group {group_id}")));
        }

        let per_connector: Vec<Vec<LineageMapping>> = futures::stream::iter(connectors.iter())
            .map(|connector| async move {
                let schemas = self.connector_schemas(&connector.id, cancel).await?;
                Ok::<_, Error>(
                    schemas
                        .map(|s| s.lineage(&connector.id))
                        .unwrap_or_default(),
                )
            })
            .buffered(SCHEMA_FETCH_CONCURRENCY)
            .try_collect()
            .await?;

        let mappings: Vec<LineageMapping> = per_connector.into_iter().flatten().collect();
        info!(
            "Group {}: {} connectors, {} table mappings",
            group_id,
            connectors.len(),
            mappings.len()
        );
        Ok(mappings)
    }

    /// Forget cached listings so the next call refetches them
    pub fn invalidate(&self) {
        self.groups.invalidate(&());
        self.connectors.clear();
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("cache_ttl", &self.cache_ttl)
            .field("cached_groups", &self.groups.len())
            .field("cached_connector_lists", &self.connectors.len())
            .finish_non_exhaustive()
    }
}
