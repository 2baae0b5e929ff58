//! API object shapes
//!
//! Only the fields the lineage report reads are modelled; everything else in
//! the responses is ignored. Multi-word fields accept both `snake_case` and
//! `camelCase`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A group (destination) in the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Creation timestamp as sent by the API
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// A connector inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    /// Connector identifier
    pub id: String,
    /// Owning group
    #[serde(default, alias = "groupId")]
    pub group_id: Option<String>,
    /// Source type, e.g. `postgres` or `salesforce`
    #[serde(default)]
    pub service: Option<String>,
    /// Destination schema name (prefix for multi-schema connectors)
    #[serde(default)]
    pub schema: Option<String>,
    /// Whether syncing is paused
    #[serde(default)]
    pub paused: bool,
}

/// Schema configuration of one connector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSchemas {
    /// Source schema name to its configuration; values may be `null`
    #[serde(default)]
    pub schemas: BTreeMap<String, Option<SchemaConfig>>,
    /// How new schemas and tables are handled
    #[serde(default, alias = "schemaChangeHandling")]
    pub schema_change_handling: Option<String>,
}

/// Configuration of one source schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default, alias = "nameInDestination")]
    pub name_in_destination: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub tables: BTreeMap<String, Option<TableConfig>>,
}

/// Configuration of one source table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default, alias = "nameInDestination")]
    pub name_in_destination: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Where one source table lands in the destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageMapping {
    pub connector_id: String,
    pub source_schema: String,
    pub source_table: String,
    pub destination_schema: String,
    pub destination_table: String,
    /// False when either the schema or the table is disabled
    pub enabled: bool,
}

impl fmt::Display for LineageMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}.{} -> {}.{}",
            self.connector_id,
            self.source_schema,
            self.source_table,
            self.destination_schema,
            self.destination_table
        )
    }
}

impl ConnectorSchemas {
    /// Flatten every table of every schema into lineage mappings
    ///
    /// A missing destination name falls back to the source name. Ordering
    /// follows schema name, then table name.
    pub fn lineage(&self, connector_id: &str) -> Vec<LineageMapping> {
        let mut mappings = Vec::new();

        for (schema_name, schema) in &self.schemas {
            let Some(schema) = schema else { continue };
            let destination_schema = schema
                .name_in_destination
                .clone()
                .unwrap_or_else(|| schema_name.clone());
            let schema_enabled = schema.enabled.unwrap_or(true);

            for (table_name, table) in &schema.tables {
                let table = table.clone().unwrap_or_default();
                mappings.push(LineageMapping {
                    connector_id: connector_id.to_string(),
                    source_schema: schema_name.clone(),
                    source_table: table_name.clone(),
                    destination_schema: destination_schema.clone(),
                    destination_table: table
                        .name_in_destination
                        .unwrap_or_else(|| table_name.clone()),
                    enabled: schema_enabled && table.enabled.unwrap_or(true),
                });
            }
        }

        mappings
    }
}
