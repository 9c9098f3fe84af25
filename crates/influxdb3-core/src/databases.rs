//! Cluster database operations
//!
//! Databases are keyed by name. There is no single-database GET endpoint, so
//! lookups by name scan the list.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::client::{InfluxDbClient, segment};
use crate::error::{CoreError, ResourceKind, Result};
use crate::params::{CreateDatabaseParams, UpdateDatabaseParams};

const DATABASES: &str = "databases";

/// A cluster database as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub cluster_id: String,
    pub name: String,
    #[serde(default)]
    pub max_tables: i64,
    #[serde(default)]
    pub max_columns_per_table: i64,
    /// Retention in nanoseconds; 0 keeps data forever
    #[serde(default)]
    pub retention_period: i64,
    #[serde(default, deserialize_with = "known_parts")]
    pub partition_template: Vec<PartitionTemplatePart>,
}

/// One part of a database partition template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PartitionTemplatePart {
    /// Time format string, e.g. `%Y-%m-%d`
    Time(String),
    /// Tag name whose value partitions the data
    Tag(String),
    /// Hash a tag's values into a fixed number of buckets
    Bucket(BucketTemplate),
}

impl PartitionTemplatePart {
    /// Wire name of the part type
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PartitionTemplatePart::Time(_) => "time",
            PartitionTemplatePart::Tag(_) => "tag",
            PartitionTemplatePart::Bucket(_) => "bucket",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketTemplate {
    pub tag_name: String,
    pub number_of_buckets: u32,
}

const KNOWN_PART_TYPES: [&str; 3] = ["time", "tag", "bucket"];

/// Deserialize a partition template, dropping parts of unknown type
///
/// A `null` template is treated as empty. Parts of a known type that fail
/// to decode are an error.
fn known_parts<'de, D>(deserializer: D) -> std::result::Result<Vec<PartitionTemplatePart>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .filter(|part| {
            part.get("type")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|t| KNOWN_PART_TYPES.contains(&t))
        })
        .map(|part| serde_json::from_value(part).map_err(serde::de::Error::custom))
        .collect()
}

/// Handler for database operations
pub struct DatabaseHandler {
    client: InfluxDbClient,
}

impl DatabaseHandler {
    #[must_use]
    pub fn new(client: InfluxDbClient) -> Self {
        Self { client }
    }

    /// Create a database
    ///
    /// A 400 response becomes [`CoreError::BadRequest`].
    pub async fn create(&self, params: &CreateDatabaseParams) -> Result<Database> {
        debug!(name = %params.name, "creating database");
        self.client
            .post(DATABASES, params)
            .await
            .map_err(|e| match e {
                CoreError::UnexpectedStatus { status: 400, body } => CoreError::BadRequest { body },
                other => other,
            })
    }

    /// Delete a database by name
    pub async fn delete(&self, name: &str) -> Result<()> {
        debug!(name, "deleting database");
        self.client
            .delete(&format!("{DATABASES}/{}", segment(name)))
            .await
            .map_err(|e| CoreError::DeleteFailed {
                kind: ResourceKind::Database,
                source: Box::new(e),
            })
    }

    /// List all databases in the cluster
    pub async fn list(&self) -> Result<Vec<Database>> {
        let list: Option<Vec<Database>> = self.client.get(DATABASES).await?;
        Ok(list.unwrap_or_default())
    }

    /// Find a database by exact name
    pub async fn get_by_name(&self, name: &str) -> Result<Database> {
        self.list()
            .await?
            .into_iter()
            .find(|db| db.name == name)
            .ok_or_else(|| CoreError::NotFound {
                kind: ResourceKind::Database,
                id: name.to_string(),
            })
    }

    /// Update the mutable settings of a database
    pub async fn update(&self, name: &str, params: &UpdateDatabaseParams) -> Result<Database> {
        debug!(name, "updating database");
        self.client
            .patch(&format!("{DATABASES}/{}", segment(name)), params)
            .await
    }
}
