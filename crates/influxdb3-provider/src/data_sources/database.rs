//! `influxdb3_database` data source

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::data_sources::DataSource;
use crate::error::{ProviderError, Result};
use crate::models::{DatabaseModel, from_document, to_document};
use crate::schema::{Attribute, Schema, attributes};
use crate::state::ProviderState;

pub const TYPE_NAME: &str = "influxdb3_database";

/// Read-only database attributes, minus `name`
pub(crate) fn database_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        (
            "account_id",
            Attribute::computed_string()
                .description("The ID of the account that the cluster belongs to."),
        ),
        (
            "cluster_id",
            Attribute::computed_string()
                .description("The ID of the cluster that the database belongs to."),
        ),
        (
            "max_tables",
            Attribute::computed_int64()
                .description("The maximum number of tables for the cluster database."),
        ),
        (
            "max_columns_per_table",
            Attribute::computed_int64()
                .description("The maximum number of columns per table for the cluster database."),
        ),
        (
            "retention_period",
            Attribute::computed_int64()
                .description("The retention period of the cluster database in nanoseconds."),
        ),
        (
            "partition_template",
            Attribute::computed_list(attributes([
                (
                    "type",
                    Attribute::computed_string().description("The type of template part."),
                ),
                (
                    "value",
                    Attribute::computed_string().description("The value of template part."),
                ),
            ]))
            .description("The template for partitioning the cluster database."),
        ),
    ])
}

pub struct DatabaseDataSource {
    state: Arc<ProviderState>,
}

impl DatabaseDataSource {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl DataSource for DatabaseDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new("Retrieves a cluster database by name.").with_attribute(
            "name",
            Attribute::required_string().description("The name of the cluster database."),
        );
        schema.attributes.extend(database_attributes());
        schema
    }

    async fn read(&self, config: &Value) -> Result<Value> {
        let wanted: DatabaseModel = from_document("database config", config)?;
        if wanted.name.is_empty() {
            return Err(ProviderError::invalid_attribute(
                "name",
                "Name is empty",
                "Must set name",
            ));
        }
        let data = self.state.get().await?;

        let db = data
            .client
            .databases()
            .get_by_name(&wanted.name)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ProviderError::NotFound {
                        summary: "Database not found".to_string(),
                        detail: format!("Database with name {} not found", wanted.name),
                    }
                } else {
                    ProviderError::api(
                        "Error getting database",
                        "Could not read database, unexpected error",
                        e,
                    )
                }
            })?;

        to_document("database", &DatabaseModel::from(&db))
    }
}
