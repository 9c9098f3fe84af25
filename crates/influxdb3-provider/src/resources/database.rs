//! `influxdb3_database` resource

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ProviderError, Result};
use crate::models::{
    DEFAULT_MAX_COLUMNS_PER_TABLE, DEFAULT_MAX_TABLES, DEFAULT_RETENTION_PERIOD, DatabaseModel,
    from_document, to_document,
};
use crate::resources::Resource;
use crate::schema::{Attribute, Schema, Validator, attributes};
use crate::state::ProviderState;

pub const TYPE_NAME: &str = "influxdb3_database";

/// Partition template parts: 1 to 8 entries, each `time`, `tag` or `bucket`
pub fn partition_template_attributes() -> std::collections::BTreeMap<String, Attribute> {
    attributes([
        (
            "type",
            Attribute::required_string()
                .description(
                    "The type of template part. Valid values are `bucket`, `tag` or `time`.",
                )
                .validator(Validator::one_of(&["bucket", "tag", "time"])),
        ),
        (
            "value",
            Attribute::required_string().description(
                "The value of the template part. For `bucket` parts this is a JSON-encoded \
                 object with `tagName` and `numberOfBuckets`.",
            ),
        ),
    ])
}

pub struct DatabaseResource {
    state: Arc<ProviderState>,
}

impl DatabaseResource {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Resource for DatabaseResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Creates and manages a cluster database.")
            .with_attribute(
                "account_id",
                Attribute::computed_string()
                    .description("The ID of the account that the cluster belongs to."),
            )
            .with_attribute(
                "cluster_id",
                Attribute::computed_string()
                    .description("The ID of the cluster that the database belongs to."),
            )
            .with_attribute(
                "name",
                Attribute::required_string()
                    .description(
                        "The name of the cluster database. Changing it forces a new database.",
                    )
                    .validator(Validator::StringLength { min: 1, max: 64 })
                    .requires_replace(),
            )
            .with_attribute(
                "max_tables",
                Attribute::optional_computed_int64()
                    .description("The maximum number of tables for the cluster database.")
                    .default_value(DEFAULT_MAX_TABLES),
            )
            .with_attribute(
                "max_columns_per_table",
                Attribute::optional_computed_int64()
                    .description(
                        "The maximum number of columns per table for the cluster database.",
                    )
                    .default_value(DEFAULT_MAX_COLUMNS_PER_TABLE),
            )
            .with_attribute(
                "retention_period",
                Attribute::optional_computed_int64()
                    .description(
                        "The retention period of the cluster database in nanoseconds. \
                         0 keeps data forever.",
                    )
                    .default_value(DEFAULT_RETENTION_PERIOD),
            )
            .with_attribute(
                "partition_template",
                Attribute::optional_computed_list(partition_template_attributes())
                    .description(
                        "A template for partitioning the database. It can hold up to 7 tag and \
                         tag bucket parts and 1 time part. It can only be set at creation; \
                         changing it forces a new database.",
                    )
                    .validator(Validator::ListSize { min: 1, max: 8 })
                    .validator(Validator::UniqueItems)
                    .requires_replace(),
            )
    }

    async fn create(&self, planned: &Value) -> Result<Value> {
        let plan: DatabaseModel = from_document("database plan", planned)?;
        let params = plan.create_params()?;
        let data = self.state.get().await?;

        let db = data.client.databases().create(&params).await.map_err(|e| {
            ProviderError::api(
                "Error creating database",
                "Could not create database, unexpected error",
                e,
            )
        })?;

        info!(name = %db.name, "created database");
        to_document("database state", &DatabaseModel::from(&db))
    }

    async fn read(&self, state: &Value) -> Result<Value> {
        let current: DatabaseModel = from_document("database state", state)?;
        let data = self.state.get().await?;

        let db = data
            .client
            .databases()
            .get_by_name(&current.name)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    ProviderError::NotFound {
                        summary: "Database not found".to_string(),
                        detail: format!("Database with name {} not found", current.name),
                    }
                } else {
                    ProviderError::api(
                        "Error getting database",
                        "Could not read database, unexpected error",
                        e,
                    )
                }
            })?;

        to_document("database state", &DatabaseModel::from(&db))
    }

    async fn update(&self, planned: &Value, _prior: &Value) -> Result<Value> {
        let plan: DatabaseModel = from_document("database plan", planned)?;
        let data = self.state.get().await?;

        let db = data
            .client
            .databases()
            .update(&plan.name, &plan.update_params())
            .await
            .map_err(|e| {
                ProviderError::api(
                    "Error updating database",
                    "Could not update database, unexpected error",
                    e,
                )
            })?;

        info!(name = %db.name, "updated database");
        let mut updated = DatabaseModel::from(&db);
        // The template cannot change in place; keep what was planned
        updated.partition_template = plan.partition_template;
        to_document("database state", &updated)
    }

    async fn delete(&self, state: &Value) -> Result<()> {
        let current: DatabaseModel = from_document("database state", state)?;
        let data = self.state.get().await?;

        data.client
            .databases()
            .delete(&current.name)
            .await
            .map_err(|e| {
                ProviderError::api(
                    "Error deleting database",
                    "Could not delete database, unexpected error",
                    e,
                )
            })?;

        info!(name = %current.name, "deleted database");
        Ok(())
    }

    async fn import_state(&self, id: &str) -> Result<Value> {
        self.read(&json!({ "name": id })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::plan_with_schema;

    fn resource() -> DatabaseResource {
        DatabaseResource::new(Arc::new(ProviderState::new()))
    }

    #[test]
    fn test_schema_defaults_in_plan() {
        let r = resource();
        let plan = plan_with_schema(&r.schema(), None, &json!({"name": "metrics"}));
        assert_eq!(plan.planned_state["max_tables"], 500);
        assert_eq!(plan.planned_state["max_columns_per_table"], 200);
        assert_eq!(plan.planned_state["retention_period"], 0);
        assert!(plan.planned_state["account_id"].is_null());
    }

    #[test]
    fn test_validate_name_and_template() {
        let r = resource();
        let diags = r.validate(&json!({
            "name": "",
            "partition_template": [{"type": "hash", "value": "x"}]
        }));
        let paths: Vec<_> = diags.errors().filter_map(|d| d.attribute.clone()).collect();
        assert!(paths.contains(&"name".to_string()));
        assert!(paths.contains(&"partition_template[0].type".to_string()));

        let too_long = "x".repeat(65);
        assert!(r.validate(&json!({"name": too_long})).has_errors());
        assert!(!r.validate(&json!({"name": "metrics"})).has_errors());
    }

    #[test]
    fn test_template_change_requires_replace() {
        let r = resource();
        let prior = json!({
            "account_id": "a", "cluster_id": "c", "name": "metrics",
            "max_tables": 500, "max_columns_per_table": 200, "retention_period": 0,
            "partition_template": [{"type": "tag", "value": "region"}]
        });
        let plan = r.plan(
            Some(&prior),
            &json!({"name": "metrics", "partition_template": [{"type": "tag", "value": "host"}]}),
        );
        assert_eq!(plan.requires_replace, vec!["partition_template"]);

        let plan = r.plan(Some(&prior), &json!({"name": "metrics", "max_tables": 600}));
        assert!(plan.requires_replace.is_empty());
        assert_eq!(plan.planned_state["partition_template"], prior["partition_template"]);
    }

    #[tokio::test]
    async fn test_unconfigured_create_fails() {
        let err = resource()
            .create(&json!({"name": "metrics"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured));
    }
}
