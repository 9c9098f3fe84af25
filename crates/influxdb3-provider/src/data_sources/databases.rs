//! `influxdb3_databases` data source

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::data_sources::DataSource;
use crate::data_sources::database::database_attributes;
use crate::error::{ProviderError, Result};
use crate::models::{DatabaseModel, DatabasesModel, to_document};
use crate::schema::{Attribute, Schema};
use crate::state::ProviderState;

pub const TYPE_NAME: &str = "influxdb3_databases";

pub struct DatabasesDataSource {
    state: Arc<ProviderState>,
}

impl DatabasesDataSource {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl DataSource for DatabasesDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut item = database_attributes();
        item.insert(
            "name".to_string(),
            Attribute::computed_string().description("The name of the cluster database."),
        );
        Schema::new("Lists all databases in the cluster.").with_attribute(
            "databases",
            Attribute::computed_list(item).description("The cluster databases."),
        )
    }

    async fn read(&self, _config: &Value) -> Result<Value> {
        let data = self.state.get().await?;
        let databases = data.client.databases().list().await.map_err(|e| {
            ProviderError::api(
                "Unable to Read Databases",
                "Could not list databases, unexpected error",
                e,
            )
        })?;

        let model = DatabasesModel {
            databases: databases.iter().map(DatabaseModel::from).collect(),
        };
        to_document("databases", &model)
    }
}
