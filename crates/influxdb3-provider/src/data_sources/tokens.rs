//! `influxdb3_tokens` data source

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::data_sources::DataSource;
use crate::data_sources::token::token_attributes;
use crate::error::{ProviderError, Result};
use crate::models::{TokenModel, TokensModel, to_document};
use crate::schema::{Attribute, Schema};
use crate::state::ProviderState;

pub const TYPE_NAME: &str = "influxdb3_tokens";

pub struct TokensDataSource {
    state: Arc<ProviderState>,
}

impl TokensDataSource {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl DataSource for TokensDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut item = token_attributes();
        item.insert(
            "id".to_string(),
            Attribute::computed_string().description("The ID of the database token."),
        );
        Schema::new("Lists all database tokens in the cluster.").with_attribute(
            "tokens",
            Attribute::computed_list(item).description("The database tokens."),
        )
    }

    async fn read(&self, _config: &Value) -> Result<Value> {
        let data = self.state.get().await?;
        let tokens = data.client.tokens().list().await.map_err(|e| {
            ProviderError::api(
                "Unable to Read Tokens",
                "Could not list tokens, unexpected error",
                e,
            )
        })?;

        let model = TokensModel {
            tokens: tokens.iter().map(TokenModel::from).collect(),
        };
        to_document("tokens", &model)
    }
}
