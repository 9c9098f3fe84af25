//! `influxdb3_token` data source

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::data_sources::DataSource;
use crate::error::{ProviderError, Result};
use crate::models::{TokenModel, from_document, to_document};
use crate::resources::token::ACCESS_TOKEN_DESCRIPTION;
use crate::schema::{Attribute, Schema, Validator, attributes};
use crate::state::ProviderState;

pub const TYPE_NAME: &str = "influxdb3_token";

/// Read-only token attributes, minus `id`
pub(crate) fn token_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        (
            "access_token",
            Attribute::computed_string()
                .description(ACCESS_TOKEN_DESCRIPTION)
                .sensitive(),
        ),
        (
            "account_id",
            Attribute::computed_string()
                .description("The ID of the account that the database token belongs to."),
        ),
        (
            "cluster_id",
            Attribute::computed_string()
                .description("The ID of the cluster that the database token belongs to."),
        ),
        (
            "created_at",
            Attribute::computed_string()
                .description("When the database token was created, in RFC3339 format."),
        ),
        (
            "description",
            Attribute::computed_string().description("The description of the database token."),
        ),
        (
            "permissions",
            Attribute::computed_list(attributes([
                (
                    "action",
                    Attribute::computed_string().description("The action the permission allows."),
                ),
                (
                    "resource",
                    Attribute::computed_string()
                        .description(
                            "The database the permission applies to. `*` refers to all databases.",
                        ),
                ),
            ]))
            .description("The list of permissions the database token allows."),
        ),
    ])
}

pub struct TokenDataSource {
    state: Arc<ProviderState>,
}

impl TokenDataSource {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl DataSource for TokenDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        let mut schema = Schema::new("Retrieves a database token by ID.").with_attribute(
            "id",
            Attribute::required_string()
                .description("The ID of the database token.")
                .validator(Validator::Uuid),
        );
        schema.attributes.extend(token_attributes());
        schema
    }

    async fn read(&self, config: &Value) -> Result<Value> {
        let wanted: TokenModel = from_document("token config", config)?;
        let id = wanted.uuid()?;
        let data = self.state.get().await?;

        let token = data.client.tokens().get_by_id(&id).await.map_err(|e| {
            if e.is_not_found() {
                ProviderError::NotFound {
                    summary: "Token not found".to_string(),
                    detail: format!("Token with ID {id} not found"),
                }
            } else {
                ProviderError::api(
                    "Error getting token",
                    "Could not read token, unexpected error",
                    e,
                )
            }
        })?;

        to_document("token", &TokenModel::from(&token))
    }
}
