//! `influxdb3_token` resource

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{ProviderError, Result};
use crate::models::{TokenModel, from_document, to_document};
use crate::resources::Resource;
use crate::schema::{Attribute, Schema, Validator, attributes};
use crate::state::ProviderState;

pub const TYPE_NAME: &str = "influxdb3_token";

pub(crate) const ACCESS_TOKEN_DESCRIPTION: &str = "The access token that can be used to \
    authenticate query and write requests to the cluster. It is only returned once, when the \
    token is created; a lost access token cannot be recovered.";

pub fn permission_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        (
            "action",
            Attribute::required_string()
                .description(
                    "The action the permission allows. Valid values are `read` or `write`.",
                )
                .validator(Validator::one_of(&["read", "write"])),
        ),
        (
            "resource",
            Attribute::required_string()
                .description(
                    "The database the permission applies to. `*` refers to all databases.",
                ),
        ),
    ])
}

pub struct TokenResource {
    state: Arc<ProviderState>,
}

impl TokenResource {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }

    fn not_found(id: &str) -> ProviderError {
        ProviderError::NotFound {
            summary: "Token not found".to_string(),
            detail: format!("Token with ID {id} not found"),
        }
    }
}

#[async_trait]
impl Resource for TokenResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Creates and manages a database token.")
            .with_attribute(
                "id",
                Attribute::computed_string().description("The ID of the database token."),
            )
            .with_attribute(
                "access_token",
                Attribute::computed_string()
                    .description(ACCESS_TOKEN_DESCRIPTION)
                    .sensitive(),
            )
            .with_attribute(
                "account_id",
                Attribute::computed_string()
                    .description("The ID of the account that the database token belongs to."),
            )
            .with_attribute(
                "cluster_id",
                Attribute::computed_string()
                    .description("The ID of the cluster that the database token belongs to."),
            )
            .with_attribute(
                "created_at",
                Attribute::computed_string()
                    .description("When the database token was created, in RFC3339 format."),
            )
            .with_attribute(
                "description",
                Attribute::required_string().description("The description of the database token."),
            )
            .with_attribute(
                "permissions",
                Attribute::required_list(permission_attributes())
                    .description("The list of permissions the database token allows.")
                    .validator(Validator::UniqueItems),
            )
    }

    async fn create(&self, planned: &Value) -> Result<Value> {
        let plan: TokenModel = from_document("token plan", planned)?;
        let params = plan.params()?;
        let data = self.state.get().await?;

        let token = data.client.tokens().create(&params).await.map_err(|e| {
            ProviderError::api(
                "Error creating token",
                "Could not create token, unexpected error",
                e,
            )
        })?;

        info!(id = %token.id, "created token");
        to_document("token state", &TokenModel::from(&token))
    }

    async fn read(&self, state: &Value) -> Result<Value> {
        let current: TokenModel = from_document("token state", state)?;
        let id = current.uuid()?;
        let data = self.state.get().await?;

        let token = data.client.tokens().get_by_id(&id).await.map_err(|e| {
            if e.is_not_found() {
                Self::not_found(&id)
            } else {
                ProviderError::api(
                    "Error getting token",
                    "Could not read token, unexpected error",
                    e,
                )
            }
        })?;

        let mut refreshed = TokenModel::from(&token);
        if refreshed.access_token.is_none() {
            refreshed.access_token = current.access_token;
        }
        to_document("token state", &refreshed)
    }

    async fn update(&self, planned: &Value, prior: &Value) -> Result<Value> {
        let plan: TokenModel = from_document("token plan", planned)?;
        let previous: TokenModel = from_document("token state", prior)?;
        let id = if plan.id.is_some() {
            plan.uuid()?
        } else {
            previous.uuid()?
        };
        let params = plan.params()?;
        let data = self.state.get().await?;

        let token = data
            .client
            .tokens()
            .update(&id, &params)
            .await
            .map_err(|e| {
                ProviderError::api(
                    "Error updating token",
                    "Could not update token, unexpected error",
                    e,
                )
            })?;

        info!(id = %token.id, "updated token");
        let mut updated = TokenModel::from(&token);
        if updated.access_token.is_none() {
            updated.access_token = previous.access_token;
        }
        to_document("token state", &updated)
    }

    async fn delete(&self, state: &Value) -> Result<()> {
        let current: TokenModel = from_document("token state", state)?;
        let id = current.uuid()?;
        let data = self.state.get().await?;

        data.client.tokens().delete(&id).await.map_err(|e| {
            ProviderError::api(
                "Error deleting token",
                "Could not delete token, unexpected error",
                e,
            )
        })?;

        info!(id = %id, "deleted token");
        Ok(())
    }

    async fn import_state(&self, id: &str) -> Result<Value> {
        self.read(&json!({ "id": id })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> TokenResource {
        TokenResource::new(Arc::new(ProviderState::new()))
    }

    #[test]
    fn test_validate_permissions() {
        let r = resource();
        let diags = r.validate(&json!({
            "description": "ci",
            "permissions": [
                {"action": "admin", "resource": "*"},
                {"action": "read", "resource": "*"},
                {"action": "read", "resource": "*"}
            ]
        }));
        let summaries: Vec<_> = diags.errors().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Invalid Attribute Value Match"));
        assert!(summaries.contains(&"Duplicate List Value"));
    }

    #[test]
    fn test_validate_rejects_setting_access_token() {
        let diags = resource().validate(&json!({
            "description": "ci",
            "permissions": [],
            "access_token": "nope"
        }));
        assert!(diags.errors().any(|d| d.attribute.as_deref() == Some("access_token")));
    }

    #[test]
    fn test_plan_keeps_access_token() {
        let prior = json!({
            "id": "4a5e3c2b-1d0f-4e9a-8b7c-6d5e4f3a2b1c",
            "access_token": "apiv1_secret",
            "account_id": "a",
            "cluster_id": "c",
            "created_at": "2024-05-01T12:30:00Z",
            "description": "ci",
            "permissions": [{"action": "read", "resource": "*"}]
        });
        let plan = resource().plan(
            Some(&prior),
            &json!({
                "description": "ci reader",
                "permissions": [{"action": "read", "resource": "*"}]
            }),
        );
        assert_eq!(plan.planned_state["access_token"], "apiv1_secret");
        assert_eq!(plan.planned_state["id"], prior["id"]);
        assert!(plan.requires_replace.is_empty());
    }

    #[tokio::test]
    async fn test_read_rejects_non_uuid_id() {
        let err = resource().read(&json!({"id": "abc"})).await.unwrap_err();
        let diags = err.into_diagnostics();
        assert_eq!(
            diags.iter().next().unwrap().summary,
            "Validation error. Ensure the Id is in UUID format."
        );
    }
}
