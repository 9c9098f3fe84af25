//! State models and their mapping to API types
//!
//! Models are the typed form of resource and data source documents. Fields
//! that may be unknown during planning are `Option`s and serialize as
//! `null`.

use influxdb3_core::{
    Action, BucketTemplate, CreateDatabaseParams, Database, PartitionTemplatePart, Permission,
    Token, TokenParams, UpdateDatabaseParams,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProviderError, Result};

pub const DEFAULT_MAX_TABLES: i64 = 500;
pub const DEFAULT_MAX_COLUMNS_PER_TABLE: i64 = 200;
pub const DEFAULT_RETENTION_PERIOD: i64 = 0;

/// Decode a document into a model
pub fn from_document<T: DeserializeOwned>(what: &'static str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| ProviderError::document(what, e))
}

/// Encode a model into a document
pub fn to_document<T: Serialize>(what: &'static str, model: &T) -> Result<Value> {
    serde_json::to_value(model).map_err(|e| ProviderError::document(what, e))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModel {
    pub account_id: Option<String>,
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub max_tables: Option<i64>,
    pub max_columns_per_table: Option<i64>,
    pub retention_period: Option<i64>,
    pub partition_template: Option<Vec<PartitionTemplateModel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTemplateModel {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl From<&PartitionTemplatePart> for PartitionTemplateModel {
    fn from(part: &PartitionTemplatePart) -> Self {
        let value = match part {
            PartitionTemplatePart::Time(v) | PartitionTemplatePart::Tag(v) => v.clone(),
            // Value's map is ordered, so keys come out sorted like `jsonencode()`
            PartitionTemplatePart::Bucket(bucket) => serde_json::to_value(bucket)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        };
        Self {
            kind: part.kind().to_string(),
            value,
        }
    }
}

impl PartitionTemplateModel {
    fn to_part(&self, index: usize) -> Result<PartitionTemplatePart> {
        match self.kind.as_str() {
            "time" => Ok(PartitionTemplatePart::Time(self.value.clone())),
            "tag" => Ok(PartitionTemplatePart::Tag(self.value.clone())),
            "bucket" => serde_json::from_str::<BucketTemplate>(&self.value)
                .map(PartitionTemplatePart::Bucket)
                .map_err(|e| {
                    ProviderError::invalid_attribute(
                        format!("partition_template[{index}].value"),
                        "Error creating database partition template",
                        format!("Failed to unmarshal JSON data: {e}"),
                    )
                }),
            other => Err(ProviderError::invalid_attribute(
                format!("partition_template[{index}].type"),
                "Error creating database partition template",
                format!("Unsupported partition template type \"{other}\""),
            )),
        }
    }
}

impl From<&Database> for DatabaseModel {
    fn from(db: &Database) -> Self {
        let parts: Vec<PartitionTemplateModel> =
            db.partition_template.iter().map(Into::into).collect();
        Self {
            account_id: Some(db.account_id.clone()),
            cluster_id: Some(db.cluster_id.clone()),
            name: db.name.clone(),
            max_tables: Some(db.max_tables),
            max_columns_per_table: Some(db.max_columns_per_table),
            retention_period: Some(db.retention_period),
            partition_template: (!parts.is_empty()).then_some(parts),
        }
    }
}

impl DatabaseModel {
    pub fn partition_parts(&self) -> Result<Vec<PartitionTemplatePart>> {
        self.partition_template
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, part)| part.to_part(i))
            .collect()
    }

    /// Create request from a planned state, falling back to defaults
    pub fn create_params(&self) -> Result<CreateDatabaseParams> {
        Ok(CreateDatabaseParams::new(self.name.clone())
            .with_max_tables(self.max_tables.unwrap_or(DEFAULT_MAX_TABLES))
            .with_max_columns_per_table(
                self.max_columns_per_table
                    .unwrap_or(DEFAULT_MAX_COLUMNS_PER_TABLE),
            )
            .with_retention_period(self.retention_period.unwrap_or(DEFAULT_RETENTION_PERIOD))
            .with_partition_template(self.partition_parts()?))
    }

    pub fn update_params(&self) -> UpdateDatabaseParams {
        UpdateDatabaseParams::new()
            .with_max_tables(self.max_tables.unwrap_or(DEFAULT_MAX_TABLES))
            .with_max_columns_per_table(
                self.max_columns_per_table
                    .unwrap_or(DEFAULT_MAX_COLUMNS_PER_TABLE),
            )
            .with_retention_period(self.retention_period.unwrap_or(DEFAULT_RETENTION_PERIOD))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenModel {
    pub id: Option<String>,
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    pub cluster_id: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<PermissionModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionModel {
    pub action: String,
    pub resource: String,
}

impl From<&Permission> for PermissionModel {
    fn from(p: &Permission) -> Self {
        Self {
            action: p.action.to_string(),
            resource: p.resource.clone(),
        }
    }
}

impl From<&Token> for TokenModel {
    fn from(token: &Token) -> Self {
        Self {
            id: Some(token.id.clone()),
            access_token: (!token.access_token.is_empty()).then(|| token.access_token.clone()),
            account_id: Some(token.account_id.clone()),
            cluster_id: Some(token.cluster_id.clone()),
            created_at: Some(token.created_at.clone()),
            description: token.description.clone(),
            permissions: token.permissions.iter().map(Into::into).collect(),
        }
    }
}

impl TokenModel {
    pub fn params(&self) -> Result<TokenParams> {
        let permissions = self
            .permissions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                p.action
                    .parse::<Action>()
                    .map(|action| Permission::new(action, p.resource.clone()))
                    .map_err(|e| {
                        ProviderError::invalid_attribute(
                            format!("permissions[{i}].action"),
                            "Invalid Attribute Value Match",
                            e,
                        )
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TokenParams::new(self.description.clone()).with_permissions(permissions))
    }

    /// The token id parsed as a UUID
    pub fn uuid(&self) -> Result<String> {
        let id = self.id.as_deref().unwrap_or_default();
        uuid::Uuid::parse_str(id)
            .map(|u| u.to_string())
            .map_err(|e| {
                ProviderError::invalid_attribute(
                    "id",
                    "Validation error. Ensure the Id is in UUID format.",
                    format!("Could not parse token id \"{id}\": {e}"),
                )
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabasesModel {
    #[serde(default)]
    pub databases: Vec<DatabaseModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensModel {
    #[serde(default)]
    pub tokens: Vec<TokenModel>,
}
