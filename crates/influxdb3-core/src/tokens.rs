//! Database access token operations

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{InfluxDbClient, segment};
use crate::error::{CoreError, ResourceKind, Result};
use crate::params::TokenParams;

const TOKENS: &str = "tokens";

/// A database access token
///
/// `access_token` is only populated in the response to a create call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.id)
            .field("access_token", &"***")
            .field("account_id", &self.account_id)
            .field("cluster_id", &self.cluster_id)
            .field("created_at", &self.created_at)
            .field("description", &self.description)
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl Token {
    /// Creation time, if the server sent a valid RFC 3339 timestamp
    #[must_use]
    pub fn created_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Access granted by a token to one database (or `*`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub action: Action,
    pub resource: String,
}

impl Permission {
    #[must_use]
    pub fn new(action: Action, resource: impl Into<String>) -> Self {
        Self {
            action,
            resource: resource.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Read => write!(f, "read"),
            Action::Write => write!(f, "write"),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            other => Err(format!("invalid action '{other}', expected read or write")),
        }
    }
}

/// Handler for token operations
pub struct TokenHandler {
    client: InfluxDbClient,
}

impl TokenHandler {
    #[must_use]
    pub fn new(client: InfluxDbClient) -> Self {
        Self { client }
    }

    /// Create a token; the response carries the secret access token
    pub async fn create(&self, params: &TokenParams) -> Result<Token> {
        debug!(description = %params.description, "creating token");
        self.client.post(TOKENS, params).await
    }

    /// Delete a token by id
    pub async fn delete(&self, id: &str) -> Result<()> {
        debug!(id, "deleting token");
        self.client
            .delete(&format!("{TOKENS}/{}", segment(id)))
            .await
            .map_err(|e| CoreError::DeleteFailed {
                kind: ResourceKind::Token,
                source: Box::new(e),
            })
    }

    /// List all tokens in the cluster
    pub async fn list(&self) -> Result<Vec<Token>> {
        let list: Option<Vec<Token>> = self.client.get(TOKENS).await?;
        Ok(list.unwrap_or_default())
    }

    /// Fetch a token by id; 404 becomes [`CoreError::NotFound`]
    pub async fn get_by_id(&self, id: &str) -> Result<Token> {
        self.client
            .get(&format!("{TOKENS}/{}", segment(id)))
            .await
            .map_err(|e| match e {
                CoreError::UnexpectedStatus { status: 404, .. } => CoreError::NotFound {
                    kind: ResourceKind::Token,
                    id: id.to_string(),
                },
                other => other,
            })
    }

    /// Replace a token's description and permissions
    pub async fn update(&self, id: &str, params: &TokenParams) -> Result<Token> {
        debug!(id, "updating token");
        self.client
            .patch(&format!("{TOKENS}/{}", segment(id)), params)
            .await
    }
}
