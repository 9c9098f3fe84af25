//! Request bodies for database and token operations
//!
//! Each struct serializes directly to the JSON the management API expects.
//! Optional fields are omitted when unset so the server applies its own
//! defaults.
//!
//! # Example
//!
//! ```rust
//! use influxdb3_core::{CreateDatabaseParams, PartitionTemplatePart};
//!
//! let params = CreateDatabaseParams::new("metrics")
//!     .with_max_tables(1000)
//!     .with_retention_period(86_400_000_000_000)
//!     .with_partition_part(PartitionTemplatePart::Tag("region".to_string()));
//!
//! let body = serde_json::to_value(&params).unwrap();
//! assert_eq!(body["maxTables"], 1000);
//! ```

use serde::Serialize;

use crate::databases::PartitionTemplatePart;
use crate::tokens::Permission;

/// Parameters for creating a database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseParams {
    /// Database name (required)
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tables: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_columns_per_table: Option<i64>,
    /// Retention in nanoseconds; 0 keeps data forever
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<i64>,
    /// Partition template; can only be set at creation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partition_template: Vec<PartitionTemplatePart>,
}

impl CreateDatabaseParams {
    /// Create new params with the required name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_tables: None,
            max_columns_per_table: None,
            retention_period: None,
            partition_template: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_tables(mut self, max_tables: i64) -> Self {
        self.max_tables = Some(max_tables);
        self
    }

    #[must_use]
    pub fn with_max_columns_per_table(mut self, max_columns: i64) -> Self {
        self.max_columns_per_table = Some(max_columns);
        self
    }

    #[must_use]
    pub fn with_retention_period(mut self, nanos: i64) -> Self {
        self.retention_period = Some(nanos);
        self
    }

    /// Append one partition template part
    #[must_use]
    pub fn with_partition_part(mut self, part: PartitionTemplatePart) -> Self {
        self.partition_template.push(part);
        self
    }

    /// Replace the whole partition template
    #[must_use]
    pub fn with_partition_template(mut self, parts: Vec<PartitionTemplatePart>) -> Self {
        self.partition_template = parts;
        self
    }
}

/// Parameters for updating a database
///
/// Name and partition template are fixed at creation and cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatabaseParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tables: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_columns_per_table: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<i64>,
}

impl UpdateDatabaseParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_tables(mut self, max_tables: i64) -> Self {
        self.max_tables = Some(max_tables);
        self
    }

    #[must_use]
    pub fn with_max_columns_per_table(mut self, max_columns: i64) -> Self {
        self.max_columns_per_table = Some(max_columns);
        self
    }

    #[must_use]
    pub fn with_retention_period(mut self, nanos: i64) -> Self {
        self.retention_period = Some(nanos);
        self
    }

    /// True if no field would be sent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max_tables.is_none()
            && self.max_columns_per_table.is_none()
            && self.retention_period.is_none()
    }
}

/// Parameters for creating or updating a token
///
/// Both fields are always sent; an update replaces the full permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenParams {
    pub description: String,
    pub permissions: Vec<Permission>,
}

impl TokenParams {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            permissions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }
}
