//! # influxdb3-core
//!
//! Typed client and configuration for the InfluxDB V3 Cloud Dedicated
//! management API.
//!
//! - [`client`] - HTTP client scoped to one account and cluster, with retries
//! - [`databases`] / [`tokens`] - resource handlers and wire types
//! - [`params`] - request bodies with builder helpers
//! - [`config`] - settings resolution and TOML profiles
//! - [`error`] - status-aware error type
//!
//! ```rust,no_run
//! use influxdb3_core::{ClientConfig, InfluxDbClient, ProviderSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ProviderSettings::default().resolve(None)?;
//! let client = InfluxDbClient::new(ClientConfig::from(&settings))?;
//!
//! for db in client.databases().list().await? {
//!     println!("{} ({} tables max)", db.name, db.max_tables);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod databases;
pub mod error;
pub mod params;
pub mod tokens;

pub use client::{ClientConfig, InfluxDbClient};
pub use config::{
    Config, ConfigError, Profile, ProviderSettings, ResolvedSettings, RetryConfig, SettingsIssue,
};
pub use databases::{BucketTemplate, Database, DatabaseHandler, PartitionTemplatePart};
pub use error::{CoreError, ResourceKind, Result};
pub use params::{CreateDatabaseParams, TokenParams, UpdateDatabaseParams};
pub use tokens::{Action, Permission, Token, TokenHandler};
