//! Resource and data source glue for InfluxDB V3 Cloud Dedicated
//!
//! This crate exposes the `influxdb3` provider: two managed resources
//! (`influxdb3_database`, `influxdb3_token`) and four data sources over the
//! management API client in `influxdb3-core`. The host protocol is left to
//! the embedder; documents are `serde_json::Value` objects keyed by
//! attribute name.
//!
//! ## Binary Usage
//!
//! ```bash
//! # Print all schemas
//! influxdb3-provider schema
//!
//! # Create a database from a JSON configuration
//! echo '{"name": "metrics"}' | influxdb3-provider resource influxdb3_database create --input -
//!
//! # List tokens using a named profile
//! influxdb3-provider --profile prod data influxdb3_tokens
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use influxdb3_provider::InfluxDbProvider;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = InfluxDbProvider::new(env!("CARGO_PKG_VERSION"));
//! let diags = provider.configure(&json!({})).await;
//! if diags.has_errors() {
//!     anyhow::bail!("configure failed");
//! }
//!
//! let databases = provider.data_source("influxdb3_databases")?;
//! let state = databases.read(&json!({})).await?;
//! println!("{state}");
//! # Ok(())
//! # }
//! ```

pub mod data_sources;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod output;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ProviderError, Result};
pub use provider::{InfluxDbProvider, ProviderMetadata, ProviderOptions};
pub use resources::PlanResult;
pub use schema::{Attribute, ProviderSchema, Schema};
pub use state::{ProviderData, ProviderState};
