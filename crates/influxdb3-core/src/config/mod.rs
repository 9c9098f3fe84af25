//! Configuration for the InfluxDB V3 provider
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! Connection settings can come from explicit values, `INFLUXDB3_*`
//! environment variables, or a named profile in a TOML config file.
//! [`ProviderSettings::resolve`] merges those layers and validates the
//! result.

pub mod config;
pub mod error;
pub mod resilience;
pub mod settings;

pub use config::{Config, Profile};
pub use error::{ConfigError, Result, SettingsIssue};
pub use resilience::{RetryConfig, linear_jitter_backoff};
pub use settings::{
    DEFAULT_URL, ENV_ACCOUNT_ID, ENV_CLUSTER_ID, ENV_TOKEN, ENV_URL, ProviderSettings,
    ResolvedSettings,
};
