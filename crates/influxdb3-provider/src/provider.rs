//! The `influxdb3` provider
//!
//! Owns the registry of resources and data sources and turns provider
//! configuration into a shared management API client.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use influxdb3_core::config::{ENV_ACCOUNT_ID, ENV_CLUSTER_ID, ENV_TOKEN, ENV_URL};
use influxdb3_core::{ClientConfig, Config, InfluxDbClient, ProviderSettings};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::data_sources::{
    DataSource, DatabaseDataSource, DatabasesDataSource, TokenDataSource, TokensDataSource,
};
use crate::diagnostics::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::resources::{DatabaseResource, Resource, TokenResource};
use crate::schema::{Attribute, ProviderSchema, Schema};
use crate::state::{ProviderData, ProviderState};

pub const TYPE_NAME: &str = "influxdb3";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Provider identity and what it serves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMetadata {
    pub type_name: &'static str,
    pub version: String,
    pub resources: Vec<&'static str>,
    pub data_sources: Vec<&'static str>,
}

/// Where to look for the profile file
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    /// Profile name; the file's `default_profile` is used when unset
    pub profile: Option<String>,
    /// Profile file path; the platform config directory is used when unset
    pub config_file: Option<PathBuf>,
}

pub struct InfluxDbProvider {
    version: String,
    options: ProviderOptions,
    env: EnvLookup,
    state: Arc<ProviderState>,
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl InfluxDbProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_state(version, Arc::new(ProviderState::new()))
    }

    /// Build a provider around existing state, e.g. one already configured
    pub fn with_state(version: impl Into<String>, state: Arc<ProviderState>) -> Self {
        let resources: Vec<Arc<dyn Resource>> = vec![
            Arc::new(DatabaseResource::new(state.clone())),
            Arc::new(TokenResource::new(state.clone())),
        ];
        let data_sources: Vec<Arc<dyn DataSource>> = vec![
            Arc::new(DatabaseDataSource::new(state.clone())),
            Arc::new(DatabasesDataSource::new(state.clone())),
            Arc::new(TokenDataSource::new(state.clone())),
            Arc::new(TokensDataSource::new(state.clone())),
        ];

        Self {
            version: version.into(),
            options: ProviderOptions::default(),
            env: Arc::new(|name| std::env::var(name).ok()),
            state,
            resources: resources.into_iter().map(|r| (r.type_name(), r)).collect(),
            data_sources: data_sources
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ProviderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the environment lookup used during `configure`
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: TYPE_NAME,
            version: self.version.clone(),
            resources: self.resources.keys().copied().collect(),
            data_sources: self.data_sources.keys().copied().collect(),
        }
    }

    /// Schema of the provider configuration block
    pub fn schema(&self) -> Schema {
        Schema::new("Manages databases and tokens of an InfluxDB V3 Cloud Dedicated cluster.")
            .with_attribute(
                "account_id",
                Attribute::optional_string().description(format!(
                    "The ID of the account that the cluster belongs to. May also be set with \
                     the {ENV_ACCOUNT_ID} environment variable."
                )),
            )
            .with_attribute(
                "cluster_id",
                Attribute::optional_string().description(format!(
                    "The ID of the cluster to manage. May also be set with the \
                     {ENV_CLUSTER_ID} environment variable."
                )),
            )
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .description(format!(
                        "The management token used to authenticate. May also be set with the \
                         {ENV_TOKEN} environment variable."
                    ))
                    .sensitive(),
            )
            .with_attribute(
                "url",
                Attribute::optional_string().description(format!(
                    "The management console URL. May also be set with the {ENV_URL} \
                     environment variable. Defaults to https://console.influxdata.com."
                )),
            )
    }

    pub fn provider_schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: self.schema(),
            resources: self
                .resources
                .iter()
                .map(|(name, r)| (name.to_string(), r.schema()))
                .collect(),
            data_sources: self
                .data_sources
                .iter()
                .map(|(name, d)| (name.to_string(), d.schema()))
                .collect(),
        }
    }

    /// Resolve settings, build the client and share it with all resources
    pub async fn configure(&self, config: &Value) -> Diagnostics {
        let mut diags = self.schema().validate(config);
        if diags.has_errors() {
            return diags;
        }

        match self.build_client(config) {
            Ok(client) => {
                self.state.set(ProviderData::new(client)).await;
                info!("Configured InfluxDB V3 client");
            }
            Err(e) => diags.extend(e.into_diagnostics()),
        }
        diags
    }

    fn build_client(&self, config: &Value) -> Result<InfluxDbClient> {
        let explicit = ProviderSettings {
            account_id: string_attr(config, "account_id"),
            cluster_id: string_attr(config, "cluster_id"),
            token: string_attr(config, "token"),
            url: string_attr(config, "url"),
        };

        let file_config = match &self.options.config_file {
            Some(path) => {
                debug!(path = %path.display(), "loading profiles from explicit path");
                Config::load_from_path(path)?
            }
            None => Config::load()?,
        };
        let profile = file_config.resolve_profile(self.options.profile.as_deref())?;

        let settings = explicit.resolve_with(profile, |name| (self.env)(name))?;

        info!(
            account_id = %settings.account_id,
            cluster_id = %settings.cluster_id,
            url = %settings.url,
            token = "***",
            "Creating InfluxDB V3 client"
        );

        InfluxDbClient::new(ClientConfig::from(&settings)).map_err(|e| {
            ProviderError::invalid(
                "Unable to Create InfluxDB V3 Client",
                format!(
                    "An unexpected error occurred when creating the InfluxDB V3 client. \
                     InfluxDB V3 Client Error: {e}"
                ),
            )
        })
    }

    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>> {
        self.data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownDataSource(type_name.to_string()))
    }

    pub fn state(&self) -> Arc<ProviderState> {
        self.state.clone()
    }
}

/// A configured (non-null) string attribute
fn string_attr(config: &Value, name: &str) -> Option<String> {
    config.get(name).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_lists_registry() {
        let provider = InfluxDbProvider::new("1.2.3");
        let meta = provider.metadata();
        assert_eq!(meta.type_name, "influxdb3");
        assert_eq!(meta.version, "1.2.3");
        assert_eq!(meta.resources, vec!["influxdb3_database", "influxdb3_token"]);
        assert_eq!(
            meta.data_sources,
            vec![
                "influxdb3_database",
                "influxdb3_databases",
                "influxdb3_token",
                "influxdb3_tokens"
            ]
        );
    }

    #[test]
    fn test_unknown_types() {
        let provider = InfluxDbProvider::new("dev");
        assert!(matches!(
            provider.resource("influxdb3_bucket"),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(matches!(
            provider.data_source("influxdb3_bucket"),
            Err(ProviderError::UnknownDataSource(_))
        ));
    }

    #[test]
    fn test_token_is_sensitive_in_schema() {
        let schema = InfluxDbProvider::new("dev").schema();
        assert!(schema.attribute("token").unwrap().sensitive);
        assert!(!schema.attribute("url").unwrap().sensitive);
    }

    #[test]
    fn test_string_attr_ignores_null() {
        let config = json!({"token": null, "url": "https://x"});
        assert_eq!(string_attr(&config, "token"), None);
        assert_eq!(string_attr(&config, "url").as_deref(), Some("https://x"));
    }
}
