//! Provider settings resolution
//!
//! Settings come from three layers, highest priority first:
//! 1. Explicit values (provider configuration block, CLI flags)
//! 2. Environment variables (`INFLUXDB3_*`)
//! 3. The selected profile from the config file
//!
//! An explicit value wins even when it is an empty string. Empty
//! environment variables are treated as unset.

use std::fmt;

use url::Url;
use uuid::Uuid;

use super::config::Profile;
use super::error::{ConfigError, Result, SettingsIssue};
use super::resilience::RetryConfig;

pub const ENV_ACCOUNT_ID: &str = "INFLUXDB3_ACCOUNT_ID";
pub const ENV_CLUSTER_ID: &str = "INFLUXDB3_CLUSTER_ID";
pub const ENV_TOKEN: &str = "INFLUXDB3_TOKEN";
pub const ENV_URL: &str = "INFLUXDB3_URL";

/// Management console used when no URL is configured anywhere
pub const DEFAULT_URL: &str = "https://console.influxdata.com";

/// Unresolved provider settings as supplied by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub account_id: Option<String>,
    pub cluster_id: Option<String>,
    pub token: Option<String>,
    pub url: Option<String>,
}

/// Fully validated settings ready to build a client from
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub account_id: Uuid,
    pub cluster_id: Uuid,
    pub token: String,
    pub url: Url,
    pub retry: RetryConfig,
}

impl fmt::Debug for ResolvedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSettings")
            .field("account_id", &self.account_id)
            .field("cluster_id", &self.cluster_id)
            .field("token", &"***")
            .field("url", &self.url.as_str())
            .field("retry", &self.retry)
            .finish()
    }
}

impl ProviderSettings {
    /// Resolve against the process environment
    pub fn resolve(&self, profile: Option<&Profile>) -> Result<ResolvedSettings> {
        self.resolve_with(profile, |name| std::env::var(name).ok())
    }

    /// Resolve using a custom environment lookup
    ///
    /// All problems are collected before returning so the caller can report
    /// every offending attribute at once. Missing values are listed first,
    /// followed by format problems.
    pub fn resolve_with<F>(&self, profile: Option<&Profile>, env: F) -> Result<ResolvedSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |name: &str| env(name).filter(|v| !v.is_empty());
        let from_profile = |pick: fn(&Profile) -> Option<&String>| {
            profile.and_then(pick).filter(|v| !v.is_empty()).cloned()
        };

        let account_id = self
            .account_id
            .clone()
            .or_else(|| env_value(ENV_ACCOUNT_ID))
            .or_else(|| from_profile(|p| p.account_id.as_ref()))
            .unwrap_or_default();
        let cluster_id = self
            .cluster_id
            .clone()
            .or_else(|| env_value(ENV_CLUSTER_ID))
            .or_else(|| from_profile(|p| p.cluster_id.as_ref()))
            .unwrap_or_default();
        let token = self
            .token
            .clone()
            .or_else(|| env_value(ENV_TOKEN))
            .or_else(|| from_profile(|p| p.token.as_ref()))
            .unwrap_or_default();
        let url = self
            .url
            .clone()
            .or_else(|| env_value(ENV_URL))
            .or_else(|| from_profile(|p| p.url.as_ref()))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let mut issues = Vec::new();

        if account_id.is_empty() {
            issues.push(missing("account_id", "Account ID", ENV_ACCOUNT_ID));
        }
        if cluster_id.is_empty() {
            issues.push(missing("cluster_id", "Cluster ID", ENV_CLUSTER_ID));
        }
        if token.is_empty() {
            issues.push(missing("token", "Token", ENV_TOKEN));
        }

        let parsed_account = parse_uuid("account_id", "Account ID", &account_id, &mut issues);
        let parsed_cluster = parse_uuid("cluster_id", "Cluster ID", &cluster_id, &mut issues);

        let parsed_url = match Url::parse(&url) {
            Ok(u) => Some(u),
            Err(e) => {
                issues.push(SettingsIssue {
                    attribute: "url",
                    summary: "Invalid InfluxDB V3 URL".to_string(),
                    detail: format!("The provider cannot parse the URL \"{url}\": {e}"),
                });
                None
            }
        };

        match (parsed_account, parsed_cluster, parsed_url) {
            (Some(account_id), Some(cluster_id), Some(url)) if issues.is_empty() => {
                Ok(ResolvedSettings {
                    account_id,
                    cluster_id,
                    token,
                    url,
                    retry: profile.and_then(|p| p.retry.clone()).unwrap_or_default(),
                })
            }
            _ => Err(ConfigError::InvalidSettings(issues)),
        }
    }
}

fn missing(attribute: &'static str, label: &str, env: &str) -> SettingsIssue {
    SettingsIssue {
        attribute,
        summary: format!("Missing InfluxDB V3 {label}"),
        detail: format!(
            "The provider cannot create the InfluxDB V3 client as there is a missing or empty \
             value for the InfluxDB V3 {label}. Set the {attribute} value in the configuration \
             or use the {env} environment variable. If either is already set, ensure the value \
             is not empty."
        ),
    }
}

/// Parse a non-empty identifier as a UUID, recording an issue on failure
fn parse_uuid(
    attribute: &'static str,
    label: &str,
    value: &str,
    issues: &mut Vec<SettingsIssue>,
) -> Option<Uuid> {
    if value.is_empty() {
        return None;
    }
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            issues.push(SettingsIssue {
                attribute,
                summary: format!("Invalid InfluxDB V3 {label}"),
                detail: format!("The InfluxDB V3 {label} \"{value}\" is not a valid UUID."),
            });
            None
        }
    }
}
