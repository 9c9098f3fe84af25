//! Error types for provider operations

use influxdb3_core::{ConfigError, CoreError};
use serde::Deserialize;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, Diagnostics};

/// Errors that can occur while serving provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A management API call failed
    #[error("{context}: {source}")]
    Api {
        summary: String,
        context: String,
        #[source]
        source: CoreError,
    },

    /// Loading the profile file or resolving settings failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A value in the configuration, plan or state is unusable
    #[error("{summary}: {detail}")]
    InvalidValue {
        attribute: Option<String>,
        summary: String,
        detail: String,
    },

    /// The remote object backing a state no longer exists
    #[error("{summary}: {detail}")]
    NotFound { summary: String, detail: String },

    /// A resource or data source was used before `configure` succeeded
    #[error("Provider not configured")]
    NotConfigured,

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    /// A document did not match the schema's shape
    #[error("invalid {what} document: {source}")]
    Document {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    /// Wrap an API failure with the summary and context shown to users
    pub fn api(summary: impl Into<String>, context: impl Into<String>, source: CoreError) -> Self {
        ProviderError::Api {
            summary: summary.into(),
            context: context.into(),
            source,
        }
    }

    pub fn invalid(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        ProviderError::InvalidValue {
            attribute: None,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_attribute(
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ProviderError::InvalidValue {
            attribute: Some(attribute.into()),
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    pub fn document(what: &'static str, source: serde_json::Error) -> Self {
        ProviderError::Document { what, source }
    }

    /// Convert into the diagnostics reported to the host
    pub fn into_diagnostics(self) -> Diagnostics {
        match self {
            ProviderError::Api {
                summary,
                context,
                source,
            } => {
                let mut detail = format!("{context}: {source}");
                if let Some(extra) = source.body().and_then(format_error_body) {
                    detail.push('\n');
                    detail.push_str(&extra);
                }
                Diagnostic::error(summary, detail).into()
            }
            ProviderError::Config(ConfigError::InvalidSettings(issues)) => issues
                .into_iter()
                .map(|issue| {
                    Diagnostic::error(issue.summary, issue.detail).with_attribute(issue.attribute)
                })
                .collect(),
            ProviderError::Config(e) => {
                Diagnostic::error("Unable to Load InfluxDB V3 Configuration", e.to_string()).into()
            }
            ProviderError::InvalidValue {
                attribute,
                summary,
                detail,
            } => {
                let diag = Diagnostic::error(summary, detail);
                match attribute {
                    Some(path) => diag.with_attribute(path).into(),
                    None => diag.into(),
                }
            }
            ProviderError::NotFound { summary, detail } => {
                Diagnostic::error(summary, detail).into()
            }
            ProviderError::NotConfigured => Diagnostic::error(
                "Provider not configured",
                "The provider has not been configured. Configure the provider with valid \
                 credentials before using resources or data sources.",
            )
            .into(),
            e @ (ProviderError::UnknownResource(_) | ProviderError::UnknownDataSource(_)) => {
                Diagnostic::error(e.to_string(), "").into()
            }
            e @ ProviderError::Document { .. } => {
                Diagnostic::error("Invalid Document", e.to_string()).into()
            }
        }
    }
}

/// Error body the management API returns alongside 4xx/5xx statuses
#[derive(Deserialize)]
struct ApiErrorBody {
    code: i64,
    message: String,
}

/// Render an API error body for humans, if it has the expected shape
fn format_error_body(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    Some(format!(
        "Error Code: {}\nError Message: {}",
        parsed.code, parsed.message
    ))
}

impl From<ProviderError> for Diagnostics {
    fn from(err: ProviderError) -> Self {
        err.into_diagnostics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influxdb3_core::SettingsIssue;

    #[test]
    fn test_api_error_includes_server_message() {
        let err = ProviderError::api(
            "Error creating database",
            "Could not create database, unexpected error",
            CoreError::BadRequest {
                body: r#"{"code":400,"message":"name already exists"}"#.to_string(),
            },
        );
        let diags = err.into_diagnostics();
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Error creating database");
        assert!(
            diag.detail
                .starts_with("Could not create database, unexpected error: bad request")
        );
        assert!(diag.detail.contains("Error Message: name already exists"));
    }

    #[test]
    fn test_api_error_with_plain_body() {
        let err = ProviderError::api(
            "Error getting token",
            "Could not get token",
            CoreError::UnexpectedStatus {
                status: 502,
                body: "<html>bad gateway</html>".to_string(),
            },
        );
        let diags = err.into_diagnostics();
        assert_eq!(
            diags.iter().next().unwrap().detail,
            "Could not get token: unexpected status code: 502"
        );
    }

    #[test]
    fn test_settings_issues_become_attribute_diagnostics() {
        let err = ProviderError::Config(ConfigError::InvalidSettings(vec![
            SettingsIssue {
                attribute: "account_id",
                summary: "Missing InfluxDB V3 Account ID".to_string(),
                detail: "set it".to_string(),
            },
            SettingsIssue {
                attribute: "token",
                summary: "Missing InfluxDB V3 Token".to_string(),
                detail: "set it".to_string(),
            },
        ]));
        let diags = err.into_diagnostics();
        let attrs: Vec<_> = diags.iter().filter_map(|d| d.attribute.clone()).collect();
        assert_eq!(attrs, vec!["account_id", "token"]);
    }

    #[test]
    fn test_not_configured() {
        let diags = ProviderError::NotConfigured.into_diagnostics();
        assert!(diags.has_errors());
        assert_eq!(diags.iter().next().unwrap().summary, "Provider not configured");
    }
}
