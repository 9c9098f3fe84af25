//! Profile file management
//!
//! Connection settings can be kept in a TOML file with multiple named
//! profiles. Values may reference environment variables with `${VAR}` or
//! `${VAR:-default}`; they are expanded when the file is loaded.
//!
//! ```toml
//! default_profile = "production"
//!
//! [profiles.production]
//! account_id = "0b1f6a1e-2c3d-4e5f-8a9b-0c1d2e3f4a5b"
//! cluster_id = "9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a"
//! token = "${INFLUXDB3_PRODUCTION_TOKEN}"
//!
//! [profiles.production.retry]
//! max_retries = 5
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::resilience::RetryConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named explicitly
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
///
/// Every field is optional; unset fields fall through to environment
/// variables or defaults during settings resolution.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Retry configuration for this profile
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Config {
    /// Resolve the profile to use
    ///
    /// An explicitly named profile must exist. Without one, the configured
    /// default is used if present; otherwise no profile applies.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<Option<&Profile>> {
        let name = match explicit_profile.or(self.default_profile.as_deref()) {
            Some(name) => name,
            None => return Ok(None),
        };

        self.profiles
            .get(name)
            .map(Some)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields an empty configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/influxdb3/config.toml` is preferred when it (or
    /// its directory) exists, falling back to the platform default.
    ///
    /// On Linux: ~/.config/influxdb3/config.toml
    /// On Windows: %APPDATA%\influxdata\influxdb3\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("influxdb3")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "influxdata", "influxdb3").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables without a default are left as-is so that profiles
    /// which are never selected do not fail to load.
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(account: &str) -> Profile {
        Profile {
            account_id: Some(account.to_string()),
            cluster_id: Some("9f8e7d6c-5b4a-4392-8170-6f5e4d3c2b1a".to_string()),
            token: Some("secret".to_string()),
            url: None,
            retry: None,
        }
    }

    #[test]
    fn test_resolve_profile_explicit_and_default() {
        let mut config = Config::default();
        config.profiles.insert("a".to_string(), profile("acct-a"));
        config.profiles.insert("b".to_string(), profile("acct-b"));

        assert!(config.resolve_profile(None).unwrap().is_none());

        config.default_profile = Some("b".to_string());
        let resolved = config.resolve_profile(None).unwrap().unwrap();
        assert_eq!(resolved.account_id.as_deref(), Some("acct-b"));

        let resolved = config.resolve_profile(Some("a")).unwrap().unwrap();
        assert_eq!(resolved.account_id.as_deref(), Some("acct-a"));
    }

    #[test]
    fn test_resolve_unknown_profile() {
        let config = Config::default();
        let err = config.resolve_profile(Some("missing")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { ref name } if name == "missing"));
        assert_eq!(err.to_string(), "Profile 'missing' not found");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion() {
        unsafe {
            std::env::set_var("INFLUXDB3_TEST_TOKEN", "expanded-token");
            std::env::remove_var("INFLUXDB3_TEST_MISSING_URL");
        }

        let content = r#"
[profiles.test]
token = "${INFLUXDB3_TEST_TOKEN}"
url = "${INFLUXDB3_TEST_MISSING_URL:-https://console.example.com}"
account_id = "${INFLUXDB3_TEST_UNSET}"
"#;

        let expanded = Config::expand_env_vars(content);
        let config: Config = toml::from_str(&expanded).unwrap();
        let profile = config.profiles.get("test").unwrap();

        assert_eq!(profile.token.as_deref(), Some("expanded-token"));
        assert_eq!(profile.url.as_deref(), Some("https://console.example.com"));
        assert_eq!(
            profile.account_id.as_deref(),
            Some("${INFLUXDB3_TEST_UNSET}")
        );

        unsafe {
            std::env::remove_var("INFLUXDB3_TEST_TOKEN");
        }
    }

    #[test]
    fn test_profile_retry_section() {
        let content = r#"
[profiles.test]
token = "t"

[profiles.test.retry]
enabled = false
"#;
        let config: Config = toml::from_str(content).unwrap();
        let retry = config.profiles["test"].retry.clone().unwrap();
        assert!(!retry.enabled);
        assert_eq!(retry.max_retries, 3);
    }
}
