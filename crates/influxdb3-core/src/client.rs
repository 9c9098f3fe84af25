//! HTTP client for the InfluxDB V3 management API
//!
//! Every call is scoped to one account and cluster:
//! `{host}/api/v0/accounts/{account_id}/clusters/{cluster_id}/`.
//! Requests carry a bearer token and JSON content headers, and only a small
//! set of success statuses is accepted per call. Transient failures are
//! retried according to [`RetryConfig`].

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::{DEFAULT_URL, ResolvedSettings, RetryConfig};
use crate::databases::DatabaseHandler;
use crate::error::{CoreError, Result};
use crate::tokens::TokenHandler;

const JSON: &str = "application/json";

/// Settings needed to build an [`InfluxDbClient`]
#[derive(Clone)]
pub struct ClientConfig {
    pub account_id: Uuid,
    pub cluster_id: Uuid,
    /// Base URL of the management console
    pub host: String,
    pub token: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("account_id", &self.account_id)
            .field("cluster_id", &self.cluster_id)
            .field("host", &self.host)
            .field("token", &"***")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config against the default console with default timeout and retries
    #[must_use]
    pub fn new(account_id: Uuid, cluster_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            account_id,
            cluster_id,
            host: DEFAULT_URL.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }

    /// Set the console host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl From<&ResolvedSettings> for ClientConfig {
    fn from(settings: &ResolvedSettings) -> Self {
        ClientConfig::new(
            settings.account_id,
            settings.cluster_id,
            settings.token.clone(),
        )
        .with_host(settings.url.as_str())
        .with_retry(settings.retry.clone())
    }
}

/// Management API client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct InfluxDbClient {
    http: reqwest::Client,
    api_url: Url,
    token: String,
    account_id: Uuid,
    cluster_id: Uuid,
    retry: RetryConfig,
}

impl std::fmt::Debug for InfluxDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxDbClient")
            .field("api_url", &self.api_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl InfluxDbClient {
    /// Build a client from its configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_url = api_url(&config.host, config.account_id, config.cluster_id)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        debug!(
            api_url = %api_url,
            retries = config.retry.retries(),
            "created management API client"
        );

        Ok(Self {
            http,
            api_url,
            token: config.token,
            account_id: config.account_id,
            cluster_id: config.cluster_id,
            retry: config.retry,
        })
    }

    #[must_use]
    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    #[must_use]
    pub fn cluster_id(&self) -> Uuid {
        self.cluster_id
    }

    /// Base URL all API paths are resolved against
    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Database operations
    #[must_use]
    pub fn databases(&self) -> DatabaseHandler {
        DatabaseHandler::new(self.clone())
    }

    /// Token operations
    #[must_use]
    pub fn tokens(&self) -> TokenHandler {
        TokenHandler::new(self.clone())
    }

    /// Release the client and its pooled connections
    pub fn close(self) {
        debug!(api_url = %self.api_url, "closing management API client");
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::GET, path, None, &[StatusCode::OK]).await?;
        decode(&body)
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T> {
        let payload = serde_json::to_vec(payload).map_err(CoreError::Encode)?;
        let body = self
            .execute(Method::POST, path, Some(payload), &[StatusCode::OK])
            .await?;
        decode(&body)
    }

    pub(crate) async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T> {
        let payload = serde_json::to_vec(payload).map_err(CoreError::Encode)?;
        let body = self
            .execute(Method::PATCH, path, Some(payload), &[StatusCode::OK])
            .await?;
        decode(&body)
    }

    /// DELETE accepts both 204 and 200; any body is ignored
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(
            Method::DELETE,
            path,
            None,
            &[StatusCode::NO_CONTENT, StatusCode::OK],
        )
        .await?;
        Ok(())
    }

    /// Send a request, retrying transient failures
    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        accepted: &[StatusCode],
    ) -> Result<Vec<u8>> {
        let url = self.api_url.join(path)?;
        let max_retries = self.retry.retries();
        let mut attempt = 0;

        loop {
            match self
                .send_once(method.clone(), &url, payload.clone(), accepted)
                .await
            {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let wait = self.retry.backoff(attempt);
                    warn!(
                        method = %method,
                        path = %path,
                        attempt,
                        max_retries,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "retrying management API request"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        payload: Option<Vec<u8>>,
        accepted: &[StatusCode],
    ) -> Result<Vec<u8>> {
        debug!(method = %method, path = %url.path(), "sending management API request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, HeaderValue::from_static(JSON))
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON))
            .bearer_auth(&self.token);
        if let Some(payload) = payload {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!(method = %method, path = %url.path(), status = status.as_u16(), "received response");

        if accepted.contains(&status) {
            Ok(body)
        } else {
            Err(CoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}

/// Build the account/cluster scoped API root from a console host
///
/// Any path on the host is kept; the result always ends with `/` so that
/// relative API paths join beneath it.
fn api_url(host: &str, account_id: Uuid, cluster_id: Uuid) -> Result<Url> {
    let mut url = if host.ends_with('/') {
        Url::parse(host)?
    } else {
        Url::parse(&format!("{host}/"))?
    };
    if url.cannot_be_a_base() {
        return Err(CoreError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
    }

    let path = format!(
        "{}api/v0/accounts/{account_id}/clusters/{cluster_id}/",
        url.path()
    );
    url.set_path(&path);
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(CoreError::Decode)
}

/// Percent-encode a single path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
