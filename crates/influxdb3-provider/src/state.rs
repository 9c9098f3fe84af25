//! Shared provider state
//!
//! `configure` stores one [`ProviderData`] here; every resource and data
//! source reads it on each call. Until then calls fail with
//! [`ProviderError::NotConfigured`].

use std::sync::Arc;

use influxdb3_core::InfluxDbClient;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProviderError, Result};

/// Connection data handed to resources and data sources
#[derive(Debug, Clone)]
pub struct ProviderData {
    pub client: InfluxDbClient,
    pub account_id: Uuid,
    pub cluster_id: Uuid,
}

impl ProviderData {
    pub fn new(client: InfluxDbClient) -> Self {
        Self {
            account_id: client.account_id(),
            cluster_id: client.cluster_id(),
            client,
        }
    }
}

/// Holder for the configured [`ProviderData`]
#[derive(Debug, Default)]
pub struct ProviderState {
    data: RwLock<Option<Arc<ProviderData>>>,
}

impl ProviderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that is already configured, mainly for embedding and tests
    pub fn with_data(data: ProviderData) -> Self {
        Self {
            data: RwLock::new(Some(Arc::new(data))),
        }
    }

    /// Replace the configured data; a previous client is closed
    pub async fn set(&self, data: ProviderData) {
        let previous = self.data.write().await.replace(Arc::new(data));
        if let Some(previous) = previous.and_then(|p| Arc::try_unwrap(p).ok()) {
            previous.client.close();
        }
    }

    /// Get the configured data
    pub async fn get(&self) -> Result<Arc<ProviderData>> {
        self.data
            .read()
            .await
            .clone()
            .ok_or(ProviderError::NotConfigured)
    }

    pub async fn is_configured(&self) -> bool {
        self.data.read().await.is_some()
    }
}
