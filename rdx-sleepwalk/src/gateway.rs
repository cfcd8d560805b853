//! Access to the remote cluster's mutable settings endpoint.
//!
//! The engine only ever needs two operations: read the current settings and
//! replace them with a template value. [`SettingsGateway`] is the seam; the
//! daemon uses [`HttpGateway`], tests substitute an in-memory fake.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::debug;

use crate::common::ClusterState;
use crate::config::SleepwalkConfig;
use crate::error::GatewayError;

/// Path of the cluster settings resource, relative to the gateway address.
pub const SETTINGS_PATH: &str = "/_cluster/settings";

/// Reads and writes cluster settings.
///
/// Calls are awaited one at a time by the engine; implementations should
/// bound each call so a hung endpoint cannot stall a pass forever.
pub trait SettingsGateway: Send + Sync {
    /// Fetches the current settings document.
    fn fetch(&self) -> impl Future<Output = Result<ClusterState, GatewayError>> + Send;

    /// Pushes a settings document verbatim and returns the endpoint's reply.
    fn push(&self, value: &str) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

/// `GET`/`PUT <address>/_cluster/settings` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    url: String,
}

impl HttpGateway {
    /// Builds a gateway whose every request is bounded by `timeout`.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{}", address.trim_end_matches('/'), SETTINGS_PATH),
        })
    }

    pub fn from_config(config: &SleepwalkConfig) -> Result<Self, GatewayError> {
        Self::new(&config.address, config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn read_body(&self, response: Response) -> Result<String, GatewayError> {
        let status = response.status();
        let body = response.text().await.map_err(|source| GatewayError::Transport {
            url: self.url.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl SettingsGateway for HttpGateway {
    fn fetch(&self) -> impl Future<Output = Result<ClusterState, GatewayError>> + Send {
        async move {
            debug!(url = %self.url, "Fetching cluster settings");
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|source| GatewayError::Transport {
                    url: self.url.clone(),
                    source,
                })?;

            self.read_body(response).await.map(ClusterState::new)
        }
    }

    fn push(&self, value: &str) -> impl Future<Output = Result<String, GatewayError>> + Send {
        let body = value.to_string();
        async move {
            debug!(url = %self.url, "Pushing cluster settings");
            let response = self
                .client
                .put(&self.url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|source| GatewayError::Transport {
                    url: self.url.clone(),
                    source,
                })?;

            self.read_body(response).await
        }
    }
}
