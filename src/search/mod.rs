//! Search service control-plane client
//!
//! Handles connection to the search service management REST API and provides
//! a configured client for use throughout the application.
//!
//! Every object kind maps to a fixed collection sub-path (see
//! [`ResourceKind::api_path`]); GET returns the current document or
//! not-found, PUT with the pinned api-version creates-or-replaces. The
//! service rejects payloads carrying server-generated OData metadata, which
//! the sanitizer and restorer strip before write-back.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::models::ResourceKind;

/// Pinned management API version (agentic retrieval preview surface)
pub const API_VERSION: &str = "2025-11-01-preview";

/// Upper bound for a single control-plane call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Control-plane errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure (connect, TLS, timeout). Fatal for the run.
    #[error("transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("{kind} '{name}' request failed with HTTP {status}: {body}")]
    Rejected {
        kind: ResourceKind,
        name: String,
        status: u16,
        body: String,
    },
}

/// Result type for control-plane operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Seam over the control-plane protocol, mockable in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch a document by identity. Not-found maps to `Ok(None)` so call
    /// sites can treat it as a non-fatal skip.
    async fn get_resource(&self, kind: ResourceKind, name: &str) -> ApiResult<Option<Value>>;

    /// List the names of every document of a kind on the service
    async fn list_names(&self, kind: ResourceKind) -> ApiResult<Vec<String>>;

    /// Create-or-replace a document by identity
    async fn put_resource(&self, kind: ResourceKind, name: &str, doc: &Value) -> ApiResult<()>;
}

/// Shape of a collection listing response
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    value: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
}

/// REST client for one search service
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SearchClient {
    /// Build a client for the given service endpoint and admin key.
    ///
    /// The endpoint is normalized to carry no trailing slash so URL
    /// assembly stays uniform.
    pub fn new(endpoint: &str, api_key: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn resource_url(&self, kind: ResourceKind, name: &str) -> String {
        format!("{}/{}/{}", self.endpoint, kind.api_path(), name)
    }

    fn collection_url(&self, kind: ResourceKind) -> String {
        format!("{}/{}", self.endpoint, kind.api_path())
    }

    /// Read the response body for diagnostics, tolerating read failures
    async fn error_body(response: reqwest::Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl SearchApi for SearchClient {
    async fn get_resource(&self, kind: ResourceKind, name: &str) -> ApiResult<Option<Value>> {
        let url = self.resource_url(kind, name);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("api-key", &self.api_key)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                kind,
                name: name.to_string(),
                status: status.as_u16(),
                body: Self::error_body(response).await,
            });
        }

        let doc = response
            .json::<Value>()
            .await
            .map_err(|source| ApiError::Transport { url, source })?;
        Ok(Some(doc))
    }

    async fn list_names(&self, kind: ResourceKind) -> ApiResult<Vec<String>> {
        let url = self.collection_url(kind);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("api-key", &self.api_key)
            .query(&[("api-version", API_VERSION)])
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                kind,
                name: "*".to_string(),
                status: status.as_u16(),
                body: Self::error_body(response).await,
            });
        }

        let listing = response
            .json::<ListResponse>()
            .await
            .map_err(|source| ApiError::Transport { url, source })?;
        Ok(listing.value.into_iter().map(|entry| entry.name).collect())
    }

    async fn put_resource(&self, kind: ResourceKind, name: &str, doc: &Value) -> ApiResult<()> {
        let url = self.resource_url(kind, name);
        tracing::debug!("PUT {}", url);

        let response = self
            .http
            .put(&url)
            .header("api-key", &self.api_key)
            .query(&[("api-version", API_VERSION)])
            .json(doc)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Rejected {
                kind,
                name: name.to_string(),
                status: status.as_u16(),
                body: Self::error_body(response).await,
            });
        }

        Ok(())
    }
}
