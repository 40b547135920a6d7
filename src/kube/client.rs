//! Access handle for one resource collection in one namespace.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Certificate, Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use super::resource::ResourceType;
use super::status::error_from_response;
use crate::config::ClusterConfig;
use crate::errors::{Result, StoreError};

/// Content type for JSON merge patches (RFC 7386).
pub const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Operations the stores need from the API server, scoped to one resource
/// type and one namespace.
///
/// Failures are returned as [`StoreError::Api`] so callers can classify a
/// missing object with [`StoreError::is_not_found_status`].
#[async_trait]
pub trait ResourceClient: Send + Sync + std::fmt::Debug {
    /// The resource collection this client is bound to
    fn resource_type(&self) -> &ResourceType;

    /// Fetch an object by name
    async fn get(&self, name: &str) -> Result<Value>;

    /// Apply a JSON merge patch and return the resulting object
    async fn merge_patch(&self, name: &str, patch: &Value) -> Result<Value>;

    /// Create an object and return it as stored
    async fn create(&self, object: &Value) -> Result<Value>;

    /// Delete an object by name
    async fn delete(&self, name: &str) -> Result<()>;
}

/// [`ResourceClient`] talking to the API server over HTTPS with `reqwest`.
#[derive(Clone)]
pub struct HttpResourceClient {
    client: Client,
    api_url: String,
    token: Option<String>,
    namespace: String,
    resource: ResourceType,
}

impl std::fmt::Debug for HttpResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResourceClient")
            .field("api_url", &self.api_url)
            .field("namespace", &self.namespace)
            .field("resource", &self.resource)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpResourceClient {
    /// Create a client for `resource` in the namespace of `config`.
    pub fn new(config: &ClusterConfig, resource: ResourceType) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_seconds));

        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|e| {
                StoreError::config(format!("Failed to read CA bundle {}: {}", path.display(), e))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                StoreError::config(format!("Invalid CA bundle {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder.build()?;

        debug!(
            api_url = %config.api_url,
            namespace = %config.namespace,
            resource = %resource,
            "Created API resource client"
        );

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            namespace: config.namespace.clone(),
            resource,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.api_url, self.resource.collection_path(&self.namespace))
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}{}", self.api_url, self.resource.object_path(&self.namespace, name))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check status and decode the returned object.
    async fn handle_response(response: Response) -> Result<Value> {
        let status = response.status();
        trace!(%status, "API response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| StoreError::decode("response", e.to_string()))
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    fn resource_type(&self) -> &ResourceType {
        &self.resource
    }

    async fn get(&self, name: &str) -> Result<Value> {
        let url = self.object_url(name);
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::handle_response(response).await
    }

    async fn merge_patch(&self, name: &str, patch: &Value) -> Result<Value> {
        let url = self.object_url(name);
        debug!("PATCH {}", url);

        let body = serde_json::to_vec(patch).map_err(StoreError::Encode)?;
        let response = self
            .authorize(self.client.patch(&url))
            .header(CONTENT_TYPE, MERGE_PATCH_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn create(&self, object: &Value) -> Result<Value> {
        let url = self.collection_url();
        debug!("POST {}", url);

        let response = self.authorize(self.client.post(&url)).json(object).send().await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let url = self.object_url(name);
        debug!("DELETE {}", url);

        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::handle_response(response).await.map(|_| ())
    }
}
