//! Annotation-backed store.
//!
//! Each key `k` is the annotation `kubestore/k` on an existing resource of
//! any kind. Only annotations carrying the prefix are visible; all others
//! are left alone. The host resource is owned elsewhere: this store never
//! creates or deletes it.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{codec, validate_key, BackendType, Store};
use crate::config::ClusterConfig;
use crate::errors::{Result, StoreError};
use crate::kube::{
    AnnotationPatch, HttpResourceClient, PartialObject, ResourceClient, ResourceType,
};

/// Fixed prefix marking the annotations owned by the store.
pub const ANNOTATION_PREFIX: &str = "kubestore";

/// Store backed by prefixed annotations on one named resource.
#[derive(Debug)]
pub struct AnnotationStore {
    client: Arc<dyn ResourceClient>,
    name: String,
}

impl AnnotationStore {
    /// Bind to the resource `name` through an existing client.
    pub fn new(client: Arc<dyn ResourceClient>, name: impl Into<String>) -> Self {
        Self { client, name: name.into() }
    }

    /// Bind to the resource `name` of type `resource` in the namespace of
    /// `cluster`.
    pub fn connect(
        cluster: &ClusterConfig,
        resource: ResourceType,
        name: impl Into<String>,
    ) -> Result<Self> {
        let client = HttpResourceClient::new(cluster, resource)?;
        Ok(Self::new(Arc::new(client), name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full annotation name for a logical key.
    fn annotation(key: &str) -> Result<String> {
        validate_key(key)?;
        if key.contains('/') {
            return Err(StoreError::invalid_key(key, "annotation keys cannot contain '/'"));
        }
        Ok(format!("{}/{}", ANNOTATION_PREFIX, key))
    }

    async fn fetch(&self) -> Result<Option<PartialObject>> {
        match self.client.get(&self.name).await {
            Ok(object) => PartialObject::from_value(object).map(Some),
            Err(e) if e.is_not_found_status() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Store for AnnotationStore {
    fn backend_type(&self) -> BackendType {
        BackendType::Annotation
    }

    async fn get_raw(&self, key: &str) -> Result<Vec<u8>> {
        let annotation = Self::annotation(key)?;

        let object = self.fetch().await?.ok_or_else(|| StoreError::not_found(key))?;
        object
            .metadata
            .annotations
            .and_then(|mut annotations| annotations.remove(&annotation))
            .map(String::into_bytes)
            .ok_or_else(|| StoreError::not_found(key))
    }

    /// A missing host resource is an error here, not a reason to create it.
    #[instrument(level = "debug", skip(self, data), fields(name = %self.name))]
    async fn set_raw(&self, key: &str, data: &[u8]) -> Result<()> {
        let annotation = Self::annotation(key)?;
        let text = codec::as_text(key, data)?;

        let patch = AnnotationPatch::set(&annotation, text).to_value()?;
        self.client.merge_patch(&self.name, &patch).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let Some(object) = self.fetch().await? else {
            return Ok(Vec::new());
        };

        let prefix = format!("{}/", ANNOTATION_PREFIX);
        Ok(object
            .annotations()
            .filter_map(|(name, _)| name.strip_prefix(&prefix))
            .map(str::to_string)
            .collect())
    }

    #[instrument(level = "debug", skip(self), fields(name = %self.name))]
    async fn delete(&self, key: &str) -> Result<()> {
        let annotation = Self::annotation(key)?;

        let patch = AnnotationPatch::remove(&annotation).to_value()?;
        match self.client.merge_patch(&self.name, &patch).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found_status() => {
                debug!(
                    resource = %self.client.resource_type(),
                    name = %self.name,
                    "Host resource missing, nothing to delete"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
