//! Group/version/resource addressing for namespaced API objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespaced resource collection on the API server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceType {
    /// API group; empty for the core group
    #[serde(default)]
    pub group: String,
    /// API version (e.g. "v1")
    pub version: String,
    /// Plural resource name (e.g. "configmaps")
    pub resource: String,
}

impl ResourceType {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self { group: group.into(), version: version.into(), resource: resource.into() }
    }

    /// core/v1 ConfigMaps
    pub fn config_maps() -> Self {
        Self::new("", "v1", "configmaps")
    }

    /// core/v1 Secrets
    pub fn secrets() -> Self {
        Self::new("", "v1", "secrets")
    }

    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }

    /// The `apiVersion` field value for objects of this type.
    pub fn api_version(&self) -> String {
        if self.is_core() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// REST path of the namespaced collection.
    pub fn collection_path(&self, namespace: &str) -> String {
        if self.is_core() {
            format!("/api/{}/namespaces/{}/{}", self.version, namespace, self.resource)
        } else {
            format!(
                "/apis/{}/{}/namespaces/{}/{}",
                self.group, self.version, namespace, self.resource
            )
        }
    }

    /// REST path of a single named object.
    pub fn object_path(&self, namespace: &str, name: &str) -> String {
        format!("{}/{}", self.collection_path(namespace), name)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_core() {
            write!(f, "{}.{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}.{}", self.resource, self.version, self.group)
        }
    }
}
