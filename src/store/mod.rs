//! # Key/Value Store Contract
//!
//! Every backend implements the same four operations over string keys:
//!
//! - **get**: fetch and decode the entry for a key
//! - **set**: encode and upsert the entry for a key
//! - **list**: enumerate the keys currently present
//! - **delete**: remove the entry for a key (idempotent)
//!
//! ```text
//!            ┌───────────────┐
//!            │ Store (trait) │  + StoreExt (typed get/set)
//!            └───────┬───────┘
//!     ┌──────────┬───┴──────┬────────────┐
//! ┌───▼─────┐┌───▼────┐┌────▼──────┐┌────▼────┐
//! │ConfigMap││ Secret ││Annotation ││  File   │
//! └─────────┘└────────┘└───────────┘└─────────┘
//! ```
//!
//! A missing key and a missing container produce the same
//! [`StoreError::NotFound`]; callers cannot tell them apart.
//!
//! # Example
//!
//! ```rust,no_run
//! use kubestore::store::{FileStore, StoreExt};
//!
//! async fn example() -> kubestore::Result<()> {
//!     let store = FileStore::new("/var/lib/app/state");
//!     store.set("replicas", &3).await?;
//!     let replicas: u32 = store.get("replicas").await?;
//!     assert_eq!(replicas, 3);
//!     Ok(())
//! }
//! ```

pub mod annotation;
pub mod builder;
pub mod codec;
pub mod data;
pub mod file;

pub use annotation::{AnnotationStore, ANNOTATION_PREFIX};
pub use builder::build_store;
pub use data::{ConfigMapKind, ConfigMapStore, DataKind, DataStore, SecretKind, SecretStore};
pub use file::FileStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::Instrument;

use crate::errors::{Result, StoreError};

/// Which backend a store is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Entries in a ConfigMap's `data`
    #[serde(rename = "configmap", alias = "config_map")]
    ConfigMap,
    /// Entries in a Secret's `data`
    Secret,
    /// Prefixed annotations on an existing resource
    Annotation,
    /// Files in a local directory
    File,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMap => "configmap",
            Self::Secret => "secret",
            Self::Annotation => "annotation",
            Self::File => "file",
        }
    }

    /// Whether the store creates its container on write and removes it once
    /// empty.
    pub fn owns_container(&self) -> bool {
        !matches!(self, Self::Annotation)
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "configmap" | "config_map" => Ok(Self::ConfigMap),
            "secret" => Ok(Self::Secret),
            "annotation" => Ok(Self::Annotation),
            "file" | "filesystem" => Ok(Self::File),
            _ => Err(format!("Unknown store backend type: {}", s)),
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Core trait for key/value store backends.
///
/// Values cross this trait as encoded bytes; use [`StoreExt`] for typed
/// access. Implementations hold no cache and re-read their container on
/// every call.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Get the backend type identifier
    fn backend_type(&self) -> BackendType;

    /// Fetch the encoded entry for `key`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the key or its container is absent
    /// - [`StoreError::Decode`] if the stored entry cannot be read back
    async fn get_raw(&self, key: &str) -> Result<Vec<u8>>;

    /// Upsert the encoded entry for `key`, leaving sibling keys untouched.
    async fn set_raw(&self, key: &str, data: &[u8]) -> Result<()>;

    /// List every key present. An absent container yields an empty list.
    async fn list(&self) -> Result<Vec<String>>;

    /// Remove the entry for `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Typed access on top of [`Store`], routed through the JSON codec.
#[async_trait]
pub trait StoreExt: Store {
    /// Fetch and decode the value stored under `key`
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<T> {
        let span = crate::store_span!("get", self.backend_type(), key);
        let data = self.get_raw(key).instrument(span).await?;
        codec::decode(key, &data)
    }

    /// Encode `value` and store it under `key`
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let span = crate::store_span!("set", self.backend_type(), key);
        let data = codec::encode(value)?;
        self.set_raw(key, &data).instrument(span).await
    }

    /// Check whether `key` is present without decoding it
    async fn contains(&self, key: &str) -> Result<bool> {
        match self.get_raw(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// Rejects keys no backend can hold.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(key, "key must not be empty"));
    }
    Ok(())
}
