//! ConfigMap- and Secret-backed stores.
//!
//! Each key is one entry of the named object's flat `data` map. Writes are
//! single-entry merge patches, so sibling keys are never rewritten. The
//! store owns the object's lifecycle: it is created on the first write and
//! deleted once a delete leaves its `data` empty.
//!
//! Both flavors share [`DataStore`]; [`DataKind`] supplies the differences.
//! Secrets are written through `stringData` (plaintext the API server folds
//! into base64 `data`) but read and deleted through `data`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{codec, validate_key, BackendType, Store};
use crate::config::ClusterConfig;
use crate::errors::{Result, StoreError};
use crate::kube::{
    DataField, DataObject, DataPatch, HttpResourceClient, ResourceClient, ResourceType,
};

/// The per-kind half of the structured-resource protocol.
pub trait DataKind: Send + Sync + 'static {
    /// Object `kind`
    const KIND: &'static str;

    /// Map that writes go through
    const WRITE_FIELD: DataField;

    fn backend_type() -> BackendType;

    fn resource_type() -> ResourceType;

    /// Turn one wire value of the `data` map back into the stored bytes.
    fn decode_entry(key: &str, raw: String) -> Result<Vec<u8>>;
}

/// ConfigMap flavor: `data` holds the JSON text directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigMapKind;

impl DataKind for ConfigMapKind {
    const KIND: &'static str = "ConfigMap";
    const WRITE_FIELD: DataField = DataField::Data;

    fn backend_type() -> BackendType {
        BackendType::ConfigMap
    }

    fn resource_type() -> ResourceType {
        ResourceType::config_maps()
    }

    fn decode_entry(_key: &str, raw: String) -> Result<Vec<u8>> {
        Ok(raw.into_bytes())
    }
}

/// Secret flavor: written via `stringData`, stored base64 in `data`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretKind;

impl DataKind for SecretKind {
    const KIND: &'static str = "Secret";
    const WRITE_FIELD: DataField = DataField::StringData;

    fn backend_type() -> BackendType {
        BackendType::Secret
    }

    fn resource_type() -> ResourceType {
        ResourceType::secrets()
    }

    fn decode_entry(key: &str, raw: String) -> Result<Vec<u8>> {
        STANDARD
            .decode(raw.as_bytes())
            .map_err(|e| StoreError::decode(key, format!("invalid base64 in secret data: {}", e)))
    }
}

/// Store backed by the `data` map of one named ConfigMap
pub type ConfigMapStore = DataStore<ConfigMapKind>;

/// Store backed by the `data` map of one named Secret
pub type SecretStore = DataStore<SecretKind>;

/// Store backed by the flat data map of one named object.
pub struct DataStore<K: DataKind> {
    client: Arc<dyn ResourceClient>,
    name: String,
    _kind: PhantomData<K>,
}

impl<K: DataKind> fmt::Debug for DataStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("kind", &K::KIND)
            .field("name", &self.name)
            .field("client", &self.client)
            .finish()
    }
}

impl<K: DataKind> DataStore<K> {
    /// Bind to the object `name` through an existing client.
    ///
    /// Requests go to whatever collection the client addresses; `K` only
    /// decides the object shape.
    pub fn new(client: Arc<dyn ResourceClient>, name: impl Into<String>) -> Self {
        Self { client, name: name.into(), _kind: PhantomData }
    }

    /// Bind to the object `name` in the namespace of `cluster`.
    pub fn connect(cluster: &ClusterConfig, name: impl Into<String>) -> Result<Self> {
        let client = HttpResourceClient::new(cluster, K::resource_type())?;
        Ok(Self::new(Arc::new(client), name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch the backing object; `None` when it does not exist.
    async fn fetch(&self) -> Result<Option<DataObject>> {
        match self.client.get(&self.name).await {
            Ok(object) => DataObject::from_value(object).map(Some),
            Err(e) if e.is_not_found_status() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create the backing object with no entries.
    ///
    /// Losing a creation race to another writer is fine: the object exists
    /// either way.
    async fn create(&self) -> Result<()> {
        let object = json!({
            "apiVersion": self.client.resource_type().api_version(),
            "kind": K::KIND,
            "metadata": { "name": self.name },
        });

        match self.client.create(&object).await {
            Ok(_) => {
                debug!(kind = K::KIND, name = %self.name, "Created backing object");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                debug!(kind = K::KIND, name = %self.name, "Backing object created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Best-effort removal of the emptied backing object. Failures are
    /// discarded; the key removal has already succeeded.
    async fn remove_if_empty(&self, patched: Value) {
        let empty = DataObject::from_value(patched).map(|object| object.is_empty());
        if !matches!(empty, Ok(true)) {
            return;
        }

        match self.client.delete(&self.name).await {
            Ok(()) => debug!(kind = K::KIND, name = %self.name, "Deleted empty backing object"),
            Err(e) => {
                debug!(kind = K::KIND, name = %self.name, error = %e, "Ignoring cleanup failure")
            }
        }
    }
}

#[async_trait]
impl<K: DataKind> Store for DataStore<K> {
    fn backend_type(&self) -> BackendType {
        K::backend_type()
    }

    async fn get_raw(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;

        let object = self.fetch().await?.ok_or_else(|| StoreError::not_found(key))?;
        let raw = object.into_data().remove(key).ok_or_else(|| StoreError::not_found(key))?;
        K::decode_entry(key, raw)
    }

    #[instrument(level = "debug", skip(self, data), fields(kind = K::KIND, name = %self.name))]
    async fn set_raw(&self, key: &str, data: &[u8]) -> Result<()> {
        validate_key(key)?;

        let text = codec::as_text(key, data)?;
        let patch = DataPatch::set(K::WRITE_FIELD, key, text).to_value()?;

        // At most one creation, then a single retry of the patch.
        let mut created = false;
        loop {
            match self.client.merge_patch(&self.name, &patch).await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_not_found_status() && !created => {
                    debug!(kind = K::KIND, name = %self.name, "Backing object missing, creating");
                    self.create().await?;
                    created = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(match self.fetch().await? {
            Some(object) => object.into_data().into_keys().collect(),
            None => Vec::new(),
        })
    }

    #[instrument(level = "debug", skip(self), fields(kind = K::KIND, name = %self.name))]
    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        let patch = DataPatch::remove(key).to_value()?;
        let patched = match self.client.merge_patch(&self.name, &patch).await {
            Ok(object) => object,
            Err(e) if e.is_not_found_status() => return Ok(()),
            Err(e) => return Err(e),
        };

        self.remove_if_empty(patched).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kube::MemoryResourceClient;
    use crate::store::StoreExt;
    use tracing_test::traced_test;

    fn config_map_store() -> (Arc<MemoryResourceClient>, ConfigMapStore) {
        let client = Arc::new(MemoryResourceClient::new(ResourceType::config_maps()));
        let store = ConfigMapStore::new(client.clone(), "state");
        (client, store)
    }

    fn secret_store() -> (Arc<MemoryResourceClient>, SecretStore) {
        let client = Arc::new(MemoryResourceClient::new(ResourceType::secrets()));
        let store = SecretStore::new(client.clone(), "creds");
        (client, store)
    }

    #[tokio::test]
    async fn test_set_creates_config_map() {
        let (client, store) = config_map_store();
        assert!(!client.contains("state"));

        store.set("x", &"hello").await.unwrap();

        let object = client.object("state").unwrap();
        assert_eq!(object["kind"], "ConfigMap");
        assert_eq!(object["apiVersion"], "v1");
        assert_eq!(object["data"], json!({"x": "\"hello\""}));
        assert_eq!(store.get::<String>("x").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_get_missing_container_and_missing_key() {
        let (client, store) = config_map_store();
        assert!(store.get_raw("x").await.unwrap_err().is_not_found());

        client.insert(json!({"metadata": {"name": "state"}, "data": {"y": "1"}})).unwrap();
        assert!(store.get_raw("x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_set_overwrites_and_keeps_siblings() {
        let (_client, store) = config_map_store();
        store.set("a", &1).await.unwrap();
        store.set("b", &2).await.unwrap();
        store.set("a", &10).await.unwrap();

        assert_eq!(store.get::<i32>("a").await.unwrap(), 10);
        assert_eq!(store.get::<i32>("b").await.unwrap(), 2);
        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_delete_last_key_removes_container() {
        let (client, store) = config_map_store();
        store.set("k1", &"v1").await.unwrap();
        store.set("k2", &"v2").await.unwrap();

        store.delete("k1").await.unwrap();
        assert!(client.contains("state"));
        assert_eq!(store.list().await.unwrap(), vec!["k2"]);
        assert_eq!(store.get::<String>("k2").await.unwrap(), "v2");

        store.delete("k2").await.unwrap();
        assert!(!client.contains("state"));
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.get_raw("k2").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (client, store) = config_map_store();
        store.delete("never-written").await.unwrap();

        store.set("present", &true).await.unwrap();
        store.delete("never-written").await.unwrap();
        assert!(client.contains("state"));
        assert_eq!(store.list().await.unwrap(), vec!["present"]);
    }

    #[tokio::test]
    async fn test_decode_error_is_not_not_found() {
        let (client, store) = config_map_store();
        client.insert(json!({"metadata": {"name": "state"}, "data": {"n": "not json"}})).unwrap();

        let err = store.get::<u32>("n").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_secret_roundtrip_through_string_data() {
        let (client, store) = secret_store();
        store.set("token", &"abc").await.unwrap();

        let object = client.object("creds").unwrap();
        assert_eq!(object["kind"], "Secret");
        assert_eq!(object["data"]["token"], "ImFiYyI=");
        assert!(object.get("stringData").is_none());

        assert_eq!(store.get::<String>("token").await.unwrap(), "abc");
        assert_eq!(store.list().await.unwrap(), vec!["token"]);

        store.delete("token").await.unwrap();
        assert!(!client.contains("creds"));
    }

    #[tokio::test]
    async fn test_secret_invalid_base64_is_decode_error() {
        let (client, store) = secret_store();
        client.insert(json!({"metadata": {"name": "creds"}, "data": {"bad": "%%%"}})).unwrap();

        let err = store.get_raw("bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_value_rejected() {
        let (client, store) = config_map_store();
        let err = store.set_raw("bin", &[0xc3, 0x28]).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { .. }));
        assert!(!client.contains("state"));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let (_client, store) = secret_store();
        assert!(matches!(store.set("", &1).await, Err(StoreError::InvalidKey { .. })));
        assert!(matches!(store.delete("").await, Err(StoreError::InvalidKey { .. })));
    }

    #[test]
    fn test_backend_types() {
        let (_c, cm) = config_map_store();
        let (_c, secret) = secret_store();
        assert_eq!(cm.backend_type(), BackendType::ConfigMap);
        assert_eq!(secret.backend_type(), BackendType::Secret);
        assert_eq!(cm.name(), "state");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_secret_values_never_logged() {
        let (_client, store) = secret_store();
        store.set("password", &"hunter2").await.unwrap();
        store.delete("password").await.unwrap();

        assert!(logs_contain("Created backing object"));
        assert!(logs_contain("Deleted empty backing object"));
        assert!(!logs_contain("hunter2"));
    }

    #[tokio::test]
    async fn test_new_accepts_client_for_other_collection() {
        let client = Arc::new(MemoryResourceClient::new(ResourceType::new("", "v1", "settings")));
        let store = ConfigMapStore::new(client.clone(), "state");

        store.set("k", &1).await.unwrap();
        assert_eq!(store.get::<i32>("k").await.unwrap(), 1);
        assert!(client.contains("state"));
    }
}
