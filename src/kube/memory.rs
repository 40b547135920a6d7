//! In-process [`ResourceClient`] that behaves like an API server for a
//! single resource collection.
//!
//! Objects live in a `DashMap` keyed by name. Merge patches follow RFC 7386,
//! missing objects produce 404 `NotFound` statuses and duplicate creates
//! produce 409 `AlreadyExists`, so store code sees the same errors it would
//! see from a real cluster. For Secrets, `stringData` is folded into base64
//! `data` on every write, as the API server does.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};

use super::client::ResourceClient;
use super::resource::ResourceType;
use super::status::Status;
use crate::errors::{Result, StoreError};

#[derive(Debug)]
pub struct MemoryResourceClient {
    resource: ResourceType,
    objects: DashMap<String, Value>,
}

impl MemoryResourceClient {
    pub fn new(resource: ResourceType) -> Self {
        Self { resource, objects: DashMap::new() }
    }

    /// Store an object as-is, replacing any object with the same name.
    pub fn insert(&self, mut object: Value) -> Result<()> {
        let name = object_name(&object)?;
        self.normalize(&mut object);
        self.objects.insert(name, object);
        Ok(())
    }

    /// Snapshot of a stored object.
    pub fn object(&self, name: &str) -> Option<Value> {
        self.objects.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn not_found(&self, name: &str) -> StoreError {
        Status::not_found(&self.resource.resource, name).into_error()
    }

    fn is_secret(&self) -> bool {
        self.resource.is_core() && self.resource.resource == "secrets"
    }

    /// Server-side defaulting applied after every write.
    fn normalize(&self, object: &mut Value) {
        if !self.is_secret() {
            return;
        }
        let Some(fields) = object.as_object_mut() else {
            return;
        };
        let Some(Value::Object(string_data)) = fields.remove("stringData") else {
            return;
        };
        let data = fields.entry("data").or_insert_with(|| Value::Object(Map::new()));
        if !data.is_object() {
            *data = Value::Object(Map::new());
        }
        if let Value::Object(data) = data {
            for (key, value) in string_data {
                if let Value::String(text) = value {
                    data.insert(key, Value::String(STANDARD.encode(text)));
                }
            }
        }
    }
}

#[async_trait]
impl ResourceClient for MemoryResourceClient {
    fn resource_type(&self) -> &ResourceType {
        &self.resource
    }

    async fn get(&self, name: &str) -> Result<Value> {
        self.object(name).ok_or_else(|| self.not_found(name))
    }

    async fn merge_patch(&self, name: &str, patch: &Value) -> Result<Value> {
        match self.objects.get_mut(name) {
            Some(mut entry) => {
                let object = entry.value_mut();
                apply_merge_patch(object, patch);
                self.normalize(object);
                Ok(object.clone())
            }
            None => Err(self.not_found(name)),
        }
    }

    async fn create(&self, object: &Value) -> Result<Value> {
        let name = object_name(object)?;
        match self.objects.entry(name) {
            Entry::Occupied(entry) => {
                Err(Status::already_exists(&self.resource.resource, entry.key()).into_error())
            }
            Entry::Vacant(entry) => {
                let mut object = object.clone();
                self.normalize(&mut object);
                entry.insert(object.clone());
                Ok(object)
            }
        }
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.objects.remove(name).map(|_| ()).ok_or_else(|| self.not_found(name))
    }
}

fn object_name(object: &Value) -> Result<String> {
    object
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::api(422, "Invalid", "metadata.name: Required value"))
}

/// Apply a JSON merge patch (RFC 7386) to `target` in place.
pub fn apply_merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            if value.is_null() {
                target.remove(key);
            } else {
                apply_merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_patch_rfc7386() {
        let mut target = json!({"a": "b", "c": {"d": "e", "f": "g"}});
        apply_merge_patch(&mut target, &json!({"a": "z", "c": {"f": null}}));
        assert_eq!(target, json!({"a": "z", "c": {"d": "e"}}));

        let mut target = json!({"a": [1, 2]});
        apply_merge_patch(&mut target, &json!({"a": [3], "b": {"x": null}}));
        assert_eq!(target, json!({"a": [3], "b": {}}));

        let mut target = json!("scalar");
        apply_merge_patch(&mut target, &json!({"k": "v"}));
        assert_eq!(target, json!({"k": "v"}));
    }

    #[tokio::test]
    async fn test_get_missing_is_404() {
        let client = MemoryResourceClient::new(ResourceType::config_maps());
        let err = client.get("absent").await.unwrap_err();
        assert!(err.is_not_found_status());
        let err = client.merge_patch("absent", &json!({})).await.unwrap_err();
        assert!(err.is_not_found_status());
        assert!(client.delete("absent").await.unwrap_err().is_not_found_status());
    }

    #[tokio::test]
    async fn test_create_twice_is_already_exists() {
        let client = MemoryResourceClient::new(ResourceType::config_maps());
        let object = json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "s"}});
        client.create(&object).await.unwrap();
        let err = client.create(&object).await.unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let client = MemoryResourceClient::new(ResourceType::config_maps());
        let err = client.create(&json!({"metadata": {}})).await.unwrap_err();
        assert!(matches!(err, StoreError::Api { code: 422, .. }));
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn test_secret_string_data_is_materialized() {
        let client = MemoryResourceClient::new(ResourceType::secrets());
        client.create(&json!({"metadata": {"name": "creds"}})).await.unwrap();

        let patched = client
            .merge_patch("creds", &json!({"stringData": {"token": "\"abc\""}}))
            .await
            .unwrap();
        assert_eq!(patched, json!({"metadata": {"name": "creds"}, "data": {"token": "ImFiYyI="}}));
        assert!(patched.get("stringData").is_none());
    }

    #[tokio::test]
    async fn test_config_map_string_data_untouched() {
        let client = MemoryResourceClient::new(ResourceType::config_maps());
        client.insert(json!({"metadata": {"name": "c"}, "stringData": {"k": "v"}})).unwrap();
        assert_eq!(client.object("c").unwrap()["stringData"]["k"], "v");
    }
}
