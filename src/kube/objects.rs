//! Typed views over API objects and the merge patches sent to them.
//!
//! Objects travel as `serde_json::Value`; these structs read only the fields
//! the stores need and ignore the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::{Result, StoreError};

/// Object metadata fields read by the stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Any object, reduced to its metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialObject {
    #[serde(default)]
    pub metadata: ObjectMeta,
}

impl PartialObject {
    pub fn from_value(object: Value) -> Result<Self> {
        serde_json::from_value(object).map_err(|e| StoreError::decode("metadata", e.to_string()))
    }

    pub fn annotations(&self) -> impl Iterator<Item = (&String, &String)> {
        self.metadata.annotations.iter().flatten()
    }
}

/// A ConfigMap or Secret, reduced to its flat `data` map.
///
/// ConfigMap data holds plain strings; Secret data holds base64 strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataObject {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub data: Option<BTreeMap<String, String>>,
}

impl DataObject {
    pub fn from_value(object: Value) -> Result<Self> {
        serde_json::from_value(object).map_err(|e| StoreError::decode("data", e.to_string()))
    }

    pub fn into_data(self) -> BTreeMap<String, String> {
        self.data.unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.as_ref().map_or(true, BTreeMap::is_empty)
    }
}

/// Which top-level map a data patch writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataField {
    /// `data`
    Data,
    /// `stringData`: plaintext input the API server folds into `data`
    StringData,
}

/// Merge patch touching a single entry of a data map.
///
/// A `None` entry serializes as `null`, which removes the key.
#[derive(Debug, Default, Serialize)]
pub struct DataPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<BTreeMap<&'a str, Option<&'a str>>>,
    #[serde(rename = "stringData", skip_serializing_if = "Option::is_none")]
    string_data: Option<BTreeMap<&'a str, Option<&'a str>>>,
}

impl<'a> DataPatch<'a> {
    pub fn set(field: DataField, key: &'a str, value: &'a str) -> Self {
        let entry = Some(BTreeMap::from([(key, Some(value))]));
        match field {
            DataField::Data => Self { data: entry, ..Default::default() },
            DataField::StringData => Self { string_data: entry, ..Default::default() },
        }
    }

    pub fn remove(key: &'a str) -> Self {
        Self { data: Some(BTreeMap::from([(key, None)])), ..Default::default() }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(StoreError::Encode)
    }
}

/// Merge patch touching a single annotation.
#[derive(Debug, Serialize)]
pub struct AnnotationPatch<'a> {
    metadata: AnnotationsField<'a>,
}

#[derive(Debug, Serialize)]
struct AnnotationsField<'a> {
    annotations: BTreeMap<&'a str, Option<&'a str>>,
}

impl<'a> AnnotationPatch<'a> {
    pub fn set(annotation: &'a str, value: &'a str) -> Self {
        Self {
            metadata: AnnotationsField { annotations: BTreeMap::from([(annotation, Some(value))]) },
        }
    }

    pub fn remove(annotation: &'a str) -> Self {
        Self { metadata: AnnotationsField { annotations: BTreeMap::from([(annotation, None)]) } }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(StoreError::Encode)
    }
}
