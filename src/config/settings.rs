//! # Configuration Settings
//!
//! Store selection and logging settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::errors::{Result, StoreError};
use crate::kube::ResourceType;
use crate::store::BackendType;

/// Which backend to build, and what container it is bound to
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Backend type
    pub backend: BackendType,

    /// ConfigMap, Secret, or annotated resource name
    #[validate(length(min = 1, max = 253, message = "Name must be 1-253 characters"))]
    pub name: Option<String>,

    /// Directory for the file backend
    pub directory: Option<PathBuf>,

    /// Resource carrying the annotations for the annotation backend
    pub resource: Option<ResourceType>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: BackendType::File, name: None, directory: None, resource: None }
    }
}

impl StoreConfig {
    /// Load store settings from environment variables
    ///
    /// Uses:
    /// - `KUBESTORE_BACKEND` (configmap, secret, annotation, file; default: file)
    /// - `KUBESTORE_NAME`
    /// - `KUBESTORE_DIRECTORY`
    /// - `KUBESTORE_GROUP`, `KUBESTORE_VERSION` (default: v1), `KUBESTORE_RESOURCE`
    pub fn from_env() -> Result<Self> {
        let backend = match env("KUBESTORE_BACKEND") {
            Some(value) => value.parse().map_err(StoreError::config)?,
            None => BackendType::File,
        };

        let resource = env("KUBESTORE_RESOURCE").map(|resource| {
            ResourceType::new(
                env("KUBESTORE_GROUP").unwrap_or_default(),
                env("KUBESTORE_VERSION").unwrap_or_else(|| "v1".to_string()),
                resource,
            )
        });

        Ok(Self {
            backend,
            name: env("KUBESTORE_NAME"),
            directory: env("KUBESTORE_DIRECTORY").map(PathBuf::from),
            resource,
        })
    }

    /// Validate the configuration for the selected backend
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(StoreError::from)?;

        match self.backend {
            BackendType::ConfigMap | BackendType::Secret if self.name.is_none() => {
                Err(StoreError::config(format!("{} backend requires a name", self.backend)))
            }
            BackendType::Annotation if self.name.is_none() => {
                Err(StoreError::config("annotation backend requires a resource name"))
            }
            BackendType::Annotation if self.resource.is_none() => {
                Err(StoreError::config("annotation backend requires a resource type"))
            }
            BackendType::File if self.directory.is_none() => {
                Err(StoreError::config("file backend requires a directory"))
            }
            _ => Ok(()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl LoggingConfig {
    /// Load logging settings from `KUBESTORE_LOG_LEVEL` and `KUBESTORE_LOG_JSON`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env("KUBESTORE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging: env("KUBESTORE_LOG_JSON")
                .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.json_logging),
        }
    }
}

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
