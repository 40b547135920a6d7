//! Backend selection from configuration.

use tracing::info;

use super::{AnnotationStore, BackendType, ConfigMapStore, FileStore, SecretStore, Store};
use crate::config::{ClusterConfig, StoreConfig};
use crate::errors::{Result, StoreError};

/// Build the store described by `config`.
///
/// The configuration is validated first. Kubernetes-backed stores need a
/// `cluster`; the file store ignores it.
pub fn build_store(
    config: &StoreConfig,
    cluster: Option<&ClusterConfig>,
) -> Result<Box<dyn Store>> {
    config.validate()?;

    let store: Box<dyn Store> = match config.backend {
        BackendType::File => {
            let directory = config
                .directory
                .as_ref()
                .ok_or_else(|| StoreError::config("file backend requires a directory"))?;
            Box::new(FileStore::new(directory))
        }
        backend => {
            let cluster = cluster.ok_or_else(|| {
                StoreError::config(format!("{} backend requires cluster access", backend))
            })?;
            let name = config
                .name
                .clone()
                .ok_or_else(|| StoreError::config(format!("{} backend requires a name", backend)))?;

            match backend {
                BackendType::ConfigMap => Box::new(ConfigMapStore::connect(cluster, name)?),
                BackendType::Secret => Box::new(SecretStore::connect(cluster, name)?),
                _ => {
                    let resource = config.resource.clone().ok_or_else(|| {
                        StoreError::config("annotation backend requires a resource type")
                    })?;
                    Box::new(AnnotationStore::connect(cluster, resource, name)?)
                }
            }
        }
    };

    info!(backend = %config.backend, "Store initialized");
    Ok(store)
}
