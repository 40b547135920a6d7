//! # kubestore
//!
//! Small key/value state kept next to a workload: in a ConfigMap, a Secret,
//! the annotations of any resource, or a local directory.
//!
//! ## Architecture
//!
//! ```text
//! StoreExt (typed get/set) → Store → ResourceClient → API server
//!                                  ↘ tokio::fs → directory
//! ```
//!
//! ## Core Components
//!
//! - **Store contract**: [`Store`] and [`StoreExt`], shared by every backend
//! - **Kubernetes access**: [`kube::ResourceClient`] issuing JSON merge patches
//! - **Backends**: ConfigMap, Secret, annotation, and file stores
//! - **Configuration**: environment-driven [`StoreConfig`] and [`ClusterConfig`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use kubestore::{ClusterConfig, ConfigMapStore, Result, StoreExt};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let cluster = ClusterConfig::resolve()?;
//!     let store = ConfigMapStore::connect(&cluster, "leader-state")?;
//!     store.set("epoch", &7u64).await?;
//!     let epoch: u64 = store.get("epoch").await?;
//!     println!("epoch {}", epoch);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod kube;
pub mod observability;
pub mod store;

// Re-export commonly used types and traits
pub use config::{ClusterConfig, LoggingConfig, StoreConfig};
pub use errors::{Result, StoreError};
pub use store::{
    build_store, AnnotationStore, BackendType, ConfigMapStore, FileStore, SecretStore, Store,
    StoreExt,
};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
