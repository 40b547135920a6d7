//! # Configuration Management
//!
//! Environment-driven configuration for cluster access, store selection,
//! and logging.

pub mod cluster;
pub mod settings;

pub use cluster::{ClusterConfig, SERVICE_ACCOUNT_DIR};
pub use settings::{LoggingConfig, StoreConfig};
