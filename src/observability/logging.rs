//! # Structured Logging
//!
//! Subscriber setup plus a span macro for store operations.
//!
//! `RUST_LOG` takes precedence over the configured level, so a single
//! module can be turned up without touching the rest:
//!
//! ```text
//! RUST_LOG=kubestore::kube=trace,info kubestore --backend configmap --name state list
//! ```

use tracing_subscriber::{fmt, EnvFilter};
use validator::Validate;

use crate::config::{LoggingConfig, StoreConfig};
use crate::errors::{Result, StoreError};

/// Create a tracing span for a store operation.
///
/// ```rust,ignore
/// let span = store_span!("set", "configmap", "counter");
/// let span = store_span!("list", "file", "", directory = %dir.display());
/// ```
#[macro_export]
macro_rules! store_span {
    ($operation:expr, $backend:expr, $key:expr) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            backend = %$backend,
            key = %$key
        )
    };
    ($operation:expr, $backend:expr, $key:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            backend = %$backend,
            key = %$key,
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// An already-installed subscriber (another library, or a test harness) is
/// left in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.validate()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            StoreError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json_logging {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere; ignore.
    }
    Ok(())
}

/// Log the selected store at startup
pub fn log_store_info(config: &StoreConfig) {
    tracing::info!(
        backend = %config.backend,
        owns_container = config.backend.owns_container(),
        name = ?config.name,
        directory = ?config.directory,
        resource = ?config.resource.as_ref().map(ToString::to_string),
        "kubestore configuration"
    );
}
