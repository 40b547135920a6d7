//! # Observability
//!
//! Structured logging through the `tracing` ecosystem. Store operations emit
//! debug-level events and spans; stored values are never logged.

pub mod logging;

pub use logging::{init_logging, log_store_info};
