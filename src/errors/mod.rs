//! # Error Handling
//!
//! Error taxonomy shared by every store backend, built with `thiserror`.
//!
//! "Container absent" is classified right after each transport call (see
//! [`StoreError::is_not_found_status`]) and normalized by the backends into
//! [`StoreError::NotFound`], an empty listing, or a no-op delete. Everything
//! else passes through unchanged.

/// Custom result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Main error type for store operations
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The key, or the whole container holding it, does not exist.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// The key cannot be represented by the backend.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// The encoded value cannot be stored by the backend.
    #[error("invalid value for key '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// Serializing a value or a patch failed.
    #[error("encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Stored bytes (or a fetched object) do not have the expected shape.
    #[error("failed to decode '{key}': {message}")]
    Decode { key: String, message: String },

    /// The API server answered with a non-success status.
    #[error("API error ({code} {reason}): {message}")]
    Api { code: u16, reason: String, message: String },

    /// HTTP transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an invalid key error
    pub fn invalid_key<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }

    /// Create an invalid value error
    pub fn invalid_value<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::InvalidValue { key: key.into(), reason: reason.into() }
    }

    /// Create a decode error
    pub fn decode<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::Decode { key: key.into(), message: message.into() }
    }

    /// Create an API status error
    pub fn api<R: Into<String>, M: Into<String>>(code: u16, reason: R, message: M) -> Self {
        Self::Api { code, reason: reason.into(), message: message.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// True for the store-level "key not found" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when a transport call failed because the targeted resource does
    /// not exist.
    pub fn is_not_found_status(&self) -> bool {
        matches!(self, Self::Api { code: 404, .. })
    }

    /// True when a create call failed because the resource already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Api { code: 409, reason, .. } if reason == "AlreadyExists")
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Config(errors.to_string())
    }
}
