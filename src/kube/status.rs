//! API server `Status` responses.
//!
//! Failed calls return a `Status` object carrying the HTTP code and a
//! machine-readable reason (`NotFound`, `AlreadyExists`, `Forbidden`, ...).

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;

/// The subset of `meta/v1 Status` this crate inspects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub kind: String,
    #[serde(default, rename = "apiVersion")]
    pub api_version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub code: u16,
}

impl Status {
    pub fn failure(code: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: "Status".to_string(),
            api_version: "v1".to_string(),
            status: "Failure".to_string(),
            message: message.into(),
            reason: reason.into(),
            code,
        }
    }

    pub fn not_found(resource: &str, name: &str) -> Self {
        Self::failure(404, "NotFound", format!("{} \"{}\" not found", resource, name))
    }

    pub fn already_exists(resource: &str, name: &str) -> Self {
        Self::failure(409, "AlreadyExists", format!("{} \"{}\" already exists", resource, name))
    }

    pub fn into_error(self) -> StoreError {
        StoreError::api(self.code, self.reason, self.message)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Convert a non-success response into a [`StoreError::Api`].
///
/// A body that is not a `Status` object still yields an `Api` error carrying
/// the HTTP status code, so 404s are classified the same either way.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<Status>(body) {
        Ok(parsed) if parsed.kind == "Status" => {
            let code = if parsed.code == 0 { status.as_u16() } else { parsed.code };
            StoreError::api(code, parsed.reason, parsed.message)
        }
        _ => StoreError::api(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            body.trim(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_status_body() {
        let body = Status::not_found("configmaps", "state").to_value().to_string();
        let err = error_from_response(StatusCode::NOT_FOUND, &body);
        assert!(err.is_not_found_status());
        assert!(err.to_string().contains("configmaps \"state\" not found"));
    }

    #[test]
    fn test_already_exists_status() {
        let body = Status::already_exists("secrets", "creds").to_value().to_string();
        let err = error_from_response(StatusCode::CONFLICT, &body);
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_non_status_body_keeps_http_code() {
        let err = error_from_response(StatusCode::NOT_FOUND, "404 page not found\n");
        assert!(err.is_not_found_status());
        match err {
            StoreError::Api { reason, message, .. } => {
                assert_eq!(reason, "Not Found");
                assert_eq!(message, "404 page not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_forbidden_is_not_classified() {
        let body = Status::failure(403, "Forbidden", "cannot patch").to_value().to_string();
        let err = error_from_response(StatusCode::FORBIDDEN, &body);
        assert!(!err.is_not_found_status());
        assert!(!err.is_already_exists());
    }
}
