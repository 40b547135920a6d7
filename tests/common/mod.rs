//! Shared helpers for integration tests
//!
//! Provides a wiremock-backed API server and the `Status` bodies it answers
//! with.

#![allow(dead_code)]

use kubestore::kube::Status;
use kubestore::ClusterConfig;
use serde_json::Value;
use wiremock::{MockServer, ResponseTemplate};

pub const NAMESPACE: &str = "apps";
pub const TOKEN: &str = "sa-token";

/// Mock API server plus a cluster config pointing at it
pub struct MockApiServer {
    pub server: MockServer,
    pub cluster: ClusterConfig,
}

impl MockApiServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let cluster = ClusterConfig {
            api_url: server.uri(),
            token: Some(TOKEN.to_string()),
            namespace: NAMESPACE.to_string(),
            timeout_seconds: 5,
            ..Default::default()
        };
        Self { server, cluster }
    }
}

pub fn configmaps_path() -> String {
    format!("/api/v1/namespaces/{}/configmaps", NAMESPACE)
}

pub fn configmap_path(name: &str) -> String {
    format!("{}/{}", configmaps_path(), name)
}

pub fn secrets_path() -> String {
    format!("/api/v1/namespaces/{}/secrets", NAMESPACE)
}

pub fn secret_path(name: &str) -> String {
    format!("{}/{}", secrets_path(), name)
}

pub fn deployment_path(name: &str) -> String {
    format!("/apis/apps/v1/namespaces/{}/deployments/{}", NAMESPACE, name)
}

/// A JSON response
pub fn json_response(code: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(body)
}

/// A failure response carrying a `Status` body
pub fn status_response(status: Status) -> ResponseTemplate {
    json_response(status.code, status.to_value())
}

pub fn not_found(resource: &str, name: &str) -> ResponseTemplate {
    status_response(Status::not_found(resource, name))
}

pub fn already_exists(resource: &str, name: &str) -> ResponseTemplate {
    status_response(Status::already_exists(resource, name))
}
