//! Annotation store against a mock API server.

mod common;

use common::*;
use kubestore::kube::{ResourceType, Status, MERGE_PATCH_CONTENT_TYPE};
use kubestore::{AnnotationStore, Store, StoreError, StoreExt};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn deployments() -> ResourceType {
    ResourceType::new("apps", "v1", "deployments")
}

async fn connect(api: &MockApiServer) -> AnnotationStore {
    AnnotationStore::connect(&api.cluster, deployments(), "web").unwrap()
}

#[tokio::test]
async fn test_set_patches_prefixed_annotation() {
    let api = MockApiServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(deployment_path("web")))
        .and(header("content-type", MERGE_PATCH_CONTENT_TYPE))
        .and(body_json(json!({
            "metadata": {"annotations": {"kubestore/phase": "\"ready\""}}
        })))
        .respond_with(json_response(200, json!({"metadata": {"name": "web"}})))
        .expect(1)
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    store.set("phase", &"ready").await.unwrap();
}

#[tokio::test]
async fn test_missing_host_resource_is_not_created() {
    let api = MockApiServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(not_found("deployments.apps", "web"))
        .expect(2)
        .mount(&api.server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    let err = store.set("phase", &"ready").await.unwrap_err();
    assert!(err.is_not_found_status());
    assert!(!err.is_not_found());

    // Delete on a missing host resource is a no-op.
    store.delete("phase").await.unwrap();
}

#[tokio::test]
async fn test_get_and_list_filter_by_prefix() {
    let api = MockApiServer::start().await;

    Mock::given(method("GET"))
        .and(path(deployment_path("web")))
        .respond_with(json_response(
            200,
            json!({
                "kind": "Deployment",
                "metadata": {
                    "name": "web",
                    "annotations": {
                        "deployment.kubernetes.io/revision": "3",
                        "kubestore/epoch": "7",
                        "kubestore/owner": "\"node-a\""
                    }
                }
            }),
        ))
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    assert_eq!(store.list().await.unwrap(), vec!["epoch", "owner"]);
    assert_eq!(store.get::<u64>("epoch").await.unwrap(), 7);
    assert_eq!(store.get::<String>("owner").await.unwrap(), "node-a");
    assert!(store.get_raw("revision").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_resource_without_annotations() {
    let api = MockApiServer::start().await;

    Mock::given(method("GET"))
        .respond_with(json_response(200, json!({"metadata": {"name": "web"}})))
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    assert!(store.list().await.unwrap().is_empty());
    assert!(store.get_raw("epoch").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_sends_null_and_never_deletes_resource() {
    let api = MockApiServer::start().await;

    Mock::given(method("PATCH"))
        .and(body_json(json!({"metadata": {"annotations": {"kubestore/epoch": null}}})))
        .respond_with(json_response(200, json!({"metadata": {"name": "web"}})))
        .expect(1)
        .mount(&api.server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    store.delete("epoch").await.unwrap();
}

#[tokio::test]
async fn test_core_group_resource_path() {
    let api = MockApiServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("/api/v1/namespaces/{}/services/frontend", NAMESPACE)))
        .respond_with(json_response(200, json!({"metadata": {"name": "frontend"}})))
        .expect(1)
        .mount(&api.server)
        .await;

    let services = ResourceType::new("", "v1", "services");
    let store = AnnotationStore::connect(&api.cluster, services, "frontend").unwrap();
    store.set("weight", &0.5).await.unwrap();
}

#[tokio::test]
async fn test_forbidden_patch_is_propagated() {
    let api = MockApiServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    let err = store.delete("epoch").await.unwrap_err();
    assert!(matches!(err, StoreError::Api { code: 403, .. }));
}

#[tokio::test]
async fn test_forbidden_read_is_propagated() {
    let api = MockApiServer::start().await;

    Mock::given(method("GET"))
        .and(path(deployment_path("web")))
        .respond_with(status_response(Status::failure(
            403,
            "Forbidden",
            "cannot get deployments",
        )))
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    let err = store.get_raw("epoch").await.unwrap_err();
    assert!(matches!(err, StoreError::Api { code: 403, .. }), "{err}");
    assert!(!err.is_not_found());
    assert!(matches!(store.list().await.unwrap_err(), StoreError::Api { code: 403, .. }));
}

#[tokio::test]
async fn test_server_error_on_read_is_propagated() {
    let api = MockApiServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&api.server)
        .await;

    let store = connect(&api).await;
    assert!(matches!(store.get_raw("epoch").await.unwrap_err(), StoreError::Api { code: 500, .. }));
    assert!(matches!(store.list().await.unwrap_err(), StoreError::Api { code: 500, .. }));
}
