//! Mock control plane shared by the integration tests.

#![allow(dead_code)]

use std::convert::Infallible;
use std::time::Duration;

use axum::Router;
use axum::http::{Request, Response, StatusCode};
use kube::client::Body;
use serde_json::{Value, json};

use kubeview_k8s::KubeClient;
use kubeview_server::{AppState, ServerConfig, build_router};

/// Build a `kube::Client` whose API server is the given function of
/// (path, query).
pub fn mock_kube<F>(handler: F) -> kube::Client
where
    F: Fn(&str, Option<&str>) -> (StatusCode, String) + Send + 'static,
{
    let service = tower::service_fn(move |req: Request<Body>| {
        let (status, body) = handler(req.uri().path(), req.uri().query());
        let response = Response::builder()
            .status(status)
            .body(Body::from(body.into_bytes()))
            .expect("valid mock response");
        async move { Ok::<_, Infallible>(response) }
    });
    kube::Client::new(service, "default")
}

/// A control plane that answers every request with `body`, after `delay`.
pub fn slow_kube(delay: Duration, body: String) -> kube::Client {
    let service = tower::service_fn(move |_: Request<Body>| {
        let body = body.clone();
        async move {
            tokio::time::sleep(delay).await;
            let response = Response::builder()
                .status(StatusCode::OK)
                .body(Body::from(body.into_bytes()))
                .expect("valid mock response");
            Ok::<_, Infallible>(response)
        }
    });
    kube::Client::new(service, "default")
}

/// Router over a mocked control plane, with pacing disabled.
pub fn router_with<F>(handler: F) -> Router
where
    F: Fn(&str, Option<&str>) -> (StatusCode, String) + Send + 'static,
{
    router_over(mock_kube(handler), test_config())
}

/// Router over any client with the given config.
pub fn router_over(client: kube::Client, config: ServerConfig) -> Router {
    let state = AppState::new(KubeClient::new(client), &config);
    build_router(&config, state)
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        stream_interval_ms: 0,
        ..Default::default()
    }
}

pub fn namespace_list(names: &[&str]) -> String {
    list("NamespaceList", "Namespace", names, None)
}

pub fn pod_list(namespace: &str, names: &[&str]) -> String {
    list("PodList", "Pod", names, Some(namespace))
}

fn list(kind: &str, item_kind: &str, names: &[&str], namespace: Option<&str>) -> String {
    let items: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "apiVersion": "v1",
                "kind": item_kind,
                "metadata": { "name": name, "namespace": namespace },
            })
        })
        .collect();

    json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items,
    })
    .to_string()
}

pub fn pod(namespace: &str, name: &str, containers: &[&str]) -> String {
    let containers: Vec<Value> = containers
        .iter()
        .map(|c| json!({ "name": c, "image": "busybox" }))
        .collect();

    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "containers": containers },
    })
    .to_string()
}

/// A `Status` failure as the API server returns it.
pub fn status_failure(code: u16, reason: &str, message: &str) -> String {
    json!({
        "apiVersion": "v1",
        "kind": "Status",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    })
    .to_string()
}

pub fn not_found(kind: &str, name: &str) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        status_failure(404, "NotFound", &format!("{} \"{}\" not found", kind, name)),
    )
}
