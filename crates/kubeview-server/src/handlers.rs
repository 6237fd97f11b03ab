//! REST handlers.
//!
//! Each handler performs one read-only call through [`KubeClient`] and wraps
//! the answer in its JSON envelope.
//!
//! [`KubeClient`]: kubeview_k8s::KubeClient

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde_json::{Value, json};

use kubeview_types::{
    ContainerList, ContainersQuery, LogOptions, LogsQuery, NamespaceList, PodList, PodLogs,
    PodsQuery,
};

use crate::error::ApiError;
use crate::server::AppState;

/// `GET /api/namespaces`
pub async fn list_namespaces(
    State(state): State<AppState>,
) -> Result<Json<NamespaceList>, ApiError> {
    let namespaces = state.kube.list_namespaces().await?;
    tracing::debug!(count = namespaces.len(), "Listed namespaces");
    Ok(Json(NamespaceList { namespaces }))
}

/// `GET /api/pods?namespace=`
pub async fn list_pods(
    State(state): State<AppState>,
    query: Result<Query<PodsQuery>, QueryRejection>,
) -> Result<Json<PodList>, ApiError> {
    let Query(query) = query?;
    let pods = state.kube.list_pods(&query.namespace).await?;
    tracing::debug!(namespace = %query.namespace, count = pods.len(), "Listed pods");
    Ok(Json(PodList { pods }))
}

/// `GET /api/containers?namespace=&pod=`
pub async fn list_containers(
    State(state): State<AppState>,
    query: Result<Query<ContainersQuery>, QueryRejection>,
) -> Result<Json<ContainerList>, ApiError> {
    let Query(query) = query?;
    let containers = state
        .kube
        .list_containers(&query.namespace, &query.pod)
        .await?;
    Ok(Json(ContainerList { containers }))
}

/// `GET /api/logs?namespace=&pod=&container=&tail=`
pub async fn get_logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<PodLogs>, ApiError> {
    let Query(query) = query?;
    let options = LogOptions::snapshot(&query, state.default_tail_lines);
    options.validate().map_err(ApiError::BadRequest)?;

    let logs = state
        .kube
        .pod_logs(&query.namespace, &query.pod, &query.container, &options)
        .await?;
    Ok(Json(PodLogs { logs }))
}

/// `GET /healthz`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
