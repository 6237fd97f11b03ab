//! Live log streaming over WebSocket.
//!
//! # Data Flow
//! ```text
//! control plane ──follow=true──→ KubeClient::log_stream ──lines──→ LogRelay ──text frames──→ client
//! ```
//!
//! Once the upgrade has completed nothing is reported back as an HTTP error:
//! failures are logged and the socket is closed.

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::future;
use futures::{SinkExt, StreamExt};

use kubeview_logs::{LogRelay, RelayOutcome};
use kubeview_types::{LogOptions, StreamQuery};

use crate::error::ApiError;
use crate::server::AppState;

/// `GET /api/logs/stream?namespace=&pod=&container=` (WebSocket)
pub async fn stream_logs(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let ws = ws?;
    let options = LogOptions::follow(&query);
    options.validate().map_err(ApiError::BadRequest)?;

    Ok(ws.on_upgrade(move |socket| relay_logs(socket, state, query, options)))
}

async fn relay_logs(socket: WebSocket, state: AppState, query: StreamQuery, options: LogOptions) {
    let (mut sender, mut receiver) = socket.split();

    let lines = match state
        .kube
        .log_stream(&query.namespace, &query.pod, &query.container, &options)
        .await
    {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(
                namespace = %query.namespace,
                pod = %query.pod,
                container = %query.container,
                error = %format!("{:#}", e),
                "Could not open log stream"
            );
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::info!(
        namespace = %query.namespace,
        pod = %query.pod,
        container = %query.container,
        "Streaming logs"
    );

    let relay = LogRelay::new(state.stream_interval);

    // The client never sends data; a close frame or a read error ends the relay.
    let cancel = relay.cancel_token();
    let watcher = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            if matches!(msg, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
        cancel.cancel();
    });

    let summary = {
        let mut sink = (&mut sender)
            .with(|line: String| future::ready(Ok::<_, axum::Error>(Message::Text(line.into()))));
        relay.run(lines, &mut sink).await
    };
    watcher.abort();

    match &summary.outcome {
        RelayOutcome::UpstreamEnded => {
            tracing::info!(pod = %query.pod, container = %query.container, lines = summary.lines, "Log stream ended");
        }
        RelayOutcome::UpstreamFailed(error) => {
            tracing::warn!(pod = %query.pod, container = %query.container, lines = summary.lines, error = %error, "Log stream failed");
        }
        RelayOutcome::ClientGone => {
            tracing::info!(pod = %query.pod, container = %query.container, lines = summary.lines, "Client disconnected");
            return;
        }
    }

    let _ = sender.send(Message::Close(None)).await;
}
