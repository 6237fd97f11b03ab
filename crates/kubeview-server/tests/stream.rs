//! WebSocket log streaming tests.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{StatusCode, Uri};
use axum::Router;
use futures::{SinkExt, StreamExt, stream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

mod common;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Collect text frames until the server closes the connection.
async fn read_until_closed(addr: SocketAddr, query: &str) -> (Vec<String>, bool) {
    let url = format!("ws://{}/api/logs/stream?{}", addr, query);
    let (mut socket, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    let mut lines = Vec::new();
    let mut saw_close = false;
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("server should close the stream");
        match next {
            Some(Ok(Message::Text(text))) => lines.push(text.as_str().to_string()),
            Some(Ok(Message::Close(_))) => saw_close = true,
            Some(Ok(_)) => {}
            Some(Err(_)) | None => break,
        }
    }
    (lines, saw_close)
}

#[tokio::test]
async fn test_stream_relays_lines_and_closes_when_upstream_ends() {
    let router = common::router_with(|path, query| {
        assert_eq!(path, "/api/v1/namespaces/default/pods/web/log");
        let query = query.unwrap_or_default();
        assert!(query.contains("follow=true"));
        assert!(query.contains("container=app"));
        (
            StatusCode::OK,
            "starting\nlistening on :8080\nready\n".to_string(),
        )
    });
    let addr = serve(router).await;

    let (lines, saw_close) =
        read_until_closed(addr, "namespace=default&pod=web&container=app").await;

    assert_eq!(lines, vec!["starting", "listening on :8080", "ready"]);
    assert!(saw_close);
}

#[tokio::test]
async fn test_stream_closes_when_upstream_fails_to_open() {
    let router = common::router_with(|_, _| common::not_found("pods", "ghost"));
    let addr = serve(router).await;

    let (lines, saw_close) =
        read_until_closed(addr, "namespace=default&pod=ghost&container=app").await;

    assert!(lines.is_empty());
    assert!(saw_close);
}

#[tokio::test]
async fn test_stream_forwards_tail() {
    let router = common::router_with(|_, query| {
        assert!(query.unwrap_or_default().contains("tailLines=2"));
        (StatusCode::OK, "a\nb\n".to_string())
    });
    let addr = serve(router).await;

    let (lines, _) =
        read_until_closed(addr, "namespace=default&pod=web&container=app&tail=2").await;

    assert_eq!(lines, vec!["a", "b"]);
}

#[tokio::test]
async fn test_stream_requires_container() {
    let router = common::router_with(|_, _| panic!("control plane must not be called"));
    let addr = serve(router).await;

    let url = format!("ws://{}/api/logs/stream?namespace=default&pod=web", addr);
    let err = tokio_tungstenite::connect_async(url).await.unwrap_err();
    match err {
        tokio_tungstenite::tungstenite::Error::Http(response) => {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        other => panic!("expected an HTTP rejection, got {:?}", other),
    }
}

/// Held by the upstream log body; the paired receiver resolves once the body
/// has been dropped.
struct DropGuard(#[allow(dead_code)] oneshot::Sender<()>);

#[tokio::test]
async fn test_client_close_releases_upstream_stream() {
    let (dropped_tx, dropped_rx) = oneshot::channel::<()>();
    let guard = Arc::new(Mutex::new(Some(DropGuard(dropped_tx))));

    // Control plane whose log body sends one line and then stays open.
    let control_plane = Router::new().fallback(move || {
        let guard = guard.lock().unwrap().take();
        async move {
            let body = stream::once(async { Ok::<_, Infallible>(Bytes::from_static(b"first\n")) })
                .chain(stream::pending())
                .map(move |chunk| {
                    let _held = &guard;
                    chunk
                });
            Body::from_stream(body)
        }
    });
    let upstream = serve(control_plane).await;

    let cluster_url: Uri = format!("http://{}", upstream).parse().unwrap();
    let client = kube::Client::try_from(kube::Config::new(cluster_url)).unwrap();
    let addr = serve(common::router_over(client, common::test_config())).await;

    let url = format!(
        "ws://{}/api/logs/stream?namespace=default&pod=web&container=app",
        addr
    );
    let (mut socket, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("first line should arrive");
    match first {
        Some(Ok(Message::Text(text))) => assert_eq!(text.as_str(), "first"),
        other => panic!("expected a text frame, got {:?}", other),
    }

    socket.send(Message::Close(None)).await.unwrap();

    let released = tokio::time::timeout(Duration::from_secs(5), dropped_rx).await;
    assert!(
        released.is_ok(),
        "upstream log body still open after the client closed"
    );
}
