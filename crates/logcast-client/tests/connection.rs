//! Connection handle tests against a bare WebSocket server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use logcast_client::{ClientConfig, ConnectionHandle, LiveTail, ReconnectPolicy};
use logcast_core::{ChannelError, ConnectionStatus, Envelope, EventSource, LOG_UPDATE};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{accept_async, accept_hdr_async};
use url::Url;

/// Serve `frames` to every connection, then either hold it open or close it.
async fn spawn_server(frames: Vec<String>, hold_open: bool) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                for frame in frames {
                    if ws.send(Message::text(frame)).await.is_err() {
                        return;
                    }
                }
                if hold_open {
                    while let Some(Ok(msg)) = ws.next().await {
                        if msg.is_close() {
                            break;
                        }
                    }
                } else {
                    let _ = ws.close(None).await;
                }
            });
        }
    });

    Url::parse(&format!("ws://{addr}/socket")).unwrap()
}

/// Accept connections, record each request URI and close right away.
async fn spawn_recording_server() -> (Url, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let uris = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&uris);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let recorded = Arc::clone(&recorded);
            tokio::spawn(async move {
                let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
                    recorded.lock().unwrap().push(request.uri().to_string());
                    Ok(response)
                };
                if let Ok(mut ws) = accept_hdr_async(stream, callback).await {
                    let _ = ws.close(None).await;
                }
            });
        }
    });

    (Url::parse(&format!("ws://{addr}/socket")).unwrap(), uris)
}

async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        ..ReconnectPolicy::default()
    }
}

fn update(data: &str) -> String {
    Envelope::log_update(data).to_json().unwrap()
}

#[tokio::test]
async fn test_log_updates_are_appended_in_order() {
    let endpoint = spawn_server(
        vec![
            update("build started\n"),
            r#"{"event":"log_update","data":{"text":"wrong field"}}"#.to_string(),
            r#"{"event":"other","data":{"data":"not for the view"}}"#.to_string(),
            "not json".to_string(),
            update("build finished\n"),
        ],
        true,
    )
    .await;

    let config = ClientConfig::with_endpoint(endpoint);
    let tail = LiveTail::from_config(&config);
    tail.start();

    eventually(|| tail.view().text().len() == "build started\nbuild finished\n".len()).await;
    assert_eq!(tail.view().text(), "build started\nbuild finished\n");
    assert!(tail.view().with_buffer(logcast_core::DisplayBuffer::is_at_bottom));
    assert_eq!(tail.status(), ConnectionStatus::Connected);

    tail.close();
    tokio::time::timeout(Duration::from_secs(5), tail.connection().closed())
        .await
        .unwrap();
    assert_eq!(tail.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_connect_fires_once_per_connection() {
    // Server drops every connection right away, forcing reconnects.
    let endpoint = spawn_server(Vec::new(), false).await;
    let connection = ConnectionHandle::new(endpoint, fast_policy());

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let _sub = connection.on_connected(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    connection.connect();
    eventually(|| connection.connection_count() >= 3).await;
    connection.close();
    tokio::time::timeout(Duration::from_secs(5), connection.closed())
        .await
        .unwrap();

    assert_eq!(fired.load(Ordering::SeqCst), connection.connection_count());
}

#[tokio::test]
async fn test_subscriptions_survive_reconnect() {
    let endpoint = spawn_server(vec![update("tick\n")], false).await;
    let connection = ConnectionHandle::new(endpoint, fast_policy());

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let _sub = connection.on(
        LOG_UPDATE,
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    connection.connect();
    eventually(|| seen.load(Ordering::SeqCst) >= 2).await;
    assert!(connection.connection_count() >= 2);
    connection.close();
}

#[tokio::test]
async fn test_never_policy_gives_up_when_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = Url::parse(&format!("ws://{addr}/socket")).unwrap();
    let connection = ConnectionHandle::new(endpoint, ReconnectPolicy::never());
    connection.connect();

    let result = tokio::time::timeout(Duration::from_secs(5), connection.wait_connected())
        .await
        .unwrap();
    assert!(matches!(result, Err(ChannelError::Closed)));
    assert_eq!(connection.connection_count(), 0);
    assert_eq!(connection.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_connect_twice_starts_one_task() {
    let endpoint = spawn_server(Vec::new(), true).await;
    let connection = ConnectionHandle::new(endpoint, ReconnectPolicy::never());

    connection.connect();
    connection.connect();
    connection.wait_connected().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(connection.connection_count(), 1);
    connection.close();
}

#[tokio::test]
async fn test_replay_is_requested_on_first_connection_only() {
    let (endpoint, uris) = spawn_recording_server().await;
    let mut config = ClientConfig::with_endpoint(endpoint);
    config.replay = true;
    config.reconnect = fast_policy();

    let connection = config.connection();
    connection.connect();
    eventually(|| connection.connection_count() >= 3).await;
    connection.close();

    let uris = uris.lock().unwrap().clone();
    assert_eq!(uris[0], "/socket?replay=true");
    assert!(uris.len() >= 3);
    assert!(uris[1..].iter().all(|uri| uri == "/socket"));
}
