//! End-to-end: a real WebSocket viewer is told to reload after a swap.

mod common;

use std::time::Duration;

use axum::routing::get as get_route;
use axum::Router;
use common::{seed_current, JPEG_A, JPEG_B};
use futures::StreamExt;
use interio_api::state::AppState;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;

type Viewer =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect_viewer(addr: &str, state: &AppState) -> Viewer {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/skybox-updates/"))
        .await
        .unwrap();
    // Registration happens after the upgrade completes server-side.
    for _ in 0..50 {
        if state.ws_manager.connection_count().await > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    socket
}

/// Next text frame, skipping pings; `None` if nothing arrives in time.
async fn next_text(viewer: &mut Viewer, wait: Duration) -> Option<String> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let frame = tokio::time::timeout_at(deadline, viewer.next()).await.ok()??;
        match frame.ok()? {
            Message::Text(text) => return Some(text.to_string()),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}

#[tokio::test]
async fn viewer_receives_reload_after_successful_swap() {
    let dir = tempfile::tempdir().unwrap();
    seed_current(dir.path(), JPEG_A);
    let host = common::spawn_server(
        Router::new().route("/skybox.jpg", get_route(|| async { JPEG_B.to_vec() })),
    )
    .await;
    let (addr, state) = common::spawn_app(common::test_config(dir.path())).await;
    let mut viewer = connect_viewer(&addr, &state).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/pano-gen/webhook/"))
        .json(&json!({ "status": "complete", "file_url": format!("{host}/skybox.jpg") }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let text = next_text(&mut viewer, Duration::from_secs(5))
        .await
        .expect("viewer should be notified");
    let payload: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(payload, json!({ "message": "Skybox updated" }));

    assert!(
        next_text(&mut viewer, Duration::from_millis(300)).await.is_none(),
        "exactly one notification per swap"
    );
}

#[tokio::test]
async fn viewer_hears_nothing_for_progress_or_failures() {
    let dir = tempfile::tempdir().unwrap();
    seed_current(dir.path(), JPEG_A);
    let (addr, state) = common::spawn_app(common::test_config(dir.path())).await;
    let mut viewer = connect_viewer(&addr, &state).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/api/pano-gen/webhook/");

    let bodies = [
        (json!({ "status": "processing" }), 202),
        (json!({ "status": "complete" }), 400),
        (json!({ "status": "banana" }), 400),
        (
            json!({ "status": "complete", "file_url": format!("{}/x.jpg", common::UNREACHABLE) }),
            500,
        ),
    ];
    for (body, expected) in bodies {
        let response = client.post(&url).json(&body).send().await.unwrap();
        assert_eq!(response.status().as_u16(), expected, "body: {body}");
    }

    assert!(next_text(&mut viewer, Duration::from_millis(300)).await.is_none());
}

#[tokio::test]
async fn disconnect_removes_viewer() {
    let dir = tempfile::tempdir().unwrap();
    let (addr, state) = common::spawn_app(common::test_config(dir.path())).await;
    let mut viewer = connect_viewer(&addr, &state).await;
    assert_eq!(state.ws_manager.connection_count().await, 1);

    viewer.close(None).await.unwrap();
    drop(viewer);

    for _ in 0..50 {
        if state.ws_manager.connection_count().await == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state.ws_manager.connection_count().await, 0);
}
