//! Integration tests for `POST /api/sd/txt2img`.

mod common;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::{body_json, post_json, post_raw};
use interio_core::media::encode_base64;
use serde_json::{json, Value};

const TXT2IMG: &str = "/api/sd/txt2img";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

async fn fake_webui(router: Router) -> String {
    common::spawn_server(Router::new().nest("/sdapi/v1", router)).await
}

#[tokio::test]
async fn saves_first_image_and_returns_upstream_json() {
    let dir = tempfile::tempdir().unwrap();
    let webui = fake_webui(Router::new().route(
        "/txt2img",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "images": [encode_base64(PNG), "ignored"],
                "parameters": body,
                "info": "{}",
            }))
        }),
    ))
    .await;
    let mut config = common::test_config(dir.path());
    config.sd.api_url = webui;
    let output_dir = config.sd.output_dir.clone();
    let app = common::build_test_app(config);

    let response = post_json(app.router, TXT2IMG, json!({ "prompt": "oak table", "steps": 20 })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["parameters"]["prompt"], "oak table");
    assert_eq!(std::fs::read(output_dir.join("output.png")).unwrap(), PNG);
}

#[tokio::test]
async fn upstream_error_status_is_returned() {
    let dir = tempfile::tempdir().unwrap();
    let webui = fake_webui(Router::new().route(
        "/txt2img",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad sampler") }),
    ))
    .await;
    let mut config = common::test_config(dir.path());
    config.sd.api_url = webui;
    let app = common::build_test_app(config);

    let response = post_json(app.router, TXT2IMG, json!({ "prompt": "x" })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "Failed to generate image");
}

#[tokio::test]
async fn empty_images_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let webui = fake_webui(Router::new().route(
        "/txt2img",
        post(|| async { Json(json!({ "images": [] })) }),
    ))
    .await;
    let mut config = common::test_config(dir.path());
    config.sd.api_url = webui;
    let output_dir = config.sd.output_dir.clone();
    let app = common::build_test_app(config);

    let response = post_json(app.router, TXT2IMG, json!({ "prompt": "x" })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "No image data returned from the API"
    );
    assert!(!output_dir.join("output.png").exists());
}

#[tokio::test]
async fn unreachable_webui_returns_502() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::test_config(dir.path()));

    let response = post_json(app.router, TXT2IMG, json!({ "prompt": "x" })).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await["error"],
        "Stable Diffusion service unavailable"
    );
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::test_config(dir.path()));

    let response = post_raw(app.router, TXT2IMG, "application/json", "{").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid JSON in request body");
}
