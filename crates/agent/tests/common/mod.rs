#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use interio_agent::config::ServerConfig;
use interio_agent::router::build_app_router;
use interio_agent::service::AgentService;
use interio_agent::state::AppState;
use interio_providers::llama_stack::LlamaStackClient;

/// A PNG payload larger than axum's 2 MB default body limit.
pub fn large_png(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    bytes.resize(len, 0);
    bytes
}

pub const MODEL: &str = "meta-llama/Llama-3.2-11B-Vision-Instruct";

/// In-process stand-in for a LlamaStack distribution.
///
/// Records every call as `(path, body)`. Turns answer with `turn_reply`,
/// unless `rate_limited_turns` is non-zero (429, decremented per call) or
/// `fail_turns` is set (500).
#[derive(Clone, Default)]
pub struct FakeStack {
    pub calls: Arc<Mutex<Vec<(String, Value)>>>,
    pub turn_reply: Arc<Mutex<String>>,
    pub rate_limited_turns: Arc<AtomicUsize>,
    pub fail_turns: Arc<AtomicBool>,
    seq: Arc<AtomicUsize>,
}

impl FakeStack {
    pub fn set_reply(&self, reply: &str) {
        *self.turn_reply.lock().unwrap() = reply.to_string();
    }

    pub fn calls_to(&self, suffix: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.ends_with(suffix))
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Serve on an ephemeral port; returns the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .fallback(handle)
            .layer(DefaultBodyLimit::disable())
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn handle(State(stack): State<FakeStack>, uri: Uri, Json(body): Json<Value>) -> axum::response::Response {
    let path = uri.path().to_string();
    stack.calls.lock().unwrap().push((path.clone(), body));
    let n = stack.seq.fetch_add(1, Ordering::SeqCst);
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match segments.as_slice() {
        ["v1", "agents"] => Json(json!({ "agent_id": format!("agent-{n}") })).into_response(),
        ["v1", "agents", agent_id, "session"] => {
            Json(json!({ "session_id": format!("{agent_id}-session-{n}") })).into_response()
        }
        ["v1", "agents", _, "session", _, "turn"] => {
            if stack.fail_turns.load(Ordering::SeqCst) {
                return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed: CUDA OOM").into_response();
            }
            let limited = stack
                .rate_limited_turns
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if limited {
                return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
            }
            let reply = stack.turn_reply.lock().unwrap().clone();
            Json(json!({ "output_message": { "role": "assistant", "content": reply } })).into_response()
        }
        ["v1", "vector-dbs"] | ["v1", "tool-runtime", "rag-tool", "insert"] => {
            Json(json!({})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A document directory holding two catalog entries.
pub fn catalog_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("001.txt"),
        "<uri>001.jpeg</uri> <price>$100</price> Oak dining table.",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("009.txt"),
        "<uri>009.jpeg</uri> <price>$120</price> Rattan lounge chair.",
    )
    .unwrap();
    dir
}

pub fn test_config(stack_url: &str, document_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        llama_stack_url: stack_url.to_string(),
        model: MODEL.to_string(),
        document_dir: document_dir.to_path_buf(),
        max_upload_bytes: interio_http::DEFAULT_MAX_UPLOAD_BYTES,
    }
}

pub async fn init_service(stack_url: &str, document_dir: &Path) -> AgentService {
    let client = LlamaStackClient::new(reqwest::Client::new(), stack_url.to_string());
    AgentService::initialize(client, MODEL.to_string(), document_dir)
        .await
        .unwrap()
        .with_retry_delay(Duration::from_millis(10))
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub stack: FakeStack,
    _docs: tempfile::TempDir,
}

/// Fake stack + initialized service + full router.
pub async fn build_test_app() -> TestApp {
    let stack = FakeStack::default();
    let url = stack.spawn().await;
    let docs = catalog_dir();
    let config = test_config(&url, docs.path());
    let agent = init_service(&url, docs.path()).await;
    let state = AppState {
        config: Arc::new(config.clone()),
        agent: Arc::new(agent),
    };
    let router = build_app_router(state.clone(), &config);
    TestApp {
        router,
        state,
        stack,
        _docs: docs,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    post_raw(app, uri, "application/json", body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Hand-rolled `multipart/form-data` body; returns `(content_type, body)`.
pub fn multipart_body(message: Option<&str>, image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "----interio-test-boundary";
    let mut body = Vec::new();
    if let Some(text) = message {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{text}\r\n")
                .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
