//! REST client for a LlamaStack distribution.
//!
//! Covers the subset the interior-design agent needs: agent and session
//! creation, non-streaming turns, vector DB registration and RAG document
//! insertion.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Configuration for `POST /v1/agents`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    pub model: String,
    pub instructions: String,
    pub sampling_params: serde_json::Value,
    pub enable_session_persistence: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub toolgroups: Vec<serde_json::Value>,
}

impl AgentConfig {
    /// Greedy-sampling agent with no tools.
    pub fn greedy(model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            sampling_params: serde_json::json!({ "strategy": { "type": "greedy" } }),
            enable_session_persistence: false,
            toolgroups: Vec::new(),
        }
    }

    pub fn persistent(mut self) -> Self {
        self.enable_session_persistence = true;
        self
    }

    pub fn with_toolgroup(mut self, toolgroup: serde_json::Value) -> Self {
        self.toolgroups.push(toolgroup);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlRef {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub url: UrlRef,
}

/// One part of a multi-part user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text { text: String },
    Image { image: ImageRef },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image given by URI; data URLs are accepted.
    pub fn image_uri(uri: impl Into<String>) -> Self {
        Self::Image {
            image: ImageRef {
                url: UrlRef { uri: uri.into() },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserMessage {
    pub role: &'static str,
    pub content: Vec<ContentItem>,
}

impl UserMessage {
    pub fn new(content: Vec<ContentItem>) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

/// A document for `rag-tool/insert`.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub document_id: String,
    pub content: String,
    pub mime_type: String,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AgentCreated {
    agent_id: String,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct Turn {
    output_message: OutputMessage,
}

#[derive(Debug, Deserialize)]
struct OutputMessage {
    content: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LlamaStackError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LlamaStack rate limit hit")]
    RateLimited,

    #[error("LlamaStack API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected LlamaStack response: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct LlamaStackClient {
    client: reqwest::Client,
    base_url: String,
}

impl LlamaStackClient {
    /// * `base_url` - Distribution root, e.g. `http://llama-stack:5000`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_agent(&self, config: &AgentConfig) -> Result<String, LlamaStackError> {
        let body = serde_json::json!({ "agent_config": config });
        let created: AgentCreated = self.post_json("/v1/agents", &body).await?;
        Ok(created.agent_id)
    }

    pub async fn create_session(
        &self,
        agent_id: &str,
        session_name: &str,
    ) -> Result<String, LlamaStackError> {
        let body = serde_json::json!({ "session_name": session_name });
        let created: SessionCreated = self
            .post_json(&format!("/v1/agents/{agent_id}/session"), &body)
            .await?;
        Ok(created.session_id)
    }

    /// Run one non-streaming turn and return the assistant's text.
    pub async fn create_turn(
        &self,
        agent_id: &str,
        session_id: &str,
        messages: &[UserMessage],
    ) -> Result<String, LlamaStackError> {
        let body = serde_json::json!({ "messages": messages, "stream": false });
        let turn: Turn = self
            .post_json(
                &format!("/v1/agents/{agent_id}/session/{session_id}/turn"),
                &body,
            )
            .await?;
        content_text(&turn.output_message.content)
            .ok_or_else(|| LlamaStackError::Decode("turn output has no text content".into()))
    }

    pub async fn register_vector_db(
        &self,
        vector_db_id: &str,
        embedding_model: &str,
        embedding_dimension: u32,
    ) -> Result<(), LlamaStackError> {
        let body = serde_json::json!({
            "vector_db_id": vector_db_id,
            "embedding_model": embedding_model,
            "embedding_dimension": embedding_dimension,
        });
        self.post_ignore("/v1/vector-dbs", &body).await
    }

    pub async fn insert_documents(
        &self,
        vector_db_id: &str,
        documents: &[Document],
        chunk_size_in_tokens: u32,
    ) -> Result<(), LlamaStackError> {
        let body = serde_json::json!({
            "vector_db_id": vector_db_id,
            "documents": documents,
            "chunk_size_in_tokens": chunk_size_in_tokens,
        });
        self.post_ignore("/v1/tool-runtime/rag-tool/insert", &body).await
    }

    // ---- private helpers ----

    async fn send(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, LlamaStackError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, LlamaStackError> {
        let response = self.send(path, body).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_ignore(&self, path: &str, body: &serde_json::Value) -> Result<(), LlamaStackError> {
        self.send(path, body).await?;
        Ok(())
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, LlamaStackError> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlamaStackError::RateLimited);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlamaStackError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Flatten message content (plain string or list of content items) to text.
fn content_text(content: &serde_json::Value) -> Option<String> {
    match content {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let text: Vec<&str> = items
                .iter()
                .filter(|item| item["type"] == "text")
                .filter_map(|item| item["text"].as_str())
                .collect();
            (!text.is_empty()).then(|| text.join(""))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::spawn_server;

    #[test]
    fn content_items_serialize_as_tagged_parts() {
        let msg = UserMessage::new(vec![
            ContentItem::image_uri("data:image/png;base64,AAAA"),
            ContentItem::text("what chair is this?"),
        ]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": [
                    { "type": "image", "image": { "url": { "uri": "data:image/png;base64,AAAA" } } },
                    { "type": "text", "text": "what chair is this?" }
                ]
            })
        );
    }

    #[test]
    fn agent_config_omits_empty_toolgroups() {
        let json = serde_json::to_value(AgentConfig::greedy("m", "be helpful")).unwrap();
        assert!(json.get("toolgroups").is_none());
        assert_eq!(json["sampling_params"]["strategy"]["type"], "greedy");
        assert_eq!(json["enable_session_persistence"], false);
    }

    #[test]
    fn content_text_flattens_lists() {
        assert_eq!(content_text(&json!("hello")).as_deref(), Some("hello"));
        assert_eq!(
            content_text(&json!([{ "type": "text", "text": "a" }, { "type": "image" }, { "type": "text", "text": "b" }]))
                .as_deref(),
            Some("ab")
        );
        assert_eq!(content_text(&json!([])), None);
        assert_eq!(content_text(&json!(null)), None);
    }

    #[tokio::test]
    async fn agent_session_turn_flow() {
        let app = Router::new()
            .route("/v1/agents", post(|| async { Json(json!({ "agent_id": "ag-1" })) }))
            .route(
                "/v1/agents/{agent_id}/session",
                post(|Path(agent_id): Path<String>| async move {
                    Json(json!({ "session_id": format!("{agent_id}-s1") }))
                }),
            )
            .route(
                "/v1/agents/{agent_id}/session/{session_id}/turn",
                post(|Json(body): Json<serde_json::Value>| async move {
                    let text = body["messages"][0]["content"][0]["text"].clone();
                    Json(json!({ "output_message": { "role": "assistant", "content": format!("echo: {}", text.as_str().unwrap_or_default()) } }))
                }),
            );
        let base = spawn_server(app).await;
        let client = LlamaStackClient::new(reqwest::Client::new(), base);

        let agent_id = client.create_agent(&AgentConfig::greedy("m", "i")).await.unwrap();
        let session_id = client.create_session(&agent_id, "s").await.unwrap();
        let reply = client
            .create_turn(&agent_id, &session_id, &[UserMessage::new(vec![ContentItem::text("hi")])])
            .await
            .unwrap();

        assert_eq!(agent_id, "ag-1");
        assert_eq!(session_id, "ag-1-s1");
        assert_eq!(reply, "echo: hi");
    }

    #[tokio::test]
    async fn rate_limit_is_distinguished() {
        let app = Router::new().route("/v1/agents", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
        let base = spawn_server(app).await;
        let client = LlamaStackClient::new(reqwest::Client::new(), base);

        let err = client.create_agent(&AgentConfig::greedy("m", "i")).await.unwrap_err();
        assert_matches!(err, LlamaStackError::RateLimited);
    }

    #[tokio::test]
    async fn api_errors_keep_status_and_body() {
        let app = Router::new().route(
            "/v1/vector-dbs",
            post(|| async { (StatusCode::BAD_REQUEST, "unknown embedding model") }),
        );
        let base = spawn_server(app).await;
        let client = LlamaStackClient::new(reqwest::Client::new(), base);

        let err = client.register_vector_db("bank", "nope", 384).await.unwrap_err();
        assert_matches!(err, LlamaStackError::Api { status: 400, body } if body == "unknown embedding model");
    }
}
