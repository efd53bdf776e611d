//! The interior-design agent and its catalog vector DB.
//!
//! [`AgentService`] is built once at startup and shared through `AppState`.
//! It owns the LlamaStack handles (agent id, vector DB id) and the single
//! chat session every endpoint shares, created on first use.

use std::path::Path;
use std::time::Duration;

use interio_providers::llama_stack::{AgentConfig, Document, LlamaStackClient, LlamaStackError, UserMessage};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::AgentError;
use crate::prompts;

/// Vector DB holding the furniture catalog.
pub const VECTOR_DB_ID: &str = "interio_bank";
pub const EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const EMBEDDING_DIMENSION: u32 = 384;
pub const CHUNK_SIZE_IN_TOKENS: u32 = 512;

/// RAG query limits for catalog retrieval.
pub const RAG_MAX_CHUNKS: u32 = 5;
pub const RAG_MAX_TOKENS_IN_CONTEXT: u32 = 4096;

/// Extra attempts after a 429.
pub const RATE_LIMIT_RETRIES: u32 = 1;
/// Delay before the first retry; doubles on each further attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// One catalog hit returned by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub image: String,
    pub price: String,
    pub description: String,
}

/// A chat turn's outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub session_id: String,
    pub reply: String,
}

pub struct AgentService {
    client: LlamaStackClient,
    model: String,
    agent_id: String,
    vector_db_id: String,
    session: OnceCell<String>,
    retry_delay: Duration,
}

impl AgentService {
    /// Create the designer agent and index `document_dir` into the vector DB.
    ///
    /// Fails if the directory holds no files.
    pub async fn initialize(
        client: LlamaStackClient,
        model: String,
        document_dir: &Path,
    ) -> Result<Self, AgentError> {
        let config = AgentConfig::greedy(model.clone(), prompts::DESIGNER_INSTRUCTIONS).persistent();
        let agent_id = client.create_agent(&config).await?;
        tracing::info!(agent_id = %agent_id, model = %model, "Designer agent created");

        let documents = load_documents(document_dir).await?;

        tracing::info!(vector_db_id = VECTOR_DB_ID, "Registering vector db");
        client
            .register_vector_db(VECTOR_DB_ID, EMBEDDING_MODEL, EMBEDDING_DIMENSION)
            .await?;
        client
            .insert_documents(VECTOR_DB_ID, &documents, CHUNK_SIZE_IN_TOKENS)
            .await?;
        tracing::info!(
            vector_db_id = VECTOR_DB_ID,
            documents = documents.len(),
            "Catalog documents inserted"
        );

        Ok(Self {
            client,
            model,
            agent_id,
            vector_db_id: VECTOR_DB_ID.to_string(),
            session: OnceCell::new(),
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The shared session id, if it has been created yet.
    pub fn session_id(&self) -> Option<&str> {
        self.session.get().map(String::as_str)
    }

    /// The shared chat session, created on first call.
    ///
    /// Concurrent first callers wait on the same creation; a failed creation
    /// leaves the cell empty so the next call retries.
    pub async fn global_session(&self) -> Result<&str, LlamaStackError> {
        let session_id = self
            .session
            .get_or_try_init(|| async {
                let name = uuid::Uuid::new_v4().simple().to_string();
                let session_id = self.client.create_session(&self.agent_id, &name).await?;
                tracing::info!(session_id = %session_id, "Global chat session created");
                Ok::<_, LlamaStackError>(session_id)
            })
            .await?;
        Ok(session_id)
    }

    /// Run one turn of the shared conversation.
    pub async fn chat(&self, message: UserMessage) -> Result<ChatReply, AgentError> {
        let session_id = self.global_session().await?;
        let reply = self
            .client
            .create_turn(&self.agent_id, session_id, std::slice::from_ref(&message))
            .await?;
        Ok(ChatReply {
            session_id: session_id.to_string(),
            reply: reply.trim().to_string(),
        })
    }

    /// Find catalog items matching `description` with a one-off RAG agent.
    pub async fn retrieve_images(&self, description: &str) -> Result<Vec<CatalogItem>, AgentError> {
        let config = AgentConfig::greedy(self.model.clone(), "").with_toolgroup(serde_json::json!({
            "name": "builtin::rag",
            "args": {
                "vector_db_ids": [self.vector_db_id],
                "query": description,
                "query_config": {
                    "max_chunks": RAG_MAX_CHUNKS,
                    "max_tokens_in_context": RAG_MAX_TOKENS_IN_CONTEXT,
                },
            },
        }));
        let reply = self
            .create_single_turn(&config, &[prompts::retrieval_message(description)])
            .await?;
        tracing::debug!(reply = %reply, "Retrieval reply");
        parse_catalog_reply(&reply)
    }

    /// Create a throwaway agent and session and run a single turn on it.
    ///
    /// A 429 anywhere in the sequence restarts it after a delay, up to
    /// [`RATE_LIMIT_RETRIES`] times.
    pub async fn create_single_turn(
        &self,
        config: &AgentConfig,
        messages: &[UserMessage],
    ) -> Result<String, LlamaStackError> {
        let mut delay = self.retry_delay;
        let mut attempt = 0;
        loop {
            match self.single_turn_once(config, messages).await {
                Err(LlamaStackError::RateLimited) if attempt < RATE_LIMIT_RETRIES => {
                    attempt += 1;
                    tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "Rate limit hit, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                result => return result,
            }
        }
    }

    async fn single_turn_once(
        &self,
        config: &AgentConfig,
        messages: &[UserMessage],
    ) -> Result<String, LlamaStackError> {
        let agent_id = self.client.create_agent(config).await?;
        let session_name = uuid::Uuid::new_v4().simple().to_string();
        let session_id = self.client.create_session(&agent_id, &session_name).await?;
        self.client.create_turn(&agent_id, &session_id, messages).await
    }
}

/// Read every file in `dir` as a plain-text document, in file name order.
pub async fn load_documents(dir: &Path) -> Result<Vec<Document>, AgentError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AgentError::NoDocuments(dir.to_path_buf()));
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!(path = %path.display(), "Loading catalog document");
        documents.push(Document {
            document_id: uuid::Uuid::new_v4().simple().to_string(),
            content: tokio::fs::read_to_string(&path).await?,
            mime_type: "text/plain".to_string(),
        });
    }
    Ok(documents)
}

/// Parse the model's JSON array reply, tolerating a surrounding code fence.
pub fn parse_catalog_reply(reply: &str) -> Result<Vec<CatalogItem>, AgentError> {
    let trimmed = reply.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(unfenced).map_err(|e| AgentError::InvalidReply(e.to_string()))
}
