//! Interio agent service library.
//!
//! Wraps a LlamaStack distribution behind a small HTTP API: chat turns on a
//! shared session and RAG retrieval over the furniture catalog.

pub mod config;
pub mod error;
pub mod handlers;
pub mod prompts;
pub mod router;
pub mod routes;
pub mod service;
pub mod state;
