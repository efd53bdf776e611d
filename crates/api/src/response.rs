//! Shared response bodies for gateway handlers.

use serde::Serialize;

/// `{ "message": ... }` body used for acknowledgements and successes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
