use askdocs_core::{ConversationRecord, Message, Role};
use serde::{Deserialize, Serialize};

use crate::ApiError;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub messages: Option<Vec<InboundMessage>>,
}

/// A prior turn as sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub role: String,
    pub content: String,
}

impl InboundMessage {
    /// `"user"` is the user; any other non-empty role is the assistant
    pub fn to_message(&self) -> Result<Message, ApiError> {
        let role = match self.role.trim() {
            "" => {
                return Err(ApiError::BadRequest(
                    "history message role must not be empty".to_string(),
                ));
            }
            "user" => Role::User,
            _ => Role::Assistant,
        };
        Ok(Message::new(role, self.content.clone()))
    }
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            messages: None,
        }
    }

    pub fn with_history(mut self, history: Vec<InboundMessage>) -> Self {
        self.messages = Some(history);
        self
    }

    /// Validate and build the record the pipeline runs on
    pub fn into_record(self) -> Result<ConversationRecord, ApiError> {
        if self.message.trim().is_empty() {
            return Err(ApiError::BadRequest("message must not be empty".to_string()));
        }

        let history = self
            .messages
            .unwrap_or_default()
            .iter()
            .map(InboundMessage::to_message)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConversationRecord::new(history, self.message))
    }
}

/// Body of a successful `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
