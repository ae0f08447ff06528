//! Conversation record shared by the request pipeline stages

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Speaker of a conversational turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when rendering history into a prompt
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One conversational turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render as a single `User: ...` / `Assistant: ...` history line
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.display_name(), self.content)
    }
}

/// Position of a record in the linear request pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Routed,
    Retrieved,
    Synthesized,
    Responded,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Start => "start",
            PipelineState::Routed => "routed",
            PipelineState::Retrieved => "retrieved",
            PipelineState::Synthesized => "synthesized",
            PipelineState::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Per-request state threaded through the pipeline.
///
/// `messages` is chronological and only ever grows by the final assistant
/// reply. `context` is a scratch slot that each stage overwrites: route
/// label, then retrieved text, then summary, then cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub messages: Vec<Message>,
    pub context: Option<String>,
    pub state: PipelineState,
}

impl ConversationRecord {
    /// Build a record from prior turns and the new user message
    pub fn new(history: Vec<Message>, message: impl Into<String>) -> Self {
        let mut messages = history;
        messages.push(Message::user(message));
        Self {
            messages,
            context: None,
            state: PipelineState::Start,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The newest message, which every stage treats as the query
    pub fn latest(&self) -> Result<&Message> {
        self.last_message()
            .ok_or_else(|| Error::InvalidInput("conversation has no messages".to_string()))
    }

    /// Check the entry invariant: non-empty and ending with a user turn
    pub fn validate_entry(&self) -> Result<()> {
        let latest = self.latest()?;
        if latest.role() != Role::User {
            return Err(Error::InvalidInput(
                "the newest message must come from the user".to_string(),
            ));
        }
        Ok(())
    }

    /// The context slot, or an empty string when unset
    pub fn context_text(&self) -> &str {
        self.context.as_deref().unwrap_or_default()
    }

    /// Content of the final assistant reply once the pipeline has responded
    pub fn answer(&self) -> Option<&str> {
        match (self.state, self.last_message()) {
            (PipelineState::Responded, Some(message)) if message.role() == Role::Assistant => {
                Some(message.content())
            }
            _ => None,
        }
    }
}
