//! Message types for the shared conversation.
//!
//! Roles: human (the request and every unit's contribution), system (instructions
//! rendered into oracle prompts), tool result (observations inside a worker loop).

use serde::{Deserialize, Serialize};

use crate::team::UnitId;

/// Who a message speaks as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Human,
    System,
    ToolResult,
}

/// A single message in the conversation.
///
/// Immutable once created: fields are read through accessors. A human message
/// without author is a user request; units always stamp their own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<UnitId>,
    content: String,
}

impl Message {
    /// Creates a human message with no author (user input).
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            author: None,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            author: None,
            content: content.into(),
        }
    }

    /// Creates a tool-result message.
    pub fn tool_result(content: impl Into<String>) -> Self {
        Self {
            role: Role::ToolResult,
            author: None,
            content: content.into(),
        }
    }

    /// Returns the same message stamped with `author`.
    pub fn by(self, author: impl Into<UnitId>) -> Self {
        Self {
            author: Some(author.into()),
            ..self
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn author(&self) -> Option<UnitId> {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// True for a human message that no unit authored.
    pub fn is_user_request(&self) -> bool {
        self.role == Role::Human && self.author.is_none()
    }
}
