//! Response envelope, history turns, and the conversation summary

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use advisor_llm::Role;

/// Uniform response envelope returned for every processed message
///
/// Failures render as a readable message plus a structured `data.error`
/// field; callers never see a bare error.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    /// Whether the request was handled successfully
    pub success: bool,
    /// Human-readable response text
    pub message: String,
    /// Structured response payload
    pub data: Value,
}

impl Response {
    /// Successful response
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Failure response with a structured payload
    pub fn failure(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
        }
    }

    /// Failure response carrying only an error string
    pub fn error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self::failure(message, json!({ "error": error.into() }))
    }
}

/// One turn in the conversation history
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    /// Who produced the turn
    pub role: Role,
    /// Turn text
    pub content: String,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
    /// Structured payload attached to assistant turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl TurnRecord {
    /// Record a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            data: None,
        }
    }

    /// Record an assistant turn with its response payload
    pub fn assistant(content: impl Into<String>, data: Value) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            data: Some(data),
        }
    }
}

/// Snapshot of the conversation state
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    /// Number of turns recorded so far
    pub total_messages: usize,
    /// Symbol currently under discussion
    pub current_symbol: Option<String>,
    /// Whether an analysis has completed
    pub analysis_complete: bool,
    /// Currently suggested follow-up questions
    pub follow_up_questions: Vec<String>,
    /// Timestamp of the first turn, when any exist
    pub conversation_start: Option<DateTime<Utc>>,
}
