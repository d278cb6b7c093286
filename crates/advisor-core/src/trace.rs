//! Workflow audit trail messages
//!
//! Every pipeline stage appends one trace message recording which agent ran
//! and whether it errored. The sequence is an audit trail, not a control
//! mechanism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the workflow message sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMessage {
    /// Message role ("user" or "assistant")
    pub role: String,
    /// Message content
    pub content: String,
    /// Originating agent, for assistant messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
}

impl TraceMessage {
    /// Record the user's query
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            agent: None,
            timestamp: Utc::now(),
        }
    }

    /// Record an agent's stage result
    pub fn agent(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            agent: Some(agent.into()),
            timestamp: Utc::now(),
        }
    }
}
