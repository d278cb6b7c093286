//! Conversation-scoped context
//!
//! Distinct from per-message history: the context records what the
//! conversation is currently about (symbol, last analysis) and is mutated
//! only by the manager's handlers.

use advisor_core::AnalysisResult;

/// Context carried across turns of one conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    /// Symbol currently under discussion
    pub symbol: Option<String>,
    /// Whether a full analysis has completed this conversation
    pub analysis_complete: bool,
    /// The most recent completed analysis
    pub last_analysis: Option<AnalysisResult>,
    /// Suggested follow-up questions from the last analysis
    pub follow_up_questions: Vec<String>,
}

impl ConversationContext {
    /// Reset to the initial state
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
