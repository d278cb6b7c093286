//! Language model trait definition

use async_trait::async_trait;

use crate::{ChatMessage, Result};

/// Trait for language model clients
///
/// Implementations take an ordered list of role-tagged messages and return a
/// single text completion. Transport and API failures surface as errors; no
/// retry logic is expected from callers.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given messages
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;

    /// Get the model name (e.g., "deepseek-chat")
    fn name(&self) -> &str;
}
