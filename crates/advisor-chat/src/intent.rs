//! Intent classification for incoming user messages
//!
//! One language model call per message, with a strict total fallback: if the
//! call fails or the output does not parse, classification degrades to
//! [`Intent::Unknown`] with zero confidence. The router never errors past
//! this boundary, so a misbehaving model lands the user on the "I don't
//! understand" path instead of crashing the conversation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use advisor_llm::{ChatMessage, LanguageModel, json::parse_or};

use crate::context::ConversationContext;

/// The classified purpose of a user message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Analyze a new stock
    NewAnalysis,
    /// Follow-up question about the previous analysis
    FollowUp,
    /// Clarification of the previous analysis
    Clarification,
    /// Compare multiple stocks
    Comparison,
    /// General investing/markets question
    GeneralQuestion,
    /// Could not determine intent
    Unknown,
}

/// Result of classifying one message; recomputed per message, never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentClassification {
    /// Intent category
    #[serde(rename = "type")]
    pub intent: Intent,
    /// Model confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    /// Stock symbols mentioned, in order
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Time period mentioned, if any
    #[serde(default)]
    pub time_period: Option<String>,
    /// Specific questions asked
    #[serde(default)]
    pub specific_questions: Vec<String>,
    /// Comparison dimensions requested
    #[serde(default)]
    pub comparison_parameters: Vec<String>,
}

impl IntentClassification {
    /// The total fallback classification
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            symbols: Vec::new(),
            time_period: None,
            specific_questions: Vec::new(),
            comparison_parameters: Vec::new(),
        }
    }
}

/// Classifies user messages with one model call and a total fallback
pub struct IntentRouter {
    llm: Arc<dyn LanguageModel>,
}

impl IntentRouter {
    /// Create a router backed by the given model
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Classify a message given the current conversation context
    ///
    /// Never fails: any model or parse error yields the `unknown` fallback.
    pub async fn classify(
        &self,
        message: &str,
        context: &ConversationContext,
    ) -> IntentClassification {
        let prompt = classification_prompt(message, context);

        match self.llm.complete(vec![ChatMessage::user(prompt)]).await {
            Ok(completion) => {
                let classification = parse_or(&completion, IntentClassification::unknown());
                tracing::debug!(
                    intent = ?classification.intent,
                    confidence = classification.confidence,
                    "classified message"
                );
                classification
            }
            Err(err) => {
                tracing::debug!("intent classification failed, treating as unknown: {err}");
                IntentClassification::unknown()
            }
        }
    }
}

fn classification_prompt(message: &str, context: &ConversationContext) -> String {
    format!(
        "Analyze the user's message to determine their intent. The user is \
         interacting with a stock analysis assistant.\n\
         \n\
         User message: \"{message}\"\n\
         \n\
         Current context:\n\
         - Previous analysis symbol: {symbol}\n\
         - Analysis complete: {complete}\n\
         \n\
         Classify the intent as one of:\n\
         1. \"new_analysis\" - the user wants to analyze a new stock\n\
         2. \"follow_up\" - follow-up question about the previous analysis\n\
         3. \"clarification\" - asking to clarify the previous analysis\n\
         4. \"comparison\" - the user wants to compare stocks\n\
         5. \"general_question\" - general question about investing or markets\n\
         6. \"unknown\" - cannot determine intent\n\
         \n\
         Also extract stock symbols, time periods, specific questions, and \
         comparison parameters mentioned.\n\
         \n\
         Return JSON only, in this exact shape:\n\
         {{\n\
           \"type\": \"intent_type\",\n\
           \"confidence\": 0.8,\n\
           \"symbols\": [\"AAPL\", \"MSFT\"],\n\
           \"time_period\": \"1y\",\n\
           \"specific_questions\": [\"What if interest rates rise?\"],\n\
           \"comparison_parameters\": [\"performance\", \"financial_health\"]\n\
         }}",
        symbol = context.symbol.as_deref().unwrap_or("none"),
        complete = context.analysis_complete,
    )
}
