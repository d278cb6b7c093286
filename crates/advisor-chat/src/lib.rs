//! Conversational layer for the stock advisor
//!
//! [`ConversationManager`] owns the conversation history and context, routes
//! each incoming message through the [`IntentRouter`], and dispatches to
//! exactly one per-intent handler. Handlers may run the workflow engine, call
//! the price agent directly (comparisons), or call the language model
//! directly (follow-ups, clarifications, general questions). Every handler
//! returns the uniform [`Response`] envelope; errors never propagate past
//! `process_message`.

pub mod context;
pub mod intent;
pub mod manager;
pub mod response;

pub use context::ConversationContext;
pub use intent::{Intent, IntentClassification, IntentRouter};
pub use manager::ConversationManager;
pub use response::{ConversationSummary, Response, TurnRecord};
