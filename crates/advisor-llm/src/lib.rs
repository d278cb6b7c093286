//! Language model abstraction for the stock advisor
//!
//! This crate defines the narrow interface the orchestration core uses to
//! talk to a language model:
//!
//! - [`LanguageModel`]: the completion trait implemented by concrete clients
//! - [`ChatMessage`] / [`Role`]: role-tagged conversation messages
//! - [`json::parse_or`]: lenient parsing of model output into typed values
//!
//! Concrete model clients (HTTP providers, local runtimes) live outside this
//! workspace; the core only ever sees `Arc<dyn LanguageModel>`.

pub mod error;
pub mod json;
pub mod messages;
pub mod model;

pub use error::{LlmError, Result};
pub use messages::{ChatMessage, Role};
pub use model::LanguageModel;
