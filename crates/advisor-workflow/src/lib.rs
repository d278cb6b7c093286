//! Six-stage analysis pipeline for the stock advisor
//!
//! The workflow engine runs a fixed, linear pipeline over a single
//! [`WorkflowState`]:
//!
//! ```text
//! parse -> fetch price -> fetch news -> fetch fundamentals -> synthesize -> report
//! ```
//!
//! Each stage is a function from the current state to a [`StageUpdate`],
//! merged into the running state before the next stage executes. Fetch-stage
//! failures are recorded but never abort the pipeline; downstream stages
//! guard against missing payloads, so an analysis degrades gracefully when a
//! data provider is rate-limited or unavailable.

pub mod engine;
pub mod query;
pub mod state;

pub use engine::{WorkflowEngine, WorkflowError};
pub use query::{ParsedQuery, extract_symbol, extract_symbols, parse_query};
pub use state::{Stage, StageUpdate, WorkflowOutcome, WorkflowState};
