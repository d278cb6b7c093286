//! Tagged result type for retrieval agent payloads
//!
//! Retrieval agents never error past their own boundary: a fetch either
//! yields a typed payload or a payload-shaped error marker. Core logic
//! matches on the tag instead of probing loose maps for an `error` key.

use serde::{Deserialize, Serialize};

/// Outcome of a retrieval agent fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchOutcome<T> {
    /// Structured payload
    Data(T),
    /// Agent-reported failure
    Failed {
        /// Error description from the agent
        error: String,
    },
}

impl<T> FetchOutcome<T> {
    /// Create a failed outcome
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Get the payload, if any
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Failed { .. } => None,
        }
    }

    /// Get the error, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Data(_) => None,
            Self::Failed { error } => Some(error),
        }
    }

    /// Whether the fetch failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_accessors() {
        let outcome: FetchOutcome<u32> = FetchOutcome::Data(42);
        assert_eq!(outcome.data(), Some(&42));
        assert_eq!(outcome.error(), None);
        assert!(!outcome.is_failed());
    }

    #[test]
    fn test_failed_accessors() {
        let outcome: FetchOutcome<u32> = FetchOutcome::failed("rate limited");
        assert_eq!(outcome.data(), None);
        assert_eq!(outcome.error(), Some("rate limited"));
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_failed_serializes_error_field() {
        let outcome: FetchOutcome<u32> = FetchOutcome::failed("boom");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "boom");
    }
}
