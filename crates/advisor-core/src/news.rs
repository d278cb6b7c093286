//! News sentiment payload and retrieval trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::FetchOutcome;

/// News sentiment payload returned by the news retrieval agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsData {
    /// Ticker symbol
    pub symbol: String,
    /// Lookback window in days
    pub period_days: u32,
    /// Overall sentiment label ("positive" / "neutral" / "negative")
    pub overall_sentiment: String,
    /// Average per-article sentiment score in [-1, 1]
    pub average_score: f64,
    /// Number of articles considered
    pub articles_count: u32,
    /// Short narrative summary of the coverage
    pub summary: String,
}

/// News retrieval collaborator
///
/// Signals failure through [`FetchOutcome::Failed`]; never errors past its
/// own boundary.
#[async_trait]
pub trait NewsAgent: Send + Sync {
    /// Fetch news sentiment for a symbol over a lookback window
    async fn fetch(&self, symbol: &str, days: u32) -> FetchOutcome<NewsData>;
}
