//! Fundamentals payload and retrieval trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::FetchOutcome;

/// Fundamentals payload returned by the fundamentals retrieval agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalsData {
    /// Ticker symbol
    pub symbol: String,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Trailing P/E
    pub trailing_pe: Option<f64>,
    /// Net profit margin
    pub profit_margins: Option<f64>,
    /// Year-over-year revenue growth
    pub revenue_growth: Option<f64>,
    /// Debt to equity ratio
    pub debt_to_equity: Option<f64>,
    /// Qualitative financial health label
    pub financial_health: Option<String>,
}

/// Fundamentals retrieval collaborator
///
/// Signals failure through [`FetchOutcome::Failed`]; never errors past its
/// own boundary.
#[async_trait]
pub trait FundamentalsAgent: Send + Sync {
    /// Fetch fundamentals for a symbol
    async fn fetch(&self, symbol: &str) -> FetchOutcome<FundamentalsData>;
}
