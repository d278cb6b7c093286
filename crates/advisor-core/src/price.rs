//! Price and technical data payload and retrieval trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::FetchOutcome;

/// Current quote snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Last traded price
    pub price: f64,
    /// Previous session close
    pub previous_close: f64,
    /// Absolute change since previous close
    pub change: f64,
    /// Percent change since previous close
    pub change_percent: f64,
    /// Session volume
    pub volume: u64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// Session open
    pub open: f64,
    /// Market capitalization, when the provider reports it
    pub market_cap: Option<f64>,
    /// Trailing P/E ratio, when the provider reports it
    pub pe_ratio: Option<f64>,
}

/// Performance over the requested period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performance {
    /// Percent return over the period
    pub period_return: f64,
    /// Annualized volatility percent, when enough history exists
    pub volatility: Option<f64>,
}

/// Company identification fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Company name
    pub name: String,
    /// Sector label
    pub sector: Option<String>,
    /// Industry label
    pub industry: Option<String>,
}

/// Price/technical payload returned by the price retrieval agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceData {
    /// Ticker symbol
    pub symbol: String,
    /// Period the data covers (e.g. "1y")
    pub period: String,
    /// Current quote
    pub current: Quote,
    /// Period performance
    pub performance: Performance,
    /// Company info, when available
    pub company: Option<CompanyInfo>,
}

/// Price retrieval collaborator
///
/// Signals failure through [`FetchOutcome::Failed`]; never errors past its
/// own boundary.
#[async_trait]
pub trait PriceAgent: Send + Sync {
    /// Fetch price and technical data for a symbol over a period
    async fn fetch(&self, symbol: &str, period: &str) -> FetchOutcome<PriceData>;
}
