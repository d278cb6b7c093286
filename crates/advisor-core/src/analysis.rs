//! Synthesized analysis result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ReportPaths;

/// The investment recommendation produced by the synthesis stage
///
/// A degenerate result (recommendation "N/A", confidence 0.0) is produced
/// when price data is unavailable; the report stage augments a result with
/// artifact locations after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Ticker symbol the analysis covers
    pub symbol: String,
    /// "Buy", "Sell", "Hold", or "N/A"
    pub recommendation: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Full model completion text (or the degradation explanation)
    pub summary: String,
    /// Overall news sentiment label, "N/A" when news was unavailable
    pub sentiment: String,
    /// Risk factors surfaced during synthesis
    pub risk_factors: Vec<String>,
    /// Current price echoed from the price payload
    pub current_price: Option<f64>,
    /// Company name echoed from the price payload
    pub company_name: Option<String>,
    /// Report artifact locations, merged in by the report stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<ReportPaths>,
    /// When the analysis was produced
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Degenerate result used when price data never arrived
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            recommendation: "N/A".to_string(),
            confidence: 0.0,
            summary: reason.into(),
            sentiment: "N/A".to_string(),
            risk_factors: Vec::new(),
            current_price: None,
            company_name: None,
            reports: None,
            generated_at: Utc::now(),
        }
    }
}
