//! Report generation collaborator

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    AnalysisResult, FetchOutcome, FundamentalsData, NewsData, PriceData, TraceMessage,
};

/// Report generation error
#[derive(Debug, Error)]
#[error("Report generation failed: {0}")]
pub struct ReportError(pub String);

/// Locations of generated report artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPaths {
    /// PDF report location
    pub pdf_path: String,
    /// JSON report location
    pub json_path: String,
}

/// Everything the report generator needs about one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    /// Ticker symbol
    pub symbol: String,
    /// When the analysis ran
    pub analysis_date: DateTime<Utc>,
    /// Synthesized result, if the synthesis stage produced one
    pub analysis: Option<AnalysisResult>,
    /// Raw price payload or its error marker
    pub price_data: Option<FetchOutcome<PriceData>>,
    /// Raw news payload or its error marker
    pub news_data: Option<FetchOutcome<NewsData>>,
    /// Raw fundamentals payload or its error marker
    pub fundamentals_data: Option<FetchOutcome<FundamentalsData>>,
    /// Stage-by-stage audit trail
    pub history: Vec<TraceMessage>,
}

/// Report sink collaborator
///
/// Unlike the retrieval agents, the sink may fail with an error; the caller
/// catches it and records a stage error.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Generate report artifacts and return their locations
    async fn generate(&self, payload: &ReportPayload) -> Result<ReportPaths, ReportError>;
}
