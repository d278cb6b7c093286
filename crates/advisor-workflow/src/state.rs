//! Workflow state and the per-stage update record
//!
//! One [`WorkflowState`] exists per `analyze` invocation. Stages never mutate
//! it directly; each returns a [`StageUpdate`] that the runner merges in
//! before the next stage executes.

use serde::Serialize;

use advisor_core::{
    AnalysisResult, FetchOutcome, FundamentalsData, NewsData, PriceData, TraceMessage,
};

/// The six pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Extract symbol, period, and news lookback from the query
    Parse,
    /// Fetch price and technical data
    FetchPrice,
    /// Fetch news sentiment
    FetchNews,
    /// Fetch fundamentals
    FetchFundamentals,
    /// Produce the investment recommendation
    Synthesize,
    /// Hand the accumulated state to the report sink
    Report,
}

impl Stage {
    /// The fixed pipeline order
    pub const PIPELINE: [Stage; 6] = [
        Stage::Parse,
        Stage::FetchPrice,
        Stage::FetchNews,
        Stage::FetchFundamentals,
        Stage::Synthesize,
        Stage::Report,
    ];

    /// Agent label used in trace messages
    pub fn agent_name(self) -> &'static str {
        match self {
            Stage::Parse => "coordinator",
            Stage::FetchPrice => "price-agent",
            Stage::FetchNews => "news-agent",
            Stage::FetchFundamentals => "fundamentals-agent",
            Stage::Synthesize => "analysis-agent",
            Stage::Report => "report-agent",
        }
    }
}

/// Shared record threaded through the pipeline stages
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    /// Stage-by-stage audit trail, starting with the user query
    pub messages: Vec<TraceMessage>,
    /// Target ticker symbol (empty until the parse stage runs)
    pub symbol: String,
    /// Requested time period token
    pub time_period: String,
    /// Requested news lookback in days
    pub news_days: u32,
    /// Price payload or its error marker
    pub price_data: Option<FetchOutcome<PriceData>>,
    /// News payload or its error marker
    pub news_data: Option<FetchOutcome<NewsData>>,
    /// Fundamentals payload or its error marker
    pub fundamentals_data: Option<FetchOutcome<FundamentalsData>>,
    /// Synthesized analysis, once stage five has run
    pub analysis: Option<AnalysisResult>,
    /// Stage currently executing
    pub current_stage: Stage,
    /// Most recent stage error; later stages still run
    pub error: Option<String>,
}

impl WorkflowState {
    /// Create the initial state for one `analyze` call
    pub fn new(query: &str) -> Self {
        Self {
            messages: vec![TraceMessage::user(query)],
            symbol: String::new(),
            time_period: String::new(),
            news_days: 0,
            price_data: None,
            news_data: None,
            fundamentals_data: None,
            analysis: None,
            current_stage: Stage::Parse,
            error: None,
        }
    }

    /// Merge a stage's update into the running state
    pub fn apply(&mut self, update: StageUpdate) {
        if let Some(symbol) = update.symbol {
            self.symbol = symbol;
        }
        if let Some(period) = update.time_period {
            self.time_period = period;
        }
        if let Some(days) = update.news_days {
            self.news_days = days;
        }
        if update.price_data.is_some() {
            self.price_data = update.price_data;
        }
        if update.news_data.is_some() {
            self.news_data = update.news_data;
        }
        if update.fundamentals_data.is_some() {
            self.fundamentals_data = update.fundamentals_data;
        }
        if update.analysis.is_some() {
            self.analysis = update.analysis;
        }
        if update.error.is_some() {
            self.error = update.error;
        }
        self.messages.extend(update.messages);
    }
}

/// Partial state produced by one stage
#[derive(Debug, Default)]
pub struct StageUpdate {
    /// New symbol, from the parse stage
    pub symbol: Option<String>,
    /// New period, from the parse stage
    pub time_period: Option<String>,
    /// New news lookback, from the parse stage
    pub news_days: Option<u32>,
    /// Price fetch outcome
    pub price_data: Option<FetchOutcome<PriceData>>,
    /// News fetch outcome
    pub news_data: Option<FetchOutcome<NewsData>>,
    /// Fundamentals fetch outcome
    pub fundamentals_data: Option<FetchOutcome<FundamentalsData>>,
    /// Analysis result, from synthesis or report merging
    pub analysis: Option<AnalysisResult>,
    /// Stage error, recorded without halting the pipeline
    pub error: Option<String>,
    /// Trace messages to append
    pub messages: Vec<TraceMessage>,
}

impl StageUpdate {
    /// Record a trace message for the given stage
    pub fn trace(mut self, stage: Stage, content: impl Into<String>) -> Self {
        self.messages
            .push(TraceMessage::agent(stage.agent_name(), content));
        self
    }
}

/// Result of one `analyze` call
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
    /// False only when an error escaped the synthesis or report stage
    pub success: bool,
    /// Synthesized analysis, when one was produced
    pub analysis: Option<AnalysisResult>,
    /// Final (possibly partial) state
    pub state: WorkflowState,
    /// Error surfaced by the run, if any
    pub error: Option<String>,
}
