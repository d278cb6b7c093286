//! The workflow engine: a fixed six-stage pipeline with per-stage failure
//! tolerance
//!
//! Fetch failures are non-fatal and non-retried; the stage records an error
//! and the pipeline keeps going, which is what lets an analysis degrade
//! gracefully when a data provider is rate-limited or down. Only an error
//! escaping the synthesis stage (a language model transport failure) fails
//! the whole `analyze` call, and even then the partial state is returned.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use advisor_core::{
    AdvisorConfig, AnalysisResult, FundamentalsAgent, NewsAgent, PriceAgent, ReportPayload,
    ReportSink,
};
use advisor_llm::{ChatMessage, LanguageModel};

use crate::query::parse_query;
use crate::state::{Stage, StageUpdate, WorkflowOutcome, WorkflowState};

/// Errors that abort a workflow run
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The language model call escaped the synthesis stage
    #[error("Analysis error: {0}")]
    Synthesis(String),
}

/// Coordinator for the six-stage analysis pipeline
pub struct WorkflowEngine {
    llm: Arc<dyn LanguageModel>,
    price: Arc<dyn PriceAgent>,
    news: Arc<dyn NewsAgent>,
    fundamentals: Arc<dyn FundamentalsAgent>,
    reports: Arc<dyn ReportSink>,
    config: Arc<AdvisorConfig>,
}

impl WorkflowEngine {
    /// Create an engine wired to its collaborators
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        price: Arc<dyn PriceAgent>,
        news: Arc<dyn NewsAgent>,
        fundamentals: Arc<dyn FundamentalsAgent>,
        reports: Arc<dyn ReportSink>,
        config: Arc<AdvisorConfig>,
    ) -> Self {
        Self {
            llm,
            price,
            news,
            fundamentals,
            reports,
            config,
        }
    }

    /// Run the full pipeline for one query
    ///
    /// A fresh [`WorkflowState`] is created per call; states are never shared
    /// across invocations.
    pub async fn analyze(&self, query: &str) -> WorkflowOutcome {
        let mut state = WorkflowState::new(query);

        for stage in Stage::PIPELINE {
            state.current_stage = stage;
            tracing::debug!(stage = stage.agent_name(), symbol = %state.symbol, "running stage");

            match self.run_stage(stage, &state).await {
                Ok(update) => state.apply(update),
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(stage = stage.agent_name(), error = %message, "workflow aborted");
                    state.error = Some(message.clone());
                    return WorkflowOutcome {
                        success: false,
                        analysis: state.analysis.clone(),
                        state,
                        error: Some(message),
                    };
                }
            }
        }

        let error = state.error.clone();
        WorkflowOutcome {
            success: true,
            analysis: state.analysis.clone(),
            state,
            error,
        }
    }

    async fn run_stage(
        &self,
        stage: Stage,
        state: &WorkflowState,
    ) -> Result<StageUpdate, WorkflowError> {
        match stage {
            Stage::Parse => Ok(self.parse(state)),
            Stage::FetchPrice => Ok(self.fetch_price(state).await),
            Stage::FetchNews => Ok(self.fetch_news(state).await),
            Stage::FetchFundamentals => Ok(self.fetch_fundamentals(state).await),
            Stage::Synthesize => self.synthesize(state).await,
            Stage::Report => Ok(self.report(state).await),
        }
    }

    /// Stage 1: extract symbol, period, and news lookback. Never fails;
    /// missing parameters fall back to configured defaults.
    fn parse(&self, state: &WorkflowState) -> StageUpdate {
        let query = state
            .messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let parsed = parse_query(query, &self.config);

        let note = format!(
            "Parsed query: symbol={} period={} news_days={}",
            parsed.symbol, parsed.period, parsed.news_days
        );

        StageUpdate {
            symbol: Some(parsed.symbol),
            time_period: Some(parsed.period),
            news_days: Some(parsed.news_days),
            ..Default::default()
        }
        .trace(Stage::Parse, note)
    }

    /// Stage 2: price data. Failure is recorded, never fatal.
    async fn fetch_price(&self, state: &WorkflowState) -> StageUpdate {
        let outcome = self.price.fetch(&state.symbol, &state.time_period).await;

        let mut update = StageUpdate::default();
        match outcome.error() {
            None => {
                update = update.trace(
                    Stage::FetchPrice,
                    format!("Retrieved price data for {}", state.symbol),
                );
            }
            Some(error) => {
                update.error = Some(format!("Price data error: {error}"));
                update = update.trace(
                    Stage::FetchPrice,
                    format!("Error retrieving price data: {error}"),
                );
            }
        }
        update.price_data = Some(outcome);
        update
    }

    /// Stage 3: news sentiment. Same failure tolerance as stage 2.
    async fn fetch_news(&self, state: &WorkflowState) -> StageUpdate {
        let outcome = self.news.fetch(&state.symbol, state.news_days).await;

        let mut update = StageUpdate::default();
        match outcome.error() {
            None => {
                update = update.trace(
                    Stage::FetchNews,
                    format!("Retrieved news sentiment for {}", state.symbol),
                );
            }
            Some(error) => {
                update.error = Some(format!("News data error: {error}"));
                update = update.trace(
                    Stage::FetchNews,
                    format!("Error retrieving news data: {error}"),
                );
            }
        }
        update.news_data = Some(outcome);
        update
    }

    /// Stage 4: fundamentals. Same failure tolerance as stage 2.
    async fn fetch_fundamentals(&self, state: &WorkflowState) -> StageUpdate {
        let outcome = self.fundamentals.fetch(&state.symbol).await;

        let mut update = StageUpdate::default();
        match outcome.error() {
            None => {
                update = update.trace(
                    Stage::FetchFundamentals,
                    format!("Retrieved fundamentals for {}", state.symbol),
                );
            }
            Some(error) => {
                update.error = Some(format!("Fundamentals error: {error}"));
                update = update.trace(
                    Stage::FetchFundamentals,
                    format!("Error retrieving fundamentals: {error}"),
                );
            }
        }
        update.fundamentals_data = Some(outcome);
        update
    }

    /// Stage 5: synthesize the recommendation
    ///
    /// Without usable price data this produces a degenerate result instead of
    /// calling the model. A model failure here is the one hard failure of the
    /// pipeline.
    async fn synthesize(&self, state: &WorkflowState) -> Result<StageUpdate, WorkflowError> {
        let price = state.price_data.as_ref().and_then(|o| o.data());

        let Some(price) = price else {
            let reason = state
                .price_data
                .as_ref()
                .and_then(|o| o.error())
                .unwrap_or("price data was not retrieved");
            let analysis = AnalysisResult::unavailable(
                &state.symbol,
                format!("Analysis unavailable for {}: {reason}", state.symbol),
            );

            return Ok(StageUpdate {
                analysis: Some(analysis),
                ..Default::default()
            }
            .trace(
                Stage::Synthesize,
                format!("Skipped model synthesis for {}: {reason}", state.symbol),
            ));
        };

        let prompt = self.synthesis_prompt(state, price);
        let completion = self
            .llm
            .complete(vec![ChatMessage::user(prompt)])
            .await
            .map_err(|err| WorkflowError::Synthesis(err.to_string()))?;

        let (recommendation, confidence) = recommendation_from(&completion);

        let news = state.news_data.as_ref().and_then(|o| o.data());
        let sentiment = news
            .map(|n| n.overall_sentiment.clone())
            .unwrap_or_else(|| "N/A".to_string());

        let mut risk_factors = Vec::new();
        if state.news_data.as_ref().is_none_or(|o| o.is_failed()) {
            risk_factors.push("News sentiment was unavailable for this analysis".to_string());
        }
        if state
            .fundamentals_data
            .as_ref()
            .is_none_or(|o| o.is_failed())
        {
            risk_factors.push("Fundamentals were unavailable for this analysis".to_string());
        }

        let analysis = AnalysisResult {
            symbol: state.symbol.clone(),
            recommendation: recommendation.to_string(),
            confidence,
            summary: completion,
            sentiment,
            risk_factors,
            current_price: Some(price.current.price),
            company_name: price.company.as_ref().map(|c| c.name.clone()),
            reports: None,
            generated_at: Utc::now(),
        };

        Ok(StageUpdate {
            analysis: Some(analysis),
            ..Default::default()
        }
        .trace(
            Stage::Synthesize,
            format!("Completed analysis for {}", state.symbol),
        ))
    }

    /// Stage 6: hand the accumulated state to the report sink
    ///
    /// Sink failure is recorded as a stage error; the stage-five analysis is
    /// preserved either way.
    async fn report(&self, state: &WorkflowState) -> StageUpdate {
        let payload = ReportPayload {
            symbol: state.symbol.clone(),
            analysis_date: Utc::now(),
            analysis: state.analysis.clone(),
            price_data: state.price_data.clone(),
            news_data: state.news_data.clone(),
            fundamentals_data: state.fundamentals_data.clone(),
            history: state.messages.clone(),
        };

        match self.reports.generate(&payload).await {
            Ok(paths) => {
                let analysis = state.analysis.clone().map(|mut a| {
                    a.reports = Some(paths);
                    a
                });
                StageUpdate {
                    analysis,
                    ..Default::default()
                }
                .trace(
                    Stage::Report,
                    format!("Generated investment report for {}", state.symbol),
                )
            }
            Err(err) => StageUpdate {
                error: Some(format!("Report generation error: {err}")),
                ..Default::default()
            }
            .trace(Stage::Report, format!("Error generating report: {err}")),
        }
    }

    fn synthesis_prompt(
        &self,
        state: &WorkflowState,
        price: &advisor_core::PriceData,
    ) -> String {
        let news = state.news_data.as_ref().and_then(|o| o.data());
        let fundamentals = state.fundamentals_data.as_ref().and_then(|o| o.data());

        let news_section = news.map_or_else(
            || "Not available".to_string(),
            |n| {
                format!(
                    "sentiment={} (avg score {:.2}, {} articles). {}",
                    n.overall_sentiment, n.average_score, n.articles_count, n.summary
                )
            },
        );

        let fundamentals_section = fundamentals.map_or_else(
            || "Not available".to_string(),
            |f| {
                format!(
                    "trailing P/E={}, profit margins={}, revenue growth={}, debt/equity={}, health={}",
                    fmt_opt(f.trailing_pe),
                    fmt_opt(f.profit_margins),
                    fmt_opt(f.revenue_growth),
                    fmt_opt(f.debt_to_equity),
                    f.financial_health.as_deref().unwrap_or("N/A"),
                )
            },
        );

        let company = price
            .company
            .as_ref()
            .map_or("N/A", |c| c.name.as_str());

        format!(
            "Analyze the following stock data for {symbol} ({company}):\n\
             \n\
             Price: ${price:.2} ({change:+.2}% today), period return {ret:.2}% over {period}, \
             volatility {vol}, market cap {cap}, P/E {pe}\n\
             News sentiment: {news_section}\n\
             Fundamentals: {fundamentals_section}\n\
             \n\
             Provide a comprehensive analysis covering:\n\
             1. Current stock performance\n\
             2. News sentiment impact\n\
             3. Financial health assessment\n\
             4. Risk factors\n\
             5. Investment recommendation (Buy/Hold/Sell) with reasoning",
            symbol = state.symbol,
            company = company,
            price = price.current.price,
            change = price.current.change_percent,
            ret = price.performance.period_return,
            period = price.period,
            vol = fmt_opt(price.performance.volatility),
            cap = fmt_opt(price.current.market_cap),
            pe = fmt_opt(price.current.pe_ratio),
        )
    }
}

/// Keyword-based recommendation detection over free-form model text
///
/// Deliberately simple substring matching, kept for behavioral fidelity with
/// the known phrasing-sensitivity that implies.
fn recommendation_from(completion: &str) -> (&'static str, f64) {
    let lower = completion.to_lowercase();
    if lower.contains("buy") && !lower.contains("don't buy") {
        ("Buy", 0.8)
    } else if lower.contains("sell") {
        ("Sell", 0.75)
    } else {
        ("Hold", 0.7)
    }
}

/// Format an optional metric, defaulting to "N/A"
///
/// Missing individual fields must never abort prompt construction.
fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
