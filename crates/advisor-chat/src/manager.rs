//! Multi-turn conversation management
//!
//! The manager owns the conversation history and context, classifies each
//! message, and dispatches to exactly one per-intent handler. Handlers
//! convert every internal failure into the uniform [`Response`] envelope;
//! `process_message` itself never fails.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;

use advisor_core::{AdvisorConfig, AnalysisResult, PriceAgent};
use advisor_llm::{ChatMessage, LanguageModel, json::parse_or};
use advisor_workflow::{WorkflowEngine, extract_symbol, extract_symbols};

use crate::context::ConversationContext;
use crate::intent::{Intent, IntentRouter};
use crate::response::{ConversationSummary, Response, TurnRecord};

/// Curated follow-up suggestions offered after a completed analysis
const FOLLOW_UP_QUESTIONS: [&str; 8] = [
    "What are the main risk factors for this stock?",
    "How might this stock perform if interest rates rise?",
    "What are the key growth drivers?",
    "How does this compare to its industry peers?",
    "What's the long-term investment potential?",
    "Should I consider buying, holding, or selling?",
    "What are the catalysts that could affect the stock price?",
    "How does the financial health look compared to last year?",
];

const HELP_MESSAGE: &str = "I'm not sure what you're asking for. You can:\n\
     \u{2022} Ask me to analyze a stock (e.g., 'Analyze AAPL')\n\
     \u{2022} Ask follow-up questions about a previous analysis\n\
     \u{2022} Compare multiple stocks\n\
     \u{2022} Ask general investing questions\n\
     \n\
     What would you like to know?";

const DISCLAIMER: &str = "\n\n*Note: This information is for educational purposes \
     only and should not be considered as financial advice.*";

/// Structured answer expected from follow-up and clarification prompts
#[derive(Debug, Deserialize)]
struct ModelAnswer {
    answer: String,
}

/// Structured answer expected from general investing questions
#[derive(Debug, Deserialize)]
struct GeneralAnswer {
    answer: String,
    #[serde(default)]
    topics_covered: Vec<String>,
    #[serde(default)]
    disclaimer_needed: bool,
}

/// Structured narrative expected from comparison prompts
#[derive(Debug, Default, Deserialize)]
struct ComparisonNarrative {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    key_differences: Vec<String>,
    #[serde(default)]
    recommendation: String,
}

/// One row of the comparison table
#[derive(Debug, Clone, Serialize)]
struct ComparisonRow {
    symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    daily_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    period_return: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Manages multi-turn conversations with the analysis pipeline
///
/// Assumes single-caller access; concurrent use requires external
/// serialization.
pub struct ConversationManager {
    router: IntentRouter,
    engine: WorkflowEngine,
    llm: Arc<dyn LanguageModel>,
    price: Arc<dyn PriceAgent>,
    config: Arc<AdvisorConfig>,
    history: Vec<TurnRecord>,
    context: ConversationContext,
}

impl ConversationManager {
    /// Create a manager wired to its collaborators
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        engine: WorkflowEngine,
        price: Arc<dyn PriceAgent>,
        config: Arc<AdvisorConfig>,
    ) -> Self {
        Self {
            router: IntentRouter::new(llm.clone()),
            engine,
            llm,
            price,
            config,
            history: Vec::new(),
            context: ConversationContext::default(),
        }
    }

    /// Process one user message and return the response envelope
    ///
    /// Never fails: every internal error renders as a failure response.
    pub async fn process_message(&mut self, message: &str) -> Response {
        self.history.push(TurnRecord::user(message));

        let classification = self.router.classify(message, &self.context).await;
        tracing::info!(intent = ?classification.intent, "dispatching message");

        let response = match classification.intent {
            Intent::NewAnalysis => self.handle_new_analysis(message).await,
            Intent::FollowUp => self.handle_follow_up(message).await,
            Intent::Clarification => self.handle_clarification(message).await,
            Intent::Comparison => self.handle_comparison(message).await,
            Intent::GeneralQuestion => self.handle_general_question(message).await,
            Intent::Unknown => Self::handle_unknown(message),
        };

        self.history.push(TurnRecord::assistant(
            response.message.clone(),
            response.data.clone(),
        ));

        response
    }

    /// Clear history and context atomically
    pub fn reset_conversation(&mut self) -> Response {
        self.history.clear();
        self.context.clear();

        Response::ok(
            "Conversation reset. You can start a new analysis.",
            json!({ "action": "reset_conversation" }),
        )
    }

    /// Snapshot of the conversation state
    pub fn conversation_summary(&self) -> ConversationSummary {
        ConversationSummary {
            total_messages: self.history.len(),
            current_symbol: self.context.symbol.clone(),
            analysis_complete: self.context.analysis_complete,
            follow_up_questions: self.context.follow_up_questions.clone(),
            conversation_start: self.history.first().map(|t| t.timestamp),
        }
    }

    /// Access the conversation history
    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    async fn handle_new_analysis(&mut self, message: &str) -> Response {
        // Extracted for display; the engine re-parses the full query itself
        let symbol =
            extract_symbol(message).unwrap_or_else(|| self.config.default_symbol.clone());

        self.context.symbol = Some(symbol.clone());
        self.context.analysis_complete = false;

        let outcome = self.engine.analyze(message).await;

        if !outcome.success {
            let error = outcome
                .error
                .unwrap_or_else(|| "Unknown error".to_string());
            return Response::failure(
                format!("I couldn't complete the analysis for {symbol}. Error: {error}"),
                json!({ "type": "new_analysis", "symbol": symbol, "error": error }),
            );
        }

        self.context.analysis_complete = true;
        self.context.last_analysis = outcome.analysis.clone();

        let follow_ups: Vec<String> = FOLLOW_UP_QUESTIONS
            .iter()
            .map(|q| (*q).to_string())
            .collect();
        self.context.follow_up_questions = follow_ups.clone();

        let message_text = self.format_analysis_message(&symbol, outcome.analysis.as_ref());

        Response::ok(
            message_text,
            json!({
                "type": "new_analysis",
                "symbol": symbol,
                "analysis_result": outcome.analysis,
                "follow_up_questions": follow_ups,
            }),
        )
    }

    fn format_analysis_message(&self, symbol: &str, analysis: Option<&AnalysisResult>) -> String {
        let recommendation = analysis.map_or("N/A", |a| a.recommendation.as_str());
        let confidence = analysis.map_or(0.0, |a| a.confidence);
        let sentiment = analysis.map_or("N/A", |a| a.sentiment.as_str());
        let reports = analysis.and_then(|a| a.reports.as_ref());
        let pdf = reports.map_or("Not available", |r| r.pdf_path.as_str());
        let json_path = reports.map_or("Not available", |r| r.json_path.as_str());

        let suggestions = self
            .context
            .follow_up_questions
            .iter()
            .take(self.config.follow_up_display_limit)
            .map(|q| format!("\u{2022} {q}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "I've completed the analysis for {symbol}.\n\
             \n\
             **Key Findings:**\n\
             - Recommendation: {recommendation}\n\
             - Confidence Score: {confidence:.2}\n\
             - Overall Sentiment: {sentiment}\n\
             \n\
             **Reports Generated:**\n\
             - PDF Report: {pdf}\n\
             - JSON Report: {json_path}\n\
             \n\
             **You can ask me follow-up questions like:**\n\
             {suggestions}"
        )
    }

    async fn handle_follow_up(&self, message: &str) -> Response {
        if !self.context.analysis_complete {
            return Response::failure(
                "I don't have a previous analysis to refer to. Please ask me to \
                 analyze a stock first.",
                json!({ "type": "follow_up", "error": "No previous analysis" }),
            );
        }

        let symbol = self.context.symbol.as_deref().unwrap_or("N/A");
        let analysis = self.context.last_analysis.as_ref();
        let recommendation = analysis.map_or("N/A", |a| a.recommendation.as_str());
        let summary = analysis.map_or("N/A", |a| a.summary.as_str());
        let risks = analysis.map_or_else(String::new, |a| a.risk_factors.join("; "));

        let prompt = format!(
            "The user is asking a follow-up question about a stock analysis:\n\
             \n\
             Question: \"{message}\"\n\
             \n\
             Previous analysis results:\n\
             - Symbol: {symbol}\n\
             - Recommendation: {recommendation}\n\
             - Summary: {summary}\n\
             - Risk factors: {risks}\n\
             \n\
             Provide a specific, helpful response based on the available analysis \
             data. State any assumptions clearly.\n\
             \n\
             Return JSON: {{\"answer\": \"your answer\", \"confidence\": 0.8}}"
        );

        let answer = self.model_answer(prompt, "follow-up question").await;

        Response::ok(
            answer.clone(),
            json!({
                "type": "follow_up",
                "symbol": symbol,
                "question": message,
                "answer": answer,
            }),
        )
    }

    async fn handle_clarification(&self, message: &str) -> Response {
        if !self.context.analysis_complete {
            return Response::failure(
                "I don't have a previous analysis to clarify. Please ask me to \
                 analyze a stock first.",
                json!({ "type": "clarification", "error": "No previous analysis" }),
            );
        }

        let prompt = format!(
            "The user is asking for clarification about a previous stock analysis:\n\
             \n\
             Question: \"{message}\"\n\
             \n\
             Symbol: {symbol}\n\
             Analysis complete: {complete}\n\
             \n\
             Provide a clear, simple explanation with context where helpful.\n\
             \n\
             Return JSON: {{\"answer\": \"your clarification\"}}",
            symbol = self.context.symbol.as_deref().unwrap_or("N/A"),
            complete = self.context.analysis_complete,
        );

        let answer = self.model_answer(prompt, "clarification").await;

        Response::ok(
            answer.clone(),
            json!({
                "type": "clarification",
                "question": message,
                "answer": answer,
            }),
        )
    }

    /// One model round-trip for question-style handlers
    ///
    /// Call failures become a textual apology; parse failures fall back to
    /// the raw completion, which is still the model's answer.
    async fn model_answer(&self, prompt: String, kind: &str) -> String {
        match self.llm.complete(vec![ChatMessage::user(prompt)]).await {
            Ok(completion) => {
                let parsed: ModelAnswer = parse_or(
                    &completion,
                    ModelAnswer {
                        answer: completion.clone(),
                    },
                );
                parsed.answer
            }
            Err(err) => {
                format!("I apologize, but I couldn't generate a response to your {kind}: {err}")
            }
        }
    }

    async fn handle_comparison(&self, message: &str) -> Response {
        // Symbols come from the raw message so lowercase prose never matches
        let mut symbols = extract_symbols(message);
        symbols.truncate(self.config.max_comparison_symbols);

        if symbols.len() < 2 {
            return Response::failure(
                "I need at least 2 stock symbols to compare. Please provide symbols \
                 like 'Compare AAPL and MSFT'",
                json!({ "type": "comparison", "error": "Insufficient symbols" }),
            );
        }

        // Independent per-symbol fetches; join_all preserves input order
        let fetches = symbols
            .iter()
            .map(|s| self.price.fetch(s, &self.config.default_period));
        let outcomes = join_all(fetches).await;

        let rows: Vec<ComparisonRow> = symbols
            .iter()
            .zip(outcomes)
            .map(|(symbol, outcome)| match outcome.data() {
                Some(data) => ComparisonRow {
                    symbol: symbol.clone(),
                    price: Some(data.current.price),
                    daily_change: Some(data.current.change_percent),
                    period_return: Some(data.performance.period_return),
                    market_cap: data.current.market_cap,
                    pe_ratio: data.current.pe_ratio,
                    error: None,
                },
                None => ComparisonRow {
                    symbol: symbol.clone(),
                    price: None,
                    daily_change: None,
                    period_return: None,
                    market_cap: None,
                    pe_ratio: None,
                    error: outcome.error().map(String::from),
                },
            })
            .collect();

        let table = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());
        let prompt = format!(
            "Generate a comparison summary for these stocks: {symbols}\n\
             \n\
             Comparison data: {table}\n\
             \n\
             Provide a concise comparison highlighting key differences and \
             similarities. Focus on performance, valuation, and relative \
             strengths/weaknesses.\n\
             \n\
             Return JSON: {{\"summary\": \"...\", \"key_differences\": [\"...\"], \
             \"recommendation\": \"...\"}}",
            symbols = symbols.join(", "),
        );

        let narrative = match self.llm.complete(vec![ChatMessage::user(prompt)]).await {
            Ok(completion) => parse_or(&completion, ComparisonNarrative::default()),
            Err(err) => {
                return Response::failure(
                    format!("Error generating comparison: {err}"),
                    json!({ "type": "comparison", "error": err.to_string() }),
                );
            }
        };

        let message_text = format_comparison_message(&symbols, &rows, &narrative);

        Response::ok(
            message_text,
            json!({
                "type": "comparison",
                "symbols": symbols,
                "comparison_data": rows,
            }),
        )
    }

    async fn handle_general_question(&self, message: &str) -> Response {
        let prompt = format!(
            "The user is asking a general question about investing or the stock \
             market:\n\
             \n\
             Question: \"{message}\"\n\
             \n\
             Provide a helpful, educational response about investing principles, \
             market concepts, or general financial topics. Be balanced and \
             concise; this is not financial advice.\n\
             \n\
             Return JSON: {{\"answer\": \"...\", \"topics_covered\": [\"...\"], \
             \"disclaimer_needed\": true}}"
        );

        let completion = match self.llm.complete(vec![ChatMessage::user(prompt)]).await {
            Ok(completion) => completion,
            Err(err) => {
                return Response::failure(
                    format!("Error handling general question: {err}"),
                    json!({ "type": "general_question", "error": err.to_string() }),
                );
            }
        };

        let parsed: GeneralAnswer = parse_or(
            &completion,
            GeneralAnswer {
                answer: completion.clone(),
                topics_covered: Vec::new(),
                disclaimer_needed: true,
            },
        );

        let mut answer = parsed.answer;
        if parsed.disclaimer_needed {
            answer.push_str(DISCLAIMER);
        }

        Response::ok(
            answer,
            json!({
                "type": "general_question",
                "question": message,
                "topics_covered": parsed.topics_covered,
            }),
        )
    }

    fn handle_unknown(message: &str) -> Response {
        Response::failure(
            HELP_MESSAGE,
            json!({ "type": "unknown", "message": message }),
        )
    }
}

fn format_comparison_message(
    symbols: &[String],
    rows: &[ComparisonRow],
    narrative: &ComparisonNarrative,
) -> String {
    let differences = narrative
        .key_differences
        .iter()
        .map(|d| format!("\u{2022} {d}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut text = format!(
        "**Stock Comparison: {}**\n\n{}\n\n**Key Differences:**\n{}\n\n**Data Comparison:**",
        symbols.join(", "),
        narrative.summary,
        differences,
    );

    for row in rows {
        if row.error.is_some() {
            continue;
        }
        text.push_str(&format!(
            "\n**{}:** ${:.2} ({:+.2}%) | Return: {:.2}% | P/E: {}",
            row.symbol,
            row.price.unwrap_or(0.0),
            row.daily_change.unwrap_or(0.0),
            row.period_return.unwrap_or(0.0),
            row.pe_ratio
                .map_or_else(|| "N/A".to_string(), |pe| format!("{pe:.2}")),
        ));
    }

    text.push_str(&format!("\n\n{}", narrative.recommendation));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use advisor_core::{
        FetchOutcome, FundamentalsAgent, FundamentalsData, NewsAgent, NewsData, Performance,
        PriceData, Quote, ReportError, ReportPaths, ReportPayload, ReportSink,
    };
    use advisor_llm::{LlmError, Result as LlmResult};

    /// Model double that plays back a script of replies in order
    struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<&'static str, &'static str>>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<&'static str, &'static str>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedLlm {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> LlmResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err("script exhausted"));
            match next {
                Ok(text) => Ok(text.to_string()),
                Err(err) => Err(LlmError::Transport(err.to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct CountingPrice {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl PriceAgent for CountingPrice {
        async fn fetch(&self, symbol: &str, period: &str) -> FetchOutcome<PriceData> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            FetchOutcome::Data(PriceData {
                symbol: symbol.to_string(),
                period: period.to_string(),
                current: Quote {
                    price: 120.0,
                    previous_close: 118.0,
                    change: 2.0,
                    change_percent: 1.69,
                    volume: 10_000_000,
                    high: 121.0,
                    low: 117.5,
                    open: 118.5,
                    market_cap: Some(1.5e12),
                    pe_ratio: Some(24.0),
                },
                performance: Performance {
                    period_return: 15.0,
                    volatility: Some(20.0),
                },
                company: None,
            })
        }
    }

    struct OkNews;

    #[async_trait]
    impl NewsAgent for OkNews {
        async fn fetch(&self, symbol: &str, days: u32) -> FetchOutcome<NewsData> {
            FetchOutcome::Data(NewsData {
                symbol: symbol.to_string(),
                period_days: days,
                overall_sentiment: "neutral".to_string(),
                average_score: 0.1,
                articles_count: 3,
                summary: "Mixed coverage".to_string(),
            })
        }
    }

    struct OkFundamentals;

    #[async_trait]
    impl FundamentalsAgent for OkFundamentals {
        async fn fetch(&self, symbol: &str) -> FetchOutcome<FundamentalsData> {
            FetchOutcome::Data(FundamentalsData {
                symbol: symbol.to_string(),
                market_cap: Some(1.5e12),
                trailing_pe: Some(24.0),
                profit_margins: Some(0.2),
                revenue_growth: Some(0.05),
                debt_to_equity: Some(0.9),
                financial_health: Some("stable".to_string()),
            })
        }
    }

    struct OkReports;

    #[async_trait]
    impl ReportSink for OkReports {
        async fn generate(&self, payload: &ReportPayload) -> Result<ReportPaths, ReportError> {
            Ok(ReportPaths {
                pdf_path: format!("/tmp/{}.pdf", payload.symbol),
                json_path: format!("/tmp/{}.json", payload.symbol),
            })
        }
    }

    struct Harness {
        manager: ConversationManager,
        llm: Arc<ScriptedLlm>,
        price: Arc<CountingPrice>,
    }

    fn harness(replies: Vec<Result<&'static str, &'static str>>) -> Harness {
        let llm = ScriptedLlm::new(replies);
        let price = Arc::new(CountingPrice {
            fetches: AtomicUsize::new(0),
        });
        let config = Arc::new(AdvisorConfig::default());

        let engine = WorkflowEngine::new(
            llm.clone(),
            price.clone(),
            Arc::new(OkNews),
            Arc::new(OkFundamentals),
            Arc::new(OkReports),
            config.clone(),
        );

        let manager = ConversationManager::new(llm.clone(), engine, price.clone(), config);

        Harness {
            manager,
            llm,
            price,
        }
    }

    const CLASSIFY_NEW_ANALYSIS: &str = r#"{"type": "new_analysis", "confidence": 0.9}"#;
    const CLASSIFY_FOLLOW_UP: &str = r#"{"type": "follow_up", "confidence": 0.85}"#;
    const CLASSIFY_COMPARISON: &str = r#"{"type": "comparison", "confidence": 0.9}"#;
    const CLASSIFY_GENERAL: &str = r#"{"type": "general_question", "confidence": 0.8}"#;

    #[tokio::test]
    async fn test_new_analysis_happy_path() {
        let mut h = harness(vec![
            Ok(CLASSIFY_NEW_ANALYSIS),
            Ok("Fundamentals look strong, I would buy."),
        ]);

        let response = h.manager.process_message("Analyze MSFT over 1y").await;

        assert!(response.success);
        assert!(response.message.contains("**Key Findings:**"));
        assert!(response.message.contains("Recommendation: Buy"));
        assert!(response.message.contains("/tmp/MSFT.pdf"));
        assert_eq!(response.data["type"], "new_analysis");
        assert_eq!(response.data["symbol"], "MSFT");

        let summary = h.manager.conversation_summary();
        assert_eq!(summary.current_symbol.as_deref(), Some("MSFT"));
        assert!(summary.analysis_complete);
        assert_eq!(summary.follow_up_questions.len(), FOLLOW_UP_QUESTIONS.len());
        // User turn plus assistant turn
        assert_eq!(summary.total_messages, 2);
    }

    #[tokio::test]
    async fn test_comparison_preserves_symbol_order() {
        let narrative = r#"{"summary": "AAPL leads on margins.",
            "key_differences": ["valuation"], "recommendation": "Prefer AAPL."}"#;
        let mut h = harness(vec![Ok(CLASSIFY_COMPARISON), Ok(narrative)]);

        let response = h.manager.process_message("Compare AAPL and MSFT").await;

        assert!(response.success);
        assert_eq!(response.data["type"], "comparison");
        assert_eq!(response.data["symbols"][0], "AAPL");
        assert_eq!(response.data["symbols"][1], "MSFT");
        assert_eq!(response.data["comparison_data"][0]["symbol"], "AAPL");
        assert_eq!(response.data["comparison_data"][1]["symbol"], "MSFT");
        assert!(response.message.contains("**Stock Comparison: AAPL, MSFT**"));
        assert_eq!(h.price.fetches.load(Ordering::SeqCst), 2);
    }

    mockall::mock! {
        FlakyPrice {}

        #[async_trait]
        impl PriceAgent for FlakyPrice {
            async fn fetch(&self, symbol: &str, period: &str) -> FetchOutcome<PriceData>;
        }
    }

    fn sample_price(symbol: &str, period: &str) -> PriceData {
        PriceData {
            symbol: symbol.to_string(),
            period: period.to_string(),
            current: Quote {
                price: 80.0,
                previous_close: 79.0,
                change: 1.0,
                change_percent: 1.27,
                volume: 5_000_000,
                high: 80.5,
                low: 78.9,
                open: 79.2,
                market_cap: Some(8.0e11),
                pe_ratio: Some(19.0),
            },
            performance: Performance {
                period_return: 9.5,
                volatility: None,
            },
            company: None,
        }
    }

    #[tokio::test]
    async fn test_comparison_keeps_failed_symbol_as_error_row() {
        let llm = ScriptedLlm::new(vec![
            Ok(CLASSIFY_COMPARISON),
            Ok(r#"{"summary": "Partial data.", "key_differences": [], "recommendation": "n/a"}"#),
        ]);

        let mut flaky = MockFlakyPrice::new();
        flaky.expect_fetch().returning(|symbol, period| {
            if symbol == "MSFT" {
                FetchOutcome::failed("provider timeout")
            } else {
                FetchOutcome::Data(sample_price(symbol, period))
            }
        });
        let price = Arc::new(flaky);
        let config = Arc::new(AdvisorConfig::default());

        let engine = WorkflowEngine::new(
            llm.clone(),
            price.clone(),
            Arc::new(OkNews),
            Arc::new(OkFundamentals),
            Arc::new(OkReports),
            config.clone(),
        );
        let mut manager = ConversationManager::new(llm, engine, price, config);

        let response = manager.process_message("Compare AAPL and MSFT").await;

        // Batch succeeds; the failed symbol becomes an error row
        assert!(response.success);
        assert_eq!(response.data["comparison_data"][0]["symbol"], "AAPL");
        assert_eq!(response.data["comparison_data"][1]["error"], "provider timeout");
        assert!(response.message.contains("**AAPL:**"));
        assert!(!response.message.contains("**MSFT:**"));
    }

    #[tokio::test]
    async fn test_comparison_with_one_symbol_fails_without_fetches() {
        let mut h = harness(vec![Ok(CLASSIFY_COMPARISON)]);

        let response = h.manager.process_message("Compare AAPL").await;

        assert!(!response.success);
        assert_eq!(response.data["error"], "Insufficient symbols");
        assert_eq!(h.price.fetches.load(Ordering::SeqCst), 0);
        // Classification was the only model call
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_without_analysis_is_guarded() {
        let mut h = harness(vec![Ok(CLASSIFY_FOLLOW_UP)]);

        let response = h.manager.process_message("What about the risks?").await;

        assert!(!response.success);
        assert!(response.message.contains("previous analysis"));
        assert_eq!(response.data["error"], "No previous analysis");
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_after_analysis_answers_from_context() {
        let mut h = harness(vec![
            Ok(CLASSIFY_NEW_ANALYSIS),
            Ok("Looks solid, buy."),
            Ok(CLASSIFY_FOLLOW_UP),
            Ok(r#"{"answer": "The main risk is valuation.", "confidence": 0.8}"#),
        ]);

        h.manager.process_message("Analyze AAPL").await;
        let response = h.manager.process_message("What are the risks?").await;

        assert!(response.success);
        assert_eq!(response.message, "The main risk is valuation.");
        assert_eq!(response.data["type"], "follow_up");
        assert_eq!(response.data["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_follow_up_with_unparseable_reply_uses_raw_text() {
        let mut h = harness(vec![
            Ok(CLASSIFY_NEW_ANALYSIS),
            Ok("buy"),
            Ok(CLASSIFY_FOLLOW_UP),
            Ok("Plainly, the risk is concentration."),
        ]);

        h.manager.process_message("Analyze AAPL").await;
        let response = h.manager.process_message("Biggest risk?").await;

        assert!(response.success);
        assert_eq!(response.message, "Plainly, the risk is concentration.");
    }

    #[tokio::test]
    async fn test_general_question_appends_disclaimer() {
        let reply = r#"{"answer": "Diversification spreads risk across assets.",
            "topics_covered": ["diversification"], "disclaimer_needed": true}"#;
        let mut h = harness(vec![Ok(CLASSIFY_GENERAL), Ok(reply)]);

        let response = h.manager.process_message("What is diversification?").await;

        assert!(response.success);
        assert!(
            response
                .message
                .starts_with("Diversification spreads risk across assets.")
        );
        assert!(response.message.contains("educational purposes only"));
        assert_eq!(response.data["type"], "general_question");
    }

    #[tokio::test]
    async fn test_unknown_intent_returns_help_without_extra_calls() {
        // Unparseable classification degrades to the unknown path
        let mut h = harness(vec![Ok("no idea what this is")]);

        let response = h.manager.process_message("flarp the wibble").await;

        assert!(!response.success);
        assert!(response.message.contains("Analyze AAPL"));
        assert_eq!(response.data["type"], "unknown");
        assert_eq!(h.llm.call_count(), 1);
        assert_eq!(h.price.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reset_clears_history_and_context() {
        let mut h = harness(vec![Ok(CLASSIFY_NEW_ANALYSIS), Ok("buy")]);

        h.manager.process_message("Analyze AAPL").await;
        assert!(h.manager.conversation_summary().analysis_complete);

        let response = h.manager.reset_conversation();
        assert!(response.success);
        assert_eq!(response.data["action"], "reset_conversation");

        let summary = h.manager.conversation_summary();
        assert_eq!(summary.total_messages, 0);
        assert!(summary.current_symbol.is_none());
        assert!(!summary.analysis_complete);
        assert!(summary.follow_up_questions.is_empty());
        assert!(summary.conversation_start.is_none());
    }

    #[tokio::test]
    async fn test_history_records_both_sides_of_each_turn() {
        let mut h = harness(vec![Ok(CLASSIFY_GENERAL), Ok(r#"{"answer": "ok"}"#)]);

        h.manager.process_message("What is a P/E ratio?").await;

        let history = h.manager.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "What is a P/E ratio?");
        assert!(history[0].data.is_none());
        assert!(history[1].data.is_some());
    }
}
