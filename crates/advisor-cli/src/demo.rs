//! Offline demo collaborators
//!
//! Deterministic stand-ins for the language model, the data providers, and
//! the report sink, so the full conversation loop can be exercised without
//! network access or API keys. Synthetic figures are derived from the symbol
//! text, so different tickers produce different (but stable) numbers.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use advisor_core::{
    CompanyInfo, FetchOutcome, FundamentalsAgent, FundamentalsData, NewsAgent, NewsData,
    Performance, PriceAgent, PriceData, Quote, ReportError, ReportPaths, ReportPayload, ReportSink,
};
use advisor_llm::{ChatMessage, LanguageModel, LlmError, Result as LlmResult};

/// Stable per-symbol seed in [0, 1)
fn seed(symbol: &str) -> f64 {
    let sum: u32 = symbol.bytes().map(u32::from).sum();
    f64::from(sum % 97) / 97.0
}

/// Scripted language model driven by prompt keywords
///
/// Recognizes the prompts the advisor actually sends and answers each with a
/// plausible canned completion.
pub struct DemoLanguageModel;

#[async_trait]
impl LanguageModel for DemoLanguageModel {
    async fn complete(&self, messages: Vec<ChatMessage>) -> LlmResult<String> {
        let prompt = messages
            .last()
            .map(|m| m.content.as_str())
            .ok_or_else(|| LlmError::UnexpectedResponse("empty prompt".to_string()))?;

        if prompt.contains("determine their intent") {
            return Ok(classify(prompt));
        }
        if prompt.contains("comprehensive analysis") {
            return Ok(
                "Performance is solid with constructive momentum, sentiment is \
                 supportive, and the balance sheet looks healthy. On balance I \
                 would buy at current levels, sized for the volatility."
                    .to_string(),
            );
        }
        if prompt.contains("comparison summary") {
            return Ok(r#"{"summary": "Both names show positive period returns with different valuation profiles.", "key_differences": ["Valuation multiples diverge noticeably", "Return profiles differ over the period"], "recommendation": "Favor the cheaper multiple unless growth justifies the premium."}"#.to_string());
        }
        if prompt.contains("general question about investing") {
            return Ok(r#"{"answer": "Spreading capital across uncorrelated assets reduces the impact any single position can have on the portfolio.", "topics_covered": ["risk management"], "disclaimer_needed": true}"#.to_string());
        }
        // Follow-up and clarification prompts both ask for an answer object
        Ok(r#"{"answer": "Based on the prior analysis, the dominant considerations are valuation risk and sector concentration; the recommendation stands otherwise.", "confidence": 0.7}"#.to_string())
    }

    fn name(&self) -> &str {
        "demo"
    }
}

/// Keyword classification over the user message embedded in the prompt
fn classify(prompt: &str) -> String {
    let message = prompt
        .lines()
        .find_map(|l| l.trim().strip_prefix("User message: "))
        .unwrap_or("")
        .to_lowercase();

    let intent = if message.contains("compare") || message.contains(" vs ") {
        "comparison"
    } else if message.contains("analyze") || message.contains("analysis") {
        "new_analysis"
    } else if message.contains("clarify") || message.contains("what do you mean") {
        "clarification"
    } else if message.contains("risk")
        || message.contains("why")
        || message.contains("should i")
    {
        "follow_up"
    } else if message.contains('?') {
        "general_question"
    } else {
        "unknown"
    };

    format!(r#"{{"type": "{intent}", "confidence": 0.9}}"#)
}

/// Synthetic quote/performance data
pub struct DemoPriceAgent;

#[async_trait]
impl PriceAgent for DemoPriceAgent {
    async fn fetch(&self, symbol: &str, period: &str) -> FetchOutcome<PriceData> {
        let s = seed(symbol);
        let price = 40.0 + s * 400.0;
        let change_percent = (s - 0.5) * 4.0;
        let change = price * change_percent / 100.0;

        FetchOutcome::Data(PriceData {
            symbol: symbol.to_string(),
            period: period.to_string(),
            current: Quote {
                price,
                previous_close: price - change,
                change,
                change_percent,
                volume: 1_000_000 + (s * 60_000_000.0) as u64,
                high: price * 1.01,
                low: price * 0.98,
                open: price - change * 0.5,
                market_cap: Some(price * 5.0e9),
                pe_ratio: Some(12.0 + s * 30.0),
            },
            performance: Performance {
                period_return: (s - 0.3) * 60.0,
                volatility: Some(12.0 + s * 25.0),
            },
            company: Some(CompanyInfo {
                name: format!("{symbol} Inc."),
                sector: Some("Technology".to_string()),
                industry: None,
            }),
        })
    }
}

/// Synthetic news sentiment
pub struct DemoNewsAgent;

#[async_trait]
impl NewsAgent for DemoNewsAgent {
    async fn fetch(&self, symbol: &str, days: u32) -> FetchOutcome<NewsData> {
        let s = seed(symbol);
        let score = (s - 0.4) * 1.2;
        let sentiment = if score > 0.15 {
            "positive"
        } else if score < -0.15 {
            "negative"
        } else {
            "neutral"
        };

        FetchOutcome::Data(NewsData {
            symbol: symbol.to_string(),
            period_days: days,
            overall_sentiment: sentiment.to_string(),
            average_score: score,
            articles_count: 4 + (s * 20.0) as u32,
            summary: format!("Recent coverage of {symbol} skews {sentiment}."),
        })
    }
}

/// Synthetic fundamentals
pub struct DemoFundamentalsAgent;

#[async_trait]
impl FundamentalsAgent for DemoFundamentalsAgent {
    async fn fetch(&self, symbol: &str) -> FetchOutcome<FundamentalsData> {
        let s = seed(symbol);

        FetchOutcome::Data(FundamentalsData {
            symbol: symbol.to_string(),
            market_cap: Some((40.0 + s * 400.0) * 5.0e9),
            trailing_pe: Some(12.0 + s * 30.0),
            profit_margins: Some(0.08 + s * 0.3),
            revenue_growth: Some((s - 0.2) * 0.4),
            debt_to_equity: Some(0.4 + s * 2.0),
            financial_health: Some(if s > 0.5 { "strong" } else { "stable" }.to_string()),
        })
    }
}

/// Writes the report payload to disk as JSON plus a Markdown summary
pub struct FileReportSink {
    output_dir: PathBuf,
}

impl FileReportSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn generate(&self, payload: &ReportPayload) -> Result<ReportPaths, ReportError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ReportError(format!("failed to create report directory: {e}")))?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let json_path = self
            .output_dir
            .join(format!("{}_{stamp}.json", payload.symbol));
        let summary_path = self
            .output_dir
            .join(format!("{}_{stamp}.md", payload.symbol));

        let json = serde_json::to_string_pretty(payload)
            .map_err(|e| ReportError(format!("failed to serialize report: {e}")))?;
        std::fs::write(&json_path, json)
            .map_err(|e| ReportError(format!("failed to write JSON report: {e}")))?;

        std::fs::write(&summary_path, render_summary(payload))
            .map_err(|e| ReportError(format!("failed to write summary report: {e}")))?;

        Ok(ReportPaths {
            pdf_path: summary_path.display().to_string(),
            json_path: json_path.display().to_string(),
        })
    }
}

fn render_summary(payload: &ReportPayload) -> String {
    let mut text = format!(
        "# Investment Report: {}\n\nGenerated: {}\n",
        payload.symbol,
        payload.analysis_date.format("%Y-%m-%d %H:%M UTC"),
    );

    if let Some(analysis) = &payload.analysis {
        text.push_str(&format!(
            "\n## Recommendation\n\n{} (confidence {:.2})\n\n## Summary\n\n{}\n",
            analysis.recommendation, analysis.confidence, analysis.summary,
        ));
        if !analysis.risk_factors.is_empty() {
            text.push_str("\n## Risk Factors\n\n");
            for risk in &analysis.risk_factors {
                text.push_str(&format!("- {risk}\n"));
            }
        }
    } else {
        text.push_str("\nNo analysis was produced for this run.\n");
    }

    text
}
