//! Query parsing: ticker, time period, and news lookback extraction
//!
//! Extraction never fails; anything the query does not name falls back to the
//! configured default. The ticker pattern is a run of 1-5 uppercase letters,
//! applied to the uppercased text for single-symbol extraction and to the raw
//! text for multi-symbol extraction (so prose words like "and" do not turn
//! into tickers).

use std::sync::LazyLock;

use regex::Regex;

use advisor_core::AdvisorConfig;

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("symbol pattern is valid"));

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+[ymwd])\b").expect("period pattern is valid"));

static NEWS_DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\s*(?:days?|news)\b").expect("news pattern is valid"));

/// Parameters extracted from a user query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Ticker symbol, defaulted when the query names none
    pub symbol: String,
    /// Time period token (e.g. "1y")
    pub period: String,
    /// News lookback in days
    pub news_days: u32,
}

/// Extract the first ticker-shaped token from the uppercased query
pub fn extract_symbol(query: &str) -> Option<String> {
    let upper = query.to_uppercase();
    SYMBOL_RE.find(&upper).map(|m| m.as_str().to_string())
}

/// Extract every ticker-shaped token from the raw (case-preserved) query
///
/// Used by comparison requests, where lowercase prose must not match.
pub fn extract_symbols(query: &str) -> Vec<String> {
    SYMBOL_RE
        .find_iter(query)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parse a query into symbol, period, and news lookback
pub fn parse_query(query: &str, config: &AdvisorConfig) -> ParsedQuery {
    let lower = query.to_lowercase();

    let symbol = extract_symbol(query).unwrap_or_else(|| config.default_symbol.clone());

    let period = PERIOD_RE
        .captures(&lower)
        .map_or_else(|| config.default_period.clone(), |c| c[1].to_string());

    let news_days = NEWS_DAYS_RE
        .captures(&lower)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(config.default_news_days);

    ParsedQuery {
        symbol,
        period,
        news_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AdvisorConfig {
        AdvisorConfig::default()
    }

    #[test]
    fn test_symbol_extraction() {
        let parsed = parse_query("Analyze MSFT over 1y", &config());
        assert_eq!(parsed.symbol, "MSFT");
        assert_eq!(parsed.period, "1y");
    }

    #[test]
    fn test_no_ticker_falls_back_to_default() {
        let parsed = parse_query("analyze something", &config());
        assert_eq!(parsed.symbol, "AAPL");
        assert_eq!(parsed.period, "1y");
        assert_eq!(parsed.news_days, 7);
    }

    #[test]
    fn test_period_extraction() {
        assert_eq!(parse_query("TSLA over 6m", &config()).period, "6m");
        assert_eq!(parse_query("TSLA over 2w please", &config()).period, "2w");
        assert_eq!(parse_query("TSLA over 30d", &config()).period, "30d");
    }

    #[test]
    fn test_news_days_extraction() {
        assert_eq!(parse_query("AAPL with 14 days of news", &config()).news_days, 14);
        assert_eq!(parse_query("AAPL 3 day lookback", &config()).news_days, 3);
        assert_eq!(parse_query("AAPL news sentiment", &config()).news_days, 7);
    }

    #[test]
    fn test_multi_symbol_extraction_skips_lowercase_prose() {
        let symbols = extract_symbols("compare AAPL and MSFT");
        assert_eq!(symbols, vec!["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[test]
    fn test_multi_symbol_extraction_preserves_order() {
        let symbols = extract_symbols("NVDA vs AMD vs INTC");
        assert_eq!(symbols, vec!["NVDA", "AMD", "INTC"]);
    }

    #[test]
    fn test_single_symbol_uppercases_input() {
        // Uppercasing makes short words ticker-shaped; first match wins.
        assert_eq!(extract_symbol("what about nvda"), Some("WHAT".to_string()));
        assert_eq!(extract_symbol("NVDA outlook"), Some("NVDA".to_string()));
    }
}
