//! Configuration for the advisor core
//!
//! One `AdvisorConfig` is constructed at process start and passed by `Arc`
//! into the workflow engine and conversation manager. Core logic never reads
//! ambient globals or environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

/// Configuration for the advisor core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Symbol used when query parsing finds no ticker
    pub default_symbol: String,

    /// Time period used when the query names none (e.g. "1y")
    pub default_period: String,

    /// News lookback in days used when the query names none
    pub default_news_days: u32,

    /// Maximum number of symbols accepted by a comparison request
    pub max_comparison_symbols: usize,

    /// Number of suggested follow-up questions shown after an analysis
    pub follow_up_display_limit: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            default_symbol: "AAPL".to_string(),
            default_period: "1y".to_string(),
            default_news_days: 7,
            max_comparison_symbols: 5,
            follow_up_display_limit: 5,
        }
    }
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_symbol.is_empty()
            || !self.default_symbol.chars().all(|c| c.is_ascii_uppercase())
            || self.default_symbol.len() > 5
        {
            return Err(ConfigError(format!(
                "default_symbol must be 1-5 uppercase letters, got {:?}",
                self.default_symbol
            )));
        }

        if self.default_news_days == 0 {
            return Err(ConfigError(
                "default_news_days must be greater than 0".to_string(),
            ));
        }

        if self.max_comparison_symbols < 2 {
            return Err(ConfigError(
                "max_comparison_symbols must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`AdvisorConfig`]
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    default_symbol: Option<String>,
    default_period: Option<String>,
    default_news_days: Option<u32>,
    max_comparison_symbols: Option<usize>,
    follow_up_display_limit: Option<usize>,
}

impl AdvisorConfigBuilder {
    /// Set the default symbol
    pub fn default_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.default_symbol = Some(symbol.into());
        self
    }

    /// Set the default time period
    pub fn default_period(mut self, period: impl Into<String>) -> Self {
        self.default_period = Some(period.into());
        self
    }

    /// Set the default news lookback in days
    pub fn default_news_days(mut self, days: u32) -> Self {
        self.default_news_days = Some(days);
        self
    }

    /// Set the comparison symbol cap
    pub fn max_comparison_symbols(mut self, max: usize) -> Self {
        self.max_comparison_symbols = Some(max);
        self
    }

    /// Set how many follow-up suggestions are displayed
    pub fn follow_up_display_limit(mut self, limit: usize) -> Self {
        self.follow_up_display_limit = Some(limit);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig, ConfigError> {
        let defaults = AdvisorConfig::default();

        let config = AdvisorConfig {
            default_symbol: self.default_symbol.unwrap_or(defaults.default_symbol),
            default_period: self.default_period.unwrap_or(defaults.default_period),
            default_news_days: self.default_news_days.unwrap_or(defaults.default_news_days),
            max_comparison_symbols: self
                .max_comparison_symbols
                .unwrap_or(defaults.max_comparison_symbols),
            follow_up_display_limit: self
                .follow_up_display_limit
                .unwrap_or(defaults.follow_up_display_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
