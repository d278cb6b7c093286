//! Core data model for the stock advisor
//!
//! This crate holds everything the orchestration core shares with its
//! collaborators:
//!
//! - [`AdvisorConfig`]: explicit configuration, constructed once and injected
//! - [`FetchOutcome`]: tagged success/failure payload returned by retrieval
//!   agents (agents never error past their own boundary)
//! - Typed payloads and traits for the three retrieval agents
//!   ([`PriceAgent`], [`NewsAgent`], [`FundamentalsAgent`])
//! - [`ReportSink`]: report generation collaborator
//! - [`AnalysisResult`]: the synthesized investment recommendation
//! - [`TraceMessage`]: the per-stage audit trail record
//!
//! The retrieval agents, report generator, and language model client are
//! external collaborators; this crate only defines the narrow interfaces the
//! core calls them through.

pub mod analysis;
pub mod config;
pub mod fundamentals;
pub mod news;
pub mod outcome;
pub mod price;
pub mod report;
pub mod trace;

pub use analysis::AnalysisResult;
pub use config::{AdvisorConfig, AdvisorConfigBuilder, ConfigError};
pub use fundamentals::{FundamentalsAgent, FundamentalsData};
pub use news::{NewsAgent, NewsData};
pub use outcome::FetchOutcome;
pub use price::{CompanyInfo, Performance, PriceAgent, PriceData, Quote};
pub use report::{ReportError, ReportPaths, ReportPayload, ReportSink};
pub use trace::TraceMessage;
