//! Shared utilities for the stock advisor workspace

pub mod logging;

pub use logging::init_tracing;
