//! Error handling for the XIRR report tool
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for the return engine and its adapters
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid cash-flow set: {0}")]
    InvalidCashFlowSet(String),

    #[error("xirr did not converge after {0} iterations")]
    NoConvergence(usize),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("adapter error: {0}")]
    AdapterError(String),
}

/// Result type alias for report operations
pub type Result<T> = anyhow::Result<T>;
