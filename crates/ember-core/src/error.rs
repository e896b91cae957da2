//! Error types for the engine interface and difficulty encoding.
use thiserror::Error;

/// Failure reported by the external chain engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine unavailable: {0}")] Unavailable(String),
    #[error("query failed: {0}")] QueryFailed(String),
    #[error("invalid address: {0}")] InvalidAddress(String),
}

/// Compact difficulty bits that cannot be expanded to a 256-bit target.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactError {
    #[error("compact target has negative sign bit")] Negative,
    #[error("compact target overflows 256-bit range")] Overflow,
}
