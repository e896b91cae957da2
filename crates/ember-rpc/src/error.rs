//! Handler error taxonomy and JSON-RPC error codes.
//!
//! Every handler failure surfaces to the RPC caller as a structured error
//! object (code + message); nothing is swallowed and nothing is retried.
//! At most one attempt per call.

use jsonrpsee::types::ErrorObjectOwned;
use thiserror::Error;

use ember_core::error::EngineError;

/// bitcoind-compatible RPC error codes.
pub mod codes {
    pub const RPC_MISC_ERROR: i32 = -1;
    pub const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;
    pub const RPC_INVALID_PARAMETER: i32 = -8;
    pub const RPC_DATABASE_ERROR: i32 = -20;
}

/// A failure inside an RPC handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The engine could not answer a tip, header, or difficulty query.
    /// Non-retryable within the call; the caller may retry the whole call.
    #[error("chain unavailable: {0}")]
    ChainUnavailable(#[source] EngineError),

    /// A mempool or index query against the engine failed.
    #[error("engine query failed: {0}")]
    EngineQueryFailed(#[source] EngineError),

    /// Caller-supplied parameters out of the allowed range. Rejected
    /// before any engine query.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A caller-supplied address the engine does not recognize.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The RPC server itself could not be started.
    #[error("rpc server: {0}")]
    Server(String),
}

impl HandlerError {
    /// The JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::ChainUnavailable(_) | Self::Server(_) => codes::RPC_MISC_ERROR,
            Self::EngineQueryFailed(_) => codes::RPC_DATABASE_ERROR,
            Self::InvalidParameters(_) => codes::RPC_INVALID_PARAMETER,
            Self::InvalidAddress(_) => codes::RPC_INVALID_ADDRESS_OR_KEY,
        }
    }
}

impl From<HandlerError> for ErrorObjectOwned {
    fn from(err: HandlerError) -> Self {
        ErrorObjectOwned::owned(err.code(), err.to_string(), None::<()>)
    }
}
