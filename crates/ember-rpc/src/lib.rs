//! # ember-rpc — JSON-RPC request handlers for the Ember daemon.
//!
//! The locally-owned slice of the node: parameter extraction from incoming
//! JSON-RPC requests, orchestration of queries against the external chain
//! engine, and response document assembly.
//! - [`template::TemplateBuilder`] — mining block-template assembly
//! - [`mempool_cache::MempoolCache`] — height- and TTL-gated mempool snapshot
//! - [`rpc`] — jsonrpsee handler trait, implementation, and server startup
//! - [`config::RpcConfig`] — handler-layer configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod mempool_cache;
pub mod rpc;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RpcConfig;
pub use rpc::{start_rpc_server, RpcHandlers};
pub use template::TemplateBuilder;
