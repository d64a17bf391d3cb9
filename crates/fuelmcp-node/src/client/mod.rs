//! Reqwest-based HTTP client for the correction service.
//!
//! # Example
//!
//! ```rust,ignore
//! use fuelmcp_node::client::{ClientConfig, CorrectionClient};
//! use fuelmcp_node::CorrectionNode;
//!
//! let client = CorrectionClient::new(ClientConfig::default().with_timeout(10));
//! let node = CorrectionNode::with_client(client);
//! ```

mod client;
mod config;

pub use client::{CorrectionClient, status_url};
pub use config::{ClientConfig, DEFAULT_TIMEOUT_SECS};

/// Tracing target for correction client operations.
pub const TRACING_TARGET: &str = "fuelmcp_node::client";
