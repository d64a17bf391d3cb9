#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod declaration;
mod error;
mod health;
mod invocation;
mod node;
mod resolve;
mod service;

pub mod client;

pub use declaration::{FieldType, InputField, NodeDeclaration, OutputField};
pub use error::{Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use invocation::{InvocationRequest, InvocationResult, InvocationState};
pub use node::{CorrectionNode, DEFAULT_API_URL, RESULT_OUTPUT, TRACING_TARGET, node_declaration};
pub use resolve::{API_URL_INPUT, QUERY_INPUT, ResolvedQuery, TEXT_PARAM, resolve};
pub use service::NodeService;

/// Host plugin contract of a workflow node.
///
/// Implement this trait to expose a capability as a node: the host reads the
/// declaration to render and wire it, then calls [`Node::execute`] once per
/// invocation.
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    /// Returns the static declaration of this node.
    fn declaration(&self) -> &NodeDeclaration;

    /// Executes one invocation of the node.
    async fn execute(&self, invocation: &InvocationRequest) -> Result<InvocationResult>;

    /// Performs a health check on the service backing this node.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
