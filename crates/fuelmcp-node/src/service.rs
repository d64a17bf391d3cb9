//! Node service wrapper with observability and cancellation.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::node::TRACING_TARGET;
use crate::{
    Error, InvocationRequest, InvocationResult, InvocationState, Node, NodeDeclaration, Result,
    ServiceHealth,
};

/// Node service wrapper with observability.
///
/// This wrapper adds structured logging of the invocation lifecycle to any
/// node implementation and wires execution to the host's cancellation
/// signal. The inner node is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct NodeService {
    inner: Arc<dyn Node>,
}

impl fmt::Debug for NodeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeService")
            .field("node", &self.inner.declaration().name)
            .finish_non_exhaustive()
    }
}

impl NodeService {
    /// Create a new node service wrapper.
    pub fn new<N>(node: N) -> Self
    where
        N: Node + 'static,
    {
        Self {
            inner: Arc::new(node),
        }
    }

    /// Returns the wrapped node's declaration.
    pub fn declaration(&self) -> &NodeDeclaration {
        self.inner.declaration()
    }

    /// Executes one invocation.
    pub async fn execute(&self, invocation: &InvocationRequest) -> Result<InvocationResult> {
        self.execute_with_cancellation(invocation, CancellationToken::new())
            .await
    }

    /// Executes one invocation, abandoning it when `cancel` fires.
    ///
    /// On cancellation the in-flight request is dropped, which aborts the
    /// underlying HTTP exchange, and the call fails with [`Error::Cancelled`].
    pub async fn execute_with_cancellation(
        &self,
        invocation: &InvocationRequest,
        cancel: CancellationToken,
    ) -> Result<InvocationResult> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET,
            invocation_id = %invocation.invocation_id,
            node = %self.declaration().name,
            state = %InvocationState::Pending,
            "Executing node"
        );

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.inner.execute(invocation) => result,
        };
        let elapsed = started_at.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    invocation_id = %invocation.invocation_id,
                    state = %InvocationState::Succeeded,
                    elapsed_ms = elapsed.as_millis(),
                    "Node execution succeeded"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    invocation_id = %invocation.invocation_id,
                    state = %InvocationState::Failed,
                    kind = %error.kind(),
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Node execution failed"
                );
            }
        }

        result
    }

    /// Performs a health check on the wrapped node's backing service.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}
