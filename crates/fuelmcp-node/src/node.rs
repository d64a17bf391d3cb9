//! The Fuel MCP correction node.

use std::sync::LazyLock;

use semver::Version;
use url::Url;

use crate::client::CorrectionClient;
use crate::resolve::{API_URL_INPUT, QUERY_INPUT, resolve};
use crate::{
    FieldType, InputField, InvocationRequest, InvocationResult, Node, NodeDeclaration,
    OutputField, Result, ServiceHealth,
};

/// Tracing target for node execution.
pub const TRACING_TARGET: &str = "fuelmcp_node::node";

/// Endpoint used when the host supplies no `api_url`.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/query";

/// Name of the single output port.
pub const RESULT_OUTPUT: &str = "result";

static DECLARATION: LazyLock<NodeDeclaration> = LazyLock::new(|| {
    NodeDeclaration::new("Fuel MCP", "FuelMCPNode", Version::new(1, 0, 0))
        .with_category("Maritime Engineering")
        .with_description(
            "Performs marine fuel corrections (ISO 91-1 / ASTM D1250) using local MCP API.",
        )
        .with_icon("⚓")
        .with_author("Chief Engineer Volodymyr Zub")
        .with_input(
            InputField::new("Query", QUERY_INPUT, FieldType::String)
                .with_placeholder("e.g. calculate VCF for diesel at 25°C"),
        )
        .with_input(
            InputField::new("API URL", API_URL_INPUT, FieldType::String)
                .with_default(DEFAULT_API_URL)
                .optional(),
        )
        .with_output(OutputField::new("Result", RESULT_OUTPUT, FieldType::Json))
});

/// Returns the declaration of the correction node.
///
/// Built once per process on first access and shared read-only afterwards.
pub fn node_declaration() -> &'static NodeDeclaration {
    &DECLARATION
}

/// Workflow node that forwards natural-language correction queries to the
/// Fuel MCP service and passes its JSON reply through unmodified.
///
/// Holds no per-invocation state: concurrent executions only share the
/// immutable declaration and the client's connection pool.
#[derive(Debug, Clone, Default)]
pub struct CorrectionNode {
    client: CorrectionClient,
}

impl CorrectionNode {
    /// Creates a node with the default client configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node backed by the given client.
    pub fn with_client(client: CorrectionClient) -> Self {
        Self { client }
    }

    /// Gets the underlying client.
    pub fn client(&self) -> &CorrectionClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl Node for CorrectionNode {
    fn declaration(&self) -> &NodeDeclaration {
        node_declaration()
    }

    async fn execute(&self, invocation: &InvocationRequest) -> Result<InvocationResult> {
        let resolved = resolve(self.declaration(), invocation)?;

        tracing::debug!(
            target: TRACING_TARGET,
            invocation_id = %invocation.invocation_id,
            api_url = %resolved.api_url,
            query_len = resolved.query.len(),
            "Resolved correction query"
        );

        let result = self.client.query(&resolved).await?;
        Ok(InvocationResult::new(result))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        let api_url = Url::parse(DEFAULT_API_URL)
            .map_err(|e| crate::Error::validation(format!("invalid default api_url: {e}")))?;
        Ok(self.client.status(&api_url).await)
    }
}
