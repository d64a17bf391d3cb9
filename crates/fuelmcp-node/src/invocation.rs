//! Invocation request and result types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, IntoStaticStr};
use uuid::Uuid;

/// Runtime inputs for one execution of a node.
///
/// Populated by the host from user configuration and upstream node outputs,
/// keyed by [`InputField::name`](crate::InputField::name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Unique identifier for this invocation.
    #[serde(default = "Uuid::now_v7")]
    pub invocation_id: Uuid,
    /// Supplied input values by name.
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Deadline forwarded by the host (uses client default if not set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl InvocationRequest {
    /// Creates a new invocation with no inputs.
    pub fn new() -> Self {
        Self {
            invocation_id: Uuid::now_v7(),
            inputs: Map::new(),
            timeout: None,
        }
    }

    /// Creates an invocation from a map of inputs.
    pub fn from_inputs(inputs: Map<String, Value>) -> Self {
        Self {
            inputs,
            ..Self::new()
        }
    }

    /// Sets an input value.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the raw value supplied for an input.
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }
}

impl Default for InvocationRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// Payload returned by the correction service, unmodified.
    pub result: Value,
}

impl InvocationResult {
    /// Wraps a service payload.
    pub fn new(result: Value) -> Self {
        Self { result }
    }
}

/// Lifecycle state of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvocationState {
    /// Request constructed, awaiting validation.
    Pending,
    /// Request sent, awaiting the HTTP response.
    InFlight,
    /// Result available.
    Succeeded,
    /// Validation or upstream error.
    Failed,
}

impl InvocationState {
    /// Returns whether the state is terminal.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}
