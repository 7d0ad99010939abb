use crate::error::RouterError;
use crate::hints::RouteOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ProviderResult = Result<ProviderReply, RouterError>;

/// What a provider hands back from `process`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderReply {
    pub success: bool,
    pub response: String,
    /// Any scale; the router normalises it to `[0,1]`.
    pub confidence: Option<f64>,
    /// Internal path the provider used, echoed into the result.
    pub method: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl ProviderReply {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
            confidence: None,
            method: None,
            metadata: Value::Null,
        }
    }

    /// A reply that declines to answer; the router moves on.
    pub fn declined() -> Self {
        Self::default()
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Usable answer: flagged successful and carrying non-blank text.
    pub fn is_usable(&self) -> bool {
        self.success && !self.response.trim().is_empty()
    }
}

/// Result of a provider's own self-check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Resident memory the provider reports, if it tracks any.
    pub memory_mb: Option<f64>,
    pub details: Option<String>,
}

impl ProbeReport {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn with_memory_mb(mut self, memory_mb: f64) -> Self {
        self.memory_mb = Some(memory_mb);
        self
    }
}

/// A named, priority-ranked handler able to answer a chat message.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Higher is tried first.
    fn priority(&self) -> i32;

    /// Cheap synchronous capability check. A `false` means `process` is
    /// never called for this message.
    fn can_handle(&self, message: &str, options: &RouteOptions) -> bool;

    async fn process(&self, message: &str, options: &RouteOptions) -> ProviderResult;

    /// Optional self-check used by the health sweep. `None` means the
    /// provider does not expose one.
    async fn health_check(&self) -> Option<Result<ProbeReport, RouterError>> {
        None
    }
}
