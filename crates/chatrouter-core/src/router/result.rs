use crate::health::CallOutcome;
use crate::hints::{RouteMode, RouteOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One provider `process` call made while routing a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub provider: String,
    pub outcome: CallOutcome,
    pub elapsed_ms: u64,
}

/// Bookkeeping attached to every routed answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteMetadata {
    pub mode: RouteMode,
    pub timeout_ms: u64,
    /// Candidates looked at, including those whose `can_handle` said no.
    pub candidates_checked: usize,
    pub candidates_total: usize,
    pub attempted: Vec<Attempt>,
    /// Candidates whose `can_handle` returned false.
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Provider-supplied metadata of the winning reply.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub provider_metadata: Value,
}

impl RouteMetadata {
    pub fn new(options: &RouteOptions, timeout_ms: u64) -> Self {
        Self {
            mode: options.mode(),
            timeout_ms,
            user_id: options.user_id.clone(),
            session_id: options.session_id.clone(),
            ..Default::default()
        }
    }
}

/// The envelope returned to the caller of `Router::route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterResult {
    /// True for every answer, including fallbacks.
    pub success: bool,
    pub response: String,
    pub provider_name: Option<String>,
    /// Always within `[0,1]`.
    pub confidence: f64,
    pub processing_time_ms: u64,
    pub method: String,
    pub routed_by: String,
    pub metadata: RouteMetadata,
}

impl RouterResult {
    pub fn is_fallback(&self) -> bool {
        self.routed_by == crate::constants::routing::ROUTED_BY_FALLBACK
    }
}
