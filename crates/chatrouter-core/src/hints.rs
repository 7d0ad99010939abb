use crate::constants::routing;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Caller-selected routing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    #[default]
    Default,
    /// Favour the curated fast providers.
    Express,
    /// Favour the curated deep-analysis providers.
    Expert,
}

impl RouteMode {
    pub fn name(&self) -> &str {
        match self {
            RouteMode::Default => "default",
            RouteMode::Express => "express",
            RouteMode::Expert => "expert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "default" | "" => Some(RouteMode::Default),
            "express" | "fast" => Some(RouteMode::Express),
            "expert" | "deep" => Some(RouteMode::Expert),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-request preferences that bias provider selection and timeout.
///
/// Names in `preferred_providers` / `skip_providers` that are not
/// registered are ignored; hints can only narrow the candidate set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingHints {
    pub mode: RouteMode,
    /// 0..1, only used as the confidence of a fallback answer.
    pub complexity: Option<f64>,
    pub preferred_providers: HashSet<String>,
    pub skip_providers: HashSet<String>,
    pub time_limit_ms: Option<u64>,
    /// Echoed into the fallback text when present.
    pub special_category: Option<String>,
}

impl RoutingHints {
    pub fn with_mode(mut self, mode: RouteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn prefer(mut self, name: impl Into<String>) -> Self {
        self.preferred_providers.insert(name.into());
        self
    }

    pub fn skip(mut self, name: impl Into<String>) -> Self {
        self.skip_providers.insert(name.into());
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn with_special_category(mut self, category: impl Into<String>) -> Self {
        self.special_category = Some(category.into());
        self
    }

    /// Whether the named provider survives the preferred/skip filters.
    pub fn admits(&self, name: &str) -> bool {
        if !self.preferred_providers.is_empty() && !self.preferred_providers.contains(name) {
            return false;
        }
        !self.skip_providers.contains(name)
    }

    /// Per-candidate timeout for this request, clamped to the given range.
    pub fn adaptive_timeout_ms(&self, default_ms: u64, min_ms: u64, max_ms: u64) -> u64 {
        self.time_limit_ms.unwrap_or(default_ms).clamp(min_ms, max_ms)
    }

    /// Fallback confidence: `complexity` clamped to `[0,1]`.
    pub fn fallback_confidence(&self, default: f64) -> f64 {
        match self.complexity {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => default,
        }
    }
}

/// Options passed alongside a message to `Router::route`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub routing_hints: Option<RoutingHints>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hints(mut self, hints: RoutingHints) -> Self {
        self.routing_hints = Some(hints);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn mode(&self) -> RouteMode {
        self.routing_hints
            .as_ref()
            .map(|h| h.mode)
            .unwrap_or_default()
    }
}

/// Bring a producer's confidence onto the `[0,1]` scale.
///
/// Values above 1 are read as percentages (`85` -> `0.85`). NaN maps to 0.
pub fn normalize_confidence(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

/// The default adaptive timeout bounds, for callers without settings.
pub fn default_timeout_ms(hints: Option<&RoutingHints>) -> u64 {
    let hints = hints.cloned().unwrap_or_default();
    hints.adaptive_timeout_ms(
        routing::DEFAULT_TIMEOUT_MS,
        routing::MIN_TIMEOUT_MS,
        routing::MAX_TIMEOUT_MS,
    )
}
