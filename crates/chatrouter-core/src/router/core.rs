use crate::config::RoutingSettings;
use crate::constants::routing;
use crate::error::{Result, RouterError};
use crate::fallback::{FallbackReply, FallbackResponder};
use crate::health::{CallOutcome, HealthStatus, HealthTracker};
use crate::hints::{normalize_confidence, RouteOptions, RoutingHints};
use crate::provider::{CuratedSets, Provider, ProviderRegistry};
use crate::router::result::{Attempt, RouteMetadata, RouterResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Dispatches a chat message to the registered providers.
///
/// Candidates are tried one at a time, strictly in registry order, each
/// under the request's adaptive timeout. The first usable answer wins;
/// when every candidate declines, fails or times out the caller still gets
/// a successful envelope carrying the fallback text.
pub struct Router {
    registry: Arc<ProviderRegistry>,
    health: Arc<HealthTracker>,
    fallback: FallbackResponder,
    settings: RoutingSettings,
    curated: CuratedSets,
}

impl Router {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        let health = Arc::new(HealthTracker::default());
        for name in registry.names() {
            health.track(&name);
        }
        let curated = registry.curated().clone();
        Self {
            registry,
            health,
            fallback: FallbackResponder::new(),
            settings: RoutingSettings::default(),
            curated,
        }
    }

    /// Apply routing settings. Their express/expert lists replace the
    /// registry's curated sets for this router.
    pub fn with_settings(mut self, settings: RoutingSettings) -> Self {
        self.curated = settings.curated_sets();
        self.settings = settings;
        self
    }

    /// Share a tracker with a `HealthMonitor`.
    pub fn with_health(mut self, health: Arc<HealthTracker>) -> Self {
        for name in self.registry.names() {
            health.track(&name);
        }
        self.health = health;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackResponder) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    /// The express/expert sets used to order candidates.
    pub fn curated(&self) -> &CuratedSets {
        &self.curated
    }

    /// Register a provider and start tracking its health.
    pub fn register(&self, provider: Arc<dyn Provider>) -> Result<()> {
        let name = provider.name().to_string();
        self.registry.register(provider)?;
        self.health.track(&name);
        Ok(())
    }

    /// The ordered candidate list for a request.
    pub fn candidates(&self, hints: Option<&RoutingHints>) -> Vec<Arc<dyn Provider>> {
        let mut candidates = self.registry.active_providers_with(hints, &self.curated);
        if self.settings.skip_unavailable {
            candidates.retain(|p| {
                let unavailable = self
                    .health
                    .status_of(p.name())
                    .is_some_and(|r| r.status == HealthStatus::Unavailable);
                if unavailable {
                    tracing::debug!("Skipping unavailable provider '{}'", p.name());
                }
                !unavailable
            });
        }
        candidates
    }

    pub async fn route(&self, message: &str, options: &RouteOptions) -> Result<RouterResult> {
        self.route_with_cancel(message, options, &CancellationToken::new())
            .await
    }

    /// Route a message, abandoning the in-flight attempt if `cancel` fires.
    ///
    /// Errors only when the registry is empty or the caller cancelled;
    /// provider failures always degrade to the fallback answer.
    pub async fn route_with_cancel(
        &self,
        message: &str,
        options: &RouteOptions,
        cancel: &CancellationToken,
    ) -> Result<RouterResult> {
        let started = Instant::now();
        let hints = options.routing_hints.clone().unwrap_or_default();
        let timeout_ms = hints.adaptive_timeout_ms(
            self.settings.default_timeout_ms,
            self.settings.min_timeout_ms,
            self.settings.max_timeout_ms,
        );
        let mut metadata = RouteMetadata::new(options, timeout_ms);

        if message.trim().is_empty() {
            tracing::debug!("Empty message, answering with the empty-input fallback");
            let reply = self.fallback.empty_input();
            return Ok(self.fallback_result(reply, &hints, metadata, started));
        }

        if self.registry.is_empty() {
            return Err(RouterError::EmptyRegistry);
        }

        let candidates = self.candidates(Some(&hints));
        metadata.candidates_total = candidates.len();
        let timeout = Duration::from_millis(timeout_ms);

        for provider in candidates {
            if cancel.is_cancelled() {
                return Err(RouterError::Cancelled);
            }

            let name = provider.name().to_string();
            metadata.candidates_checked += 1;

            if !provider.can_handle(message, options) {
                tracing::debug!("Provider '{}' cannot handle message, skipping", name);
                metadata.skipped.push(name);
                continue;
            }

            let attempt_started = Instant::now();
            // Dropping the `process` future on timeout or cancellation
            // cancels the call at its next await point.
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                res = tokio::time::timeout(timeout, provider.process(message, options)) => Some(res),
            };
            let elapsed = attempt_started.elapsed();

            let call = match outcome {
                None => {
                    tracing::info!("Request cancelled while '{}' was processing", name);
                    self.health.record(&name, elapsed, CallOutcome::Abandoned);
                    return Err(RouterError::Cancelled);
                }
                Some(Ok(Ok(reply))) if reply.is_usable() => {
                    self.health.record(&name, elapsed, CallOutcome::Success);
                    metadata.attempted.push(Attempt {
                        provider: name.clone(),
                        outcome: CallOutcome::Success,
                        elapsed_ms: elapsed.as_millis() as u64,
                    });
                    metadata.provider_metadata = reply.metadata;

                    let processing_time_ms = started.elapsed().as_millis() as u64;
                    tracing::info!(
                        "Routed to '{}' in {}ms ({} candidate(s) checked)",
                        name,
                        processing_time_ms,
                        metadata.candidates_checked
                    );

                    return Ok(RouterResult {
                        success: true,
                        response: reply.response,
                        confidence: reply
                            .confidence
                            .map(normalize_confidence)
                            .unwrap_or(routing::DEFAULT_PROVIDER_CONFIDENCE),
                        method: reply.method.unwrap_or_else(|| "provider".to_string()),
                        provider_name: Some(name),
                        processing_time_ms,
                        routed_by: routing::ROUTED_BY_ROUTER.to_string(),
                        metadata,
                    });
                }
                Some(Ok(Ok(_))) => {
                    CallOutcome::Error("provider returned no usable response".to_string())
                }
                Some(Ok(Err(e))) => CallOutcome::Error(e.to_string()),
                Some(Err(_)) => CallOutcome::Timeout,
            };

            match call {
                CallOutcome::Timeout => {
                    tracing::warn!("Provider '{}' timed out after {}ms", name, timeout_ms)
                }
                CallOutcome::Error(ref err) => {
                    tracing::warn!("Provider '{}' failed: {}", name, err)
                }
                _ => {}
            }

            self.health.record(&name, elapsed, call.clone());
            metadata.attempted.push(Attempt {
                provider: name,
                outcome: call,
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        tracing::info!(
            "No provider answered ({} checked, {} attempted), using fallback",
            metadata.candidates_checked,
            metadata.attempted.len()
        );
        let reply = self
            .fallback
            .respond(message, hints.special_category.as_deref());
        Ok(self.fallback_result(reply, &hints, metadata, started))
    }

    fn fallback_result(
        &self,
        reply: FallbackReply,
        hints: &RoutingHints,
        mut metadata: RouteMetadata,
        started: Instant,
    ) -> RouterResult {
        let method = format!("fallback:{}", reply.rule.name());
        metadata.fallback_rule = Some(reply.rule.name().to_string());
        metadata.fallback_category = reply.category;

        RouterResult {
            success: true,
            response: reply.text,
            provider_name: Some(routing::FALLBACK_PROVIDER_NAME.to_string()),
            confidence: hints.fallback_confidence(self.settings.fallback_confidence),
            processing_time_ms: started.elapsed().as_millis() as u64,
            method,
            routed_by: routing::ROUTED_BY_FALLBACK.to_string(),
            metadata,
        }
    }
}
