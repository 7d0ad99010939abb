use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::constants::{health, paths, routing};
use crate::error::{Result, RouterError};
use crate::fallback::{DomainRule, FallbackResponder};
use crate::health::HealthTracker;
use crate::provider::{CuratedSets, ProviderRegistry};
use crate::router::Router;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub health: HealthSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub default_timeout_ms: u64,
    pub min_timeout_ms: u64,
    pub max_timeout_ms: u64,
    /// Confidence of a fallback answer when the caller gives no complexity.
    pub fallback_confidence: f64,
    /// Drop providers whose health status is `unavailable` from the
    /// candidate list.
    pub skip_unavailable: bool,
    pub express_providers: Vec<String>,
    pub expert_providers: Vec<String>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        let curated = CuratedSets::default();
        Self {
            default_timeout_ms: routing::DEFAULT_TIMEOUT_MS,
            min_timeout_ms: routing::MIN_TIMEOUT_MS,
            max_timeout_ms: routing::MAX_TIMEOUT_MS,
            fallback_confidence: routing::DEFAULT_FALLBACK_CONFIDENCE,
            skip_unavailable: false,
            express_providers: curated.express,
            expert_providers: curated.expert,
        }
    }
}

impl RoutingSettings {
    pub fn curated_sets(&self) -> CuratedSets {
        CuratedSets {
            express: self.express_providers.clone(),
            expert: self.expert_providers.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub degraded_error_rate: f64,
    pub critical_error_rate: f64,
    pub degraded_latency_ms: f64,
    pub critical_latency_ms: f64,
    pub degraded_memory_mb: f64,
    pub critical_memory_mb: f64,
    pub unavailable_after_failures: u64,
    /// Hard per-provider limit on a self-check during a sweep.
    pub check_timeout_ms: u64,
    pub max_concurrent_checks: usize,
    pub warmup_secs: u64,
    pub sweep_interval_secs: u64,
    pub max_sweep_interval_secs: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            degraded_error_rate: health::DEGRADED_ERROR_RATE,
            critical_error_rate: health::CRITICAL_ERROR_RATE,
            degraded_latency_ms: health::DEGRADED_LATENCY_MS,
            critical_latency_ms: health::CRITICAL_LATENCY_MS,
            degraded_memory_mb: health::DEGRADED_MEMORY_MB,
            critical_memory_mb: health::CRITICAL_MEMORY_MB,
            unavailable_after_failures: health::UNAVAILABLE_AFTER_FAILURES,
            check_timeout_ms: health::CHECK_TIMEOUT_MS,
            max_concurrent_checks: health::MAX_CONCURRENT_CHECKS,
            warmup_secs: health::WARMUP_SECS,
            sweep_interval_secs: health::SWEEP_INTERVAL_SECS,
            max_sweep_interval_secs: health::MAX_SWEEP_INTERVAL_SECS,
        }
    }
}

/// Extra keyword lists for the fallback responder, tried after the
/// built-in domains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSettings {
    pub domains: Vec<DomainEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEntry {
    pub name: String,
    pub keywords: Vec<String>,
    /// Response template; `{category}` is replaced with the topic.
    #[serde(default)]
    pub response: Option<String>,
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!(
                    "Ignoring config at {}: {}",
                    config_path.display(),
                    e
                ),
            }
        }
        Self::default()
    }

    /// Load from an explicit path, reporting parse and validation errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings =
            toml::from_str(&content).map_err(|e| RouterError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RouterError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let r = &self.routing;
        if r.min_timeout_ms == 0 || r.min_timeout_ms > r.max_timeout_ms {
            return Err(RouterError::Config(format!(
                "routing timeout range [{}, {}] is invalid",
                r.min_timeout_ms, r.max_timeout_ms
            )));
        }
        if !(0.0..=1.0).contains(&r.fallback_confidence) {
            return Err(RouterError::Config(
                "routing.fallback_confidence must be within [0, 1]".into(),
            ));
        }

        let h = &self.health;
        if h.degraded_error_rate > h.critical_error_rate {
            return Err(RouterError::Config(
                "health.degraded_error_rate must not exceed critical_error_rate".into(),
            ));
        }
        if h.degraded_latency_ms > h.critical_latency_ms {
            return Err(RouterError::Config(
                "health.degraded_latency_ms must not exceed critical_latency_ms".into(),
            ));
        }
        if h.degraded_memory_mb > h.critical_memory_mb {
            return Err(RouterError::Config(
                "health.degraded_memory_mb must not exceed critical_memory_mb".into(),
            ));
        }
        if h.sweep_interval_secs == 0 || h.sweep_interval_secs > h.max_sweep_interval_secs {
            return Err(RouterError::Config(
                "health.sweep_interval_secs must be positive and not exceed max_sweep_interval_secs"
                    .into(),
            ));
        }

        for domain in &self.fallback.domains {
            if domain.name.trim().is_empty() || domain.keywords.is_empty() {
                return Err(RouterError::Config(format!(
                    "fallback domain '{}' needs a name and at least one keyword",
                    domain.name
                )));
            }
        }
        Ok(())
    }

    /// An empty registry carrying the configured curated subsets.
    pub fn build_registry(&self) -> ProviderRegistry {
        ProviderRegistry::with_curated(self.routing.curated_sets())
    }

    pub fn build_fallback(&self) -> FallbackResponder {
        self.fallback
            .domains
            .iter()
            .fold(FallbackResponder::new(), |responder, entry| {
                let mut rule = DomainRule::new(entry.name.clone(), entry.keywords.clone());
                if let Some(ref template) = entry.response {
                    rule = rule.with_template(template.clone());
                }
                responder.with_domain(rule)
            })
    }

    pub fn build_health_tracker(&self) -> HealthTracker {
        HealthTracker::new(self.health.clone())
    }

    /// Assemble a router around `registry` using these settings.
    pub fn build_router(&self, registry: Arc<ProviderRegistry>) -> Router {
        Router::new(registry)
            .with_settings(self.routing.clone())
            .with_health(Arc::new(self.build_health_tracker()))
            .with_fallback(self.build_fallback())
    }
}
