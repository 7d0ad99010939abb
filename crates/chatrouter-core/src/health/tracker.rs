use crate::config::HealthSettings;
use crate::constants::health::LATENCY_EWMA_ALPHA;
use crate::error::{Result, RouterError};
use crate::health::report::{HealthCounts, HealthIssue, SystemHealthReport};
use crate::provider::{ProbeReport, Provider, ProviderRegistry};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Point-in-time health classification of a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Critical,
    Unavailable,
}

impl HealthStatus {
    pub fn name(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Critical => "critical",
            HealthStatus::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a single `process` call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallOutcome {
    Success,
    Error(String),
    Timeout,
    /// The caller cancelled the request while the call was in flight.
    Abandoned,
}

impl CallOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CallOutcome::Error(_) | CallOutcome::Timeout)
    }
}

/// Outcome of the last self-check a sweep ran against a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub passed: bool,
    pub memory_mb: Option<f64>,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Rolling call statistics for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub name: String,
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub timeouts: u64,
    /// Not counted in `total_calls`: abandonment says nothing about the
    /// provider itself.
    pub abandoned_calls: u64,
    pub average_response_time_ms: f64,
    pub consecutive_failures: u64,
    pub last_error: Option<String>,
    pub last_probe: Option<ProbeOutcome>,
    pub last_updated: Option<DateTime<Utc>>,
    pub status: HealthStatus,
}

impl HealthRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_calls: 0,
            successful_calls: 0,
            failed_calls: 0,
            timeouts: 0,
            abandoned_calls: 0,
            average_response_time_ms: 0.0,
            consecutive_failures: 0,
            last_error: None,
            last_probe: None,
            last_updated: None,
            status: HealthStatus::Healthy,
        }
    }

    /// `1 - successful/total`, or 0 before the first call.
    pub fn error_rate(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            1.0 - self.successful_calls as f64 / self.total_calls as f64
        }
    }

    fn apply(&mut self, elapsed: Duration, outcome: &CallOutcome) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        match outcome {
            CallOutcome::Abandoned => {
                self.abandoned_calls += 1;
            }
            CallOutcome::Success => {
                self.observe_latency(elapsed_ms);
                self.total_calls += 1;
                self.successful_calls += 1;
                self.consecutive_failures = 0;
            }
            CallOutcome::Error(message) => {
                self.observe_latency(elapsed_ms);
                self.total_calls += 1;
                self.failed_calls += 1;
                self.consecutive_failures += 1;
                self.last_error = Some(message.clone());
            }
            CallOutcome::Timeout => {
                self.observe_latency(elapsed_ms);
                self.total_calls += 1;
                self.failed_calls += 1;
                self.timeouts += 1;
                self.consecutive_failures += 1;
                self.last_error = Some(format!("timeout after {:.0}ms", elapsed_ms));
            }
        }
        self.last_updated = Some(Utc::now());
    }

    fn observe_latency(&mut self, elapsed_ms: f64) {
        self.average_response_time_ms = if self.total_calls == 0 {
            elapsed_ms
        } else {
            self.average_response_time_ms * (1.0 - LATENCY_EWMA_ALPHA)
                + elapsed_ms * LATENCY_EWMA_ALPHA
        };
    }

    /// Human-readable reasons this record is not healthy.
    pub fn issues(&self, settings: &HealthSettings) -> Vec<String> {
        let mut issues = Vec::new();

        if let Some(ref probe) = self.last_probe {
            if !probe.passed {
                issues.push(format!(
                    "health check failed: {}",
                    probe.message.as_deref().unwrap_or("no details")
                ));
            }
        }
        if self.consecutive_failures >= settings.unavailable_after_failures {
            issues.push(format!(
                "{} consecutive failed calls",
                self.consecutive_failures
            ));
        }

        let error_rate = self.error_rate();
        if error_rate >= settings.degraded_error_rate && self.total_calls > 0 {
            issues.push(format!("error rate {:.1}%", error_rate * 100.0));
        }
        if self.average_response_time_ms >= settings.degraded_latency_ms {
            issues.push(format!(
                "average response time {:.0}ms",
                self.average_response_time_ms
            ));
        }
        if let Some(memory) = self.last_probe.as_ref().and_then(|p| p.memory_mb) {
            if memory >= settings.degraded_memory_mb {
                issues.push(format!("memory usage {:.0}MB", memory));
            }
        }
        issues
    }
}

/// Classify a record against the configured thresholds.
pub fn classify(record: &HealthRecord, settings: &HealthSettings) -> HealthStatus {
    let probe_failed = record.last_probe.as_ref().is_some_and(|p| !p.passed);
    if probe_failed || record.consecutive_failures >= settings.unavailable_after_failures {
        return HealthStatus::Unavailable;
    }

    let error_rate = record.error_rate();
    let latency = record.average_response_time_ms;
    let memory = record
        .last_probe
        .as_ref()
        .and_then(|p| p.memory_mb)
        .unwrap_or(0.0);

    if error_rate >= settings.critical_error_rate
        || latency >= settings.critical_latency_ms
        || memory >= settings.critical_memory_mb
    {
        HealthStatus::Critical
    } else if error_rate >= settings.degraded_error_rate
        || latency >= settings.degraded_latency_ms
        || memory >= settings.degraded_memory_mb
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

enum ProbeResult {
    NotExposed,
    Passed(ProbeReport),
    Failed(String),
}

/// Run one provider's self-check under `timeout_ms`.
async fn probe_provider(provider: Arc<dyn Provider>, timeout_ms: u64) -> (String, ProbeResult) {
    let name = provider.name().to_string();
    let limit = Duration::from_millis(timeout_ms);
    let result = match tokio::time::timeout(limit, provider.health_check()).await {
        Ok(None) => ProbeResult::NotExposed,
        Ok(Some(Ok(report))) => ProbeResult::Passed(report),
        Ok(Some(Err(e))) => ProbeResult::Failed(e.to_string()),
        Err(_) => ProbeResult::Failed(format!("health check timed out after {}ms", timeout_ms)),
    };
    (name, result)
}

/// Observes call outcomes and exposes per-provider health.
///
/// Each record sits behind its own mutex, so a reader always sees the
/// counters and the derived status from the same update.
pub struct HealthTracker {
    records: RwLock<HashMap<String, Arc<Mutex<HealthRecord>>>>,
    settings: HealthSettings,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new(HealthSettings::default())
    }
}

impl HealthTracker {
    pub fn new(settings: HealthSettings) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            settings,
        }
    }

    pub fn settings(&self) -> &HealthSettings {
        &self.settings
    }

    fn entry(&self, name: &str) -> Arc<Mutex<HealthRecord>> {
        if let Some(record) = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
        {
            return record.clone();
        }

        self.records
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HealthRecord::new(name))))
            .clone()
    }

    /// Make sure a record exists for `name` (called on registration).
    pub fn track(&self, name: &str) {
        self.entry(name);
    }

    /// Record the outcome of one `process` call.
    pub fn record(&self, name: &str, elapsed: Duration, outcome: CallOutcome) {
        let entry = self.entry(name);
        let mut record = entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = record.status;
        record.apply(elapsed, &outcome);
        record.status = classify(&record, &self.settings);

        if record.status != before {
            tracing::info!(
                "Provider '{}' health changed: {} -> {}",
                name,
                before,
                record.status
            );
        }
    }

    pub fn status_of(&self, name: &str) -> Option<HealthRecord> {
        let entry = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()?;
        let record = entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(record.clone())
    }

    /// All known records, sorted by name.
    pub fn snapshot(&self) -> Vec<HealthRecord> {
        let entries: Vec<Arc<Mutex<HealthRecord>>> = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect();

        let mut records: Vec<HealthRecord> = entries
            .iter()
            .map(|e| e.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone())
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    fn apply_probe(&self, name: &str, probe: &ProbeResult) {
        let entry = self.entry(name);
        let mut record = entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let checked_at = Utc::now();
        match probe {
            ProbeResult::NotExposed => {}
            ProbeResult::Passed(report) => {
                record.last_probe = Some(ProbeOutcome {
                    passed: true,
                    memory_mb: report.memory_mb,
                    message: report.details.clone(),
                    checked_at,
                });
            }
            ProbeResult::Failed(message) => {
                record.last_probe = Some(ProbeOutcome {
                    passed: false,
                    memory_mb: None,
                    message: Some(message.clone()),
                    checked_at,
                });
            }
        }
        record.status = classify(&record, &self.settings);
    }

    /// Run every provider's self-check and aggregate a report.
    ///
    /// Checks run concurrently (bounded by `max_concurrent_checks`), each
    /// under `check_timeout_ms`. A failing or hung check only affects the
    /// provider it belongs to.
    pub async fn sweep(&self, registry: &ProviderRegistry) -> Result<SystemHealthReport> {
        let providers = registry.all();
        if providers.is_empty() {
            return Err(RouterError::EmptyRegistry);
        }

        let check_timeout_ms = self.settings.check_timeout_ms;
        let concurrency = self.settings.max_concurrent_checks.max(1);

        // Collected eagerly: a closure-mapped stream here breaks the `Send`
        // bound `HealthMonitor` needs for `tokio::spawn`.
        let checks: Vec<_> = providers
            .iter()
            .cloned()
            .map(|provider| probe_provider(provider, check_timeout_ms))
            .collect();
        let probes: Vec<(String, ProbeResult)> = futures::stream::iter(checks)
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for (name, probe) in &probes {
            if let ProbeResult::Failed(message) = probe {
                tracing::warn!("Health check failed for '{}': {}", name, message);
            }
            self.apply_probe(name, probe);
        }

        let mut counts = HealthCounts::default();
        let mut records = Vec::with_capacity(providers.len());
        let mut issues = Vec::new();

        for provider in &providers {
            let record = match self.status_of(provider.name()) {
                Some(record) => record,
                None => continue,
            };
            counts.add(record.status);
            for message in record.issues(&self.settings) {
                issues.push(HealthIssue {
                    provider: record.name.clone(),
                    status: record.status,
                    message,
                });
            }
            records.push(record);
        }

        let report = SystemHealthReport::new(counts, records, issues);
        tracing::debug!(
            "Health sweep: {} healthy, {} degraded, {} critical, {} unavailable",
            counts.healthy,
            counts.degraded,
            counts.critical,
            counts.unavailable
        );
        Ok(report)
    }
}
