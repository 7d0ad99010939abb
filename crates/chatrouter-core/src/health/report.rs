use crate::health::tracker::{HealthRecord, HealthStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of providers in each health class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCounts {
    pub healthy: usize,
    pub degraded: usize,
    pub critical: usize,
    pub unavailable: usize,
}

impl HealthCounts {
    pub fn add(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Degraded => self.degraded += 1,
            HealthStatus::Critical => self.critical += 1,
            HealthStatus::Unavailable => self.unavailable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.degraded + self.critical + self.unavailable
    }

    /// Worst-case view of the whole system.
    pub fn overall(&self) -> HealthStatus {
        let total = self.total();
        if total > 0 && self.unavailable == total {
            HealthStatus::Unavailable
        } else if self.critical > 0 {
            HealthStatus::Critical
        } else if self.degraded > 0 || self.unavailable > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthIssue {
    pub provider: String,
    pub status: HealthStatus,
    pub message: String,
}

/// Result of one health sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealthReport {
    pub checked_at: DateTime<Utc>,
    pub overall: HealthStatus,
    pub counts: HealthCounts,
    pub providers: Vec<HealthRecord>,
    pub issues: Vec<HealthIssue>,
    pub recommendations: Vec<String>,
}

impl SystemHealthReport {
    pub fn new(counts: HealthCounts, providers: Vec<HealthRecord>, issues: Vec<HealthIssue>) -> Self {
        Self {
            checked_at: Utc::now(),
            overall: counts.overall(),
            recommendations: recommendations(&counts),
            counts,
            providers,
            issues,
        }
    }

    /// A sweep in which no provider is usable. Counts as a failed sweep
    /// for scheduling purposes.
    pub fn is_failing(&self) -> bool {
        self.overall == HealthStatus::Unavailable
    }
}

/// Operator advice derived only from the counts.
pub fn recommendations(counts: &HealthCounts) -> Vec<String> {
    let mut out = Vec::new();

    if counts.critical > 0 {
        out.push(format!(
            "Fix {} critical provider(s) immediately",
            counts.critical
        ));
    }
    if counts.unavailable > 0 {
        out.push(format!(
            "Investigate {} unavailable provider(s): their health checks are failing",
            counts.unavailable
        ));
    }
    if counts.degraded > 0 {
        out.push(format!(
            "Monitor {} degraded provider(s) for latency or error-rate regressions",
            counts.degraded
        ));
    }
    if counts.total() > 0 && counts.healthy == 0 {
        out.push("No healthy providers: every request will fall back to canned responses".into());
    }
    if out.is_empty() {
        out.push("All providers healthy; no action required".into());
    }
    out
}
