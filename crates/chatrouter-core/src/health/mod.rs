mod tracker;
mod report;
pub mod monitor;

pub use tracker::{classify, CallOutcome, HealthRecord, HealthStatus, HealthTracker, ProbeOutcome};
pub use report::{recommendations, HealthCounts, HealthIssue, SystemHealthReport};
pub use monitor::{next_interval, HealthMonitor, MonitorState};
