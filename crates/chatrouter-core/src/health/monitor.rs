use crate::health::report::SystemHealthReport;
use crate::health::tracker::HealthTracker;
use crate::provider::ProviderRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delay before the next sweep: `base` doubled once per consecutive
/// failed sweep, capped at `max`.
pub fn next_interval(base: Duration, max: Duration, consecutive_failures: u32) -> Duration {
    let factor = 2u32.saturating_pow(consecutive_failures);
    base.saturating_mul(factor).min(max)
}

/// State published after every sweep.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub sweeps: u64,
    pub consecutive_failures: u32,
    pub next_sweep_in: Option<Duration>,
    pub last_report: Option<SystemHealthReport>,
    pub last_error: Option<String>,
}

/// Background task running periodic health sweeps.
///
/// Waits `warmup_secs`, then sweeps every `sweep_interval_secs`. Each
/// failing sweep doubles the wait up to `max_sweep_interval_secs`; the
/// next successful sweep resets it.
pub struct HealthMonitor {
    handle: JoinHandle<()>,
    state: watch::Receiver<MonitorState>,
    cancel: CancellationToken,
}

impl HealthMonitor {
    pub fn spawn(
        tracker: Arc<HealthTracker>,
        registry: Arc<ProviderRegistry>,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = watch::channel(MonitorState::default());
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            run(tracker, registry, tx, task_cancel).await;
        });

        Self {
            handle,
            state: rx,
            cancel,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.clone()
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("Health monitor task ended abnormally: {}", e);
        }
    }
}

async fn run(
    tracker: Arc<HealthTracker>,
    registry: Arc<ProviderRegistry>,
    tx: watch::Sender<MonitorState>,
    cancel: CancellationToken,
) {
    let settings = tracker.settings().clone();
    let base = Duration::from_secs(settings.sweep_interval_secs);
    let max = Duration::from_secs(settings.max_sweep_interval_secs);

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(Duration::from_secs(settings.warmup_secs)) => {}
    }

    let mut state = MonitorState::default();
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = tracker.sweep(&registry) => result,
        };

        state.sweeps += 1;
        match result {
            Ok(report) => {
                if report.is_failing() {
                    state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                    tracing::warn!(
                        "Health sweep found no usable providers ({} consecutive)",
                        state.consecutive_failures
                    );
                } else {
                    state.consecutive_failures = 0;
                    tracing::info!(
                        "Health sweep complete: overall {}",
                        report.overall
                    );
                }
                state.last_error = None;
                state.last_report = Some(report);
            }
            Err(e) => {
                state.consecutive_failures = state.consecutive_failures.saturating_add(1);
                tracing::warn!(
                    "Health sweep failed ({} consecutive): {}",
                    state.consecutive_failures,
                    e
                );
                state.last_error = Some(e.to_string());
            }
        }

        let wait = next_interval(base, max, state.consecutive_failures);
        state.next_sweep_in = Some(wait);
        tx.send_replace(state.clone());

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }
    }

    tracing::debug!("Health monitor stopped after {} sweeps", state.sweeps);
}
