//! Centralized constants: timeouts, health thresholds, curated provider
//! lists and config paths. `config` builds its defaults from these.

// ─── Routing ──────────────────────────────────────────────────────────────────

pub mod routing {
    /// Per-candidate timeout used when the caller gives no time limit.
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
    pub const MIN_TIMEOUT_MS: u64 = 1_000;
    pub const MAX_TIMEOUT_MS: u64 = 60_000;

    /// Fallback confidence when the caller gives no complexity hint.
    pub const DEFAULT_FALLBACK_CONFIDENCE: f64 = 0.5;

    /// Confidence reported for a provider answer that carries none.
    pub const DEFAULT_PROVIDER_CONFIDENCE: f64 = 0.8;

    pub const ROUTED_BY_ROUTER: &str = "router";
    pub const ROUTED_BY_FALLBACK: &str = "router-fallback";
    pub const FALLBACK_PROVIDER_NAME: &str = "FallbackResponder";
}

// ─── Curated provider subsets ─────────────────────────────────────────────────

pub mod curated {
    /// Providers favoured in express mode (cheap, answer quickly).
    pub const EXPRESS: &[&str] = &["Conversation", "QuickAnswer", "Search"];

    /// Providers favoured in expert mode (slower, deeper analysis).
    pub const EXPERT: &[&str] = &["Semantic", "DeepAnalysis", "ImageAnalysis"];
}

// ─── Health ───────────────────────────────────────────────────────────────────

pub mod health {
    /// Weight of the newest sample in the moving latency average.
    pub const LATENCY_EWMA_ALPHA: f64 = 0.2;

    pub const DEGRADED_ERROR_RATE: f64 = 0.15;
    pub const CRITICAL_ERROR_RATE: f64 = 0.40;
    pub const DEGRADED_LATENCY_MS: f64 = 5_000.0;
    pub const CRITICAL_LATENCY_MS: f64 = 10_000.0;
    pub const DEGRADED_MEMORY_MB: f64 = 512.0;
    pub const CRITICAL_MEMORY_MB: f64 = 1_024.0;
    pub const UNAVAILABLE_AFTER_FAILURES: u64 = 5;

    pub const CHECK_TIMEOUT_MS: u64 = 3_000;
    pub const MAX_CONCURRENT_CHECKS: usize = 4;

    pub const WARMUP_SECS: u64 = 30;
    pub const SWEEP_INTERVAL_SECS: u64 = 60;
    pub const MAX_SWEEP_INTERVAL_SECS: u64 = 300;
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "chatrouter";
    pub const CONFIG_FILE: &str = "config.toml";
}
