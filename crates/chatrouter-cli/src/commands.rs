use anyhow::{bail, Result};
use chatrouter_core::{
    Provider, ProviderRegistry, RouteMode, RouteOptions, Router, RouterResult, RoutingHints,
    Settings, SystemHealthReport,
};
use clap::{Args, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::demo;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Route a message and print the answer
    Route(RouteArgs),
    /// Print the order in which providers would be tried
    Providers {
        /// Routing mode (default, express, expert)
        #[arg(long, default_value = "default")]
        mode: String,
    },
    /// Run one health sweep and print the report
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// The chat message to route
    pub message: String,

    /// Routing mode (default, express, expert)
    #[arg(long, default_value = "default")]
    pub mode: String,

    /// Only consider these providers (repeatable)
    #[arg(long)]
    pub prefer: Vec<String>,

    /// Never consider these providers (repeatable)
    #[arg(long)]
    pub skip: Vec<String>,

    /// Per-provider time limit in milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Estimated complexity (0..1), used as fallback confidence
    #[arg(long)]
    pub complexity: Option<f64>,

    /// Topic echoed by the fallback answer
    #[arg(long)]
    pub category: Option<String>,

    /// Caller id forwarded to providers
    #[arg(long)]
    pub user: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RouteArgs {
    pub fn options(&self) -> Result<RouteOptions> {
        let mut hints = RoutingHints::default().with_mode(parse_mode(&self.mode)?);
        for name in &self.prefer {
            hints = hints.prefer(name.clone());
        }
        for name in &self.skip {
            hints = hints.skip(name.clone());
        }
        if let Some(ms) = self.time_limit_ms {
            hints = hints.with_time_limit_ms(ms);
        }
        if let Some(complexity) = self.complexity {
            hints = hints.with_complexity(complexity);
        }
        if let Some(ref category) = self.category {
            hints = hints.with_special_category(category.clone());
        }

        let mut options = RouteOptions::new().with_hints(hints);
        if let Some(ref user) = self.user {
            options = options.with_user(user.clone());
        }
        Ok(options)
    }
}

pub fn parse_mode(value: &str) -> Result<RouteMode> {
    match RouteMode::parse(value) {
        Some(mode) => Ok(mode),
        None => bail!("Unknown mode '{}'. Use one of: default, express, expert", value),
    }
}

/// Router over the demo providers, configured from `settings`.
pub fn build_router(settings: &Settings) -> Result<Router> {
    let registry = Arc::new(settings.build_registry());
    demo::register_all(&registry)?;
    Ok(settings.build_router(registry))
}

/// Execute a command and return the text to print.
pub async fn run(command: Command, settings: &Settings, cancel: &CancellationToken) -> Result<String> {
    let router = build_router(settings)?;

    match command {
        Command::Route(args) => {
            let options = args.options()?;
            let result = router.route_with_cancel(&args.message, &options, cancel).await?;
            if args.json {
                Ok(serde_json::to_string_pretty(&result)?)
            } else {
                Ok(format_result(&result))
            }
        }
        Command::Providers { mode } => {
            let hints = RoutingHints::default().with_mode(parse_mode(&mode)?);
            let candidates = router.candidates(Some(&hints));
            Ok(format_candidates(router.registry(), &candidates))
        }
        Command::Health { json } => {
            let report = router.health().sweep(router.registry()).await?;
            if json {
                Ok(serde_json::to_string_pretty(&report)?)
            } else {
                Ok(format_report(&report))
            }
        }
    }
}

pub fn format_result(result: &RouterResult) -> String {
    let provider = result.provider_name.as_deref().unwrap_or("-");
    let mut out = format!(
        "{}\n\nprovider: {}  routed by: {}  method: {}  confidence: {:.2}  time: {}ms",
        result.response,
        provider,
        result.routed_by,
        result.method,
        result.confidence,
        result.processing_time_ms
    );
    if !result.metadata.attempted.is_empty() || !result.metadata.skipped.is_empty() {
        let attempted: Vec<&str> = result
            .metadata
            .attempted
            .iter()
            .map(|a| a.provider.as_str())
            .collect();
        out.push_str(&format!(
            "\nattempted: [{}]  skipped: [{}]",
            attempted.join(", "),
            result.metadata.skipped.join(", ")
        ));
    }
    out
}

pub fn format_candidates(registry: &ProviderRegistry, candidates: &[Arc<dyn Provider>]) -> String {
    if candidates.is_empty() {
        return "No providers registered.".to_string();
    }
    let mut out = format!("{} of {} provider(s), in trial order:\n", candidates.len(), registry.len());
    for (i, p) in candidates.iter().enumerate() {
        out.push_str(&format!("  {}. {:<14} priority {}\n", i + 1, p.name(), p.priority()));
    }
    out.trim_end().to_string()
}

pub fn format_report(report: &SystemHealthReport) -> String {
    let mut out = format!(
        "Overall: {}  (healthy {}, degraded {}, critical {}, unavailable {})\n",
        report.overall,
        report.counts.healthy,
        report.counts.degraded,
        report.counts.critical,
        report.counts.unavailable
    );

    out.push_str("\nProviders:\n");
    for record in &report.providers {
        out.push_str(&format!(
            "  {:<14} {:<11} calls {:<4} error rate {:>5.1}%  avg {:.0}ms\n",
            record.name,
            record.status.name(),
            record.total_calls,
            record.error_rate() * 100.0,
            record.average_response_time_ms
        ));
    }

    if !report.issues.is_empty() {
        out.push_str("\nIssues:\n");
        for issue in &report.issues {
            out.push_str(&format!("  {} ({}): {}\n", issue.provider, issue.status, issue.message));
        }
    }

    out.push_str("\nRecommendations:\n");
    for advice in &report.recommendations {
        out.push_str(&format!("  - {}\n", advice));
    }
    out.trim_end().to_string()
}
