use chatrouter_cli::commands::{format_result, parse_mode, run, Command};
use chatrouter_cli::demo;
use chatrouter_core::{ProviderRegistry, RouteMode, RouteOptions, Settings};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
struct TestCli {
    #[command(subcommand)]
    command: Command,
}

fn parse(args: &[&str]) -> Command {
    let mut full = vec!["chatrouter"];
    full.extend_from_slice(args);
    TestCli::try_parse_from(full).unwrap().command
}

async fn run_args(args: &[&str]) -> String {
    run(parse(args), &Settings::default(), &CancellationToken::new())
        .await
        .unwrap()
}

// ========================================================================
// Argument parsing
// ========================================================================

#[test]
fn test_parse_route_with_hints() {
    let command = parse(&[
        "route",
        "find me flights",
        "--mode",
        "express",
        "--prefer",
        "Search",
        "--prefer",
        "Conversation",
        "--skip",
        "Semantic",
        "--time-limit-ms",
        "2500",
        "--complexity",
        "0.7",
        "--category",
        "travel",
    ]);

    let Command::Route(args) = command else {
        panic!("expected route command");
    };
    assert_eq!(args.message, "find me flights");

    let options = args.options().unwrap();
    let hints = options.routing_hints.unwrap();
    assert_eq!(hints.mode, RouteMode::Express);
    assert_eq!(hints.preferred_providers.len(), 2);
    assert!(hints.skip_providers.contains("Semantic"));
    assert_eq!(hints.time_limit_ms, Some(2500));
    assert_eq!(hints.complexity, Some(0.7));
    assert_eq!(hints.special_category.as_deref(), Some("travel"));
}

#[test]
fn test_parse_rejects_missing_message() {
    let result = TestCli::try_parse_from(["chatrouter", "route"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_mode_values() {
    assert_eq!(parse_mode("Expert").unwrap(), RouteMode::Expert);
    assert_eq!(parse_mode("fast").unwrap(), RouteMode::Express);
    assert_eq!(parse_mode("default").unwrap(), RouteMode::Default);
    let err = parse_mode("turbo").unwrap_err();
    assert!(err.to_string().contains("turbo"));
}

#[test]
fn test_bad_mode_surfaces_from_options() {
    let Command::Route(args) = parse(&["route", "hi", "--mode", "turbo"]) else {
        panic!("expected route command");
    };
    assert!(args.options().is_err());
}

// ========================================================================
// Demo providers
// ========================================================================

#[test]
fn test_demo_registry_order() {
    let registry = ProviderRegistry::new();
    demo::register_all(&registry).unwrap();
    let names: Vec<_> = registry
        .active_providers(None)
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["QuickAnswer", "Semantic", "Search", "Conversation"]);
}

#[tokio::test]
async fn test_quick_answer_computes() {
    let provider = demo::quick_answer().unwrap();
    let options = RouteOptions::new();
    assert!(provider.can_handle("6 * 7", &options));
    assert!(!provider.can_handle("six times seven", &options));
    let reply = provider.process("6 * 7", &options).await.unwrap();
    assert_eq!(reply.response, "6 * 7 = 42");
}

// ========================================================================
// Command output
// ========================================================================

#[tokio::test]
async fn test_route_command_uses_highest_priority_match() {
    let output = run_args(&["route", "12 + 30"]).await;
    assert!(output.starts_with("12 + 30 = 42"));
    assert!(output.contains("provider: QuickAnswer"));
    assert!(output.contains("routed by: router"));
}

#[tokio::test]
async fn test_route_command_falls_back() {
    let output = run_args(&[
        "route",
        "please write a long essay on the history of the printing press in europe",
    ])
    .await;
    assert!(output.contains("routed by: router-fallback"));
    assert!(output.contains("provider: FallbackResponder"));
}

#[tokio::test]
async fn test_route_command_json() {
    let output = run_args(&["route", "what is rust?", "--json", "--user", "ada"]).await;
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["providerName"], "Semantic");
    assert_eq!(value["confidence"], 0.72);
    assert!(value["response"].as_str().unwrap().contains("ada"));
    assert_eq!(value["metadata"]["userId"], "ada");
}

#[tokio::test]
async fn test_route_command_respects_skip() {
    let output = run_args(&["route", "what is rust?", "--skip", "Semantic"]).await;
    assert!(output.contains("provider: Conversation"));
}

#[tokio::test]
async fn test_providers_command_lists_order() {
    let output = run_args(&["providers", "--mode", "express"]).await;
    assert!(output.starts_with("4 of 4 provider(s)"));
    let quick = output.find("QuickAnswer").unwrap();
    let convo = output.find("Conversation").unwrap();
    assert!(quick < convo);
}

#[tokio::test]
async fn test_health_command_reports_all_healthy() {
    let output = run_args(&["health"]).await;
    assert!(output.starts_with("Overall: healthy"));
    assert!(output.contains("All providers healthy"));

    let json = run_args(&["health", "--json"]).await;
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["counts"]["healthy"], 4);
}

#[tokio::test]
async fn test_cancelled_route_is_an_error() {
    let token = CancellationToken::new();
    token.cancel();
    let result = run(parse(&["route", "hello"]), &Settings::default(), &token).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_format_result_lists_attempts() {
    let router = chatrouter_cli::build_router(&Settings::default()).unwrap();
    let result = router.route("hello there", &RouteOptions::new()).await.unwrap();
    let text = format_result(&result);
    assert!(text.contains("attempted: [Conversation]"));
    assert!(text.contains("skipped: [QuickAnswer, Semantic, Search]"));
}

#[test]
fn test_config_file_feeds_router() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[routing]\nexpress_providers = [\"Conversation\"]\n",
    )
    .unwrap();
    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.routing.express_providers, vec!["Conversation"]);

    let router = chatrouter_cli::build_router(&settings).unwrap();
    assert_eq!(router.registry().curated().express, vec!["Conversation"]);
    assert_eq!(router.curated().express, vec!["Conversation"]);
}
