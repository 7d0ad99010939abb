use chatrouter_core::config::{DomainEntry, Settings};
use chatrouter_core::*;
use std::sync::Arc;
use tempfile::TempDir;

// ========================================================================
// Settings Tests (config/mod.rs)
// ========================================================================

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.routing.default_timeout_ms, 10_000);
    assert_eq!(settings.routing.min_timeout_ms, 1_000);
    assert_eq!(settings.routing.max_timeout_ms, 60_000);
    assert_eq!(settings.routing.fallback_confidence, 0.5);
    assert!(!settings.routing.skip_unavailable);
    assert_eq!(
        settings.routing.express_providers,
        vec!["Conversation", "QuickAnswer", "Search"]
    );

    assert_eq!(settings.health.degraded_error_rate, 0.15);
    assert_eq!(settings.health.critical_error_rate, 0.40);
    assert_eq!(settings.health.unavailable_after_failures, 5);
    assert_eq!(settings.health.check_timeout_ms, 3_000);
    assert_eq!(settings.health.warmup_secs, 30);

    assert!(settings.fallback.domains.is_empty());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_config_path_ends_with_app_dir() {
    let path = Settings::config_path();
    assert!(path.ends_with("chatrouter/config.toml"));
}

#[test]
fn test_settings_save_and_reload_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut settings = Settings::default();
    settings.routing.default_timeout_ms = 4_000;
    settings.routing.skip_unavailable = true;
    settings.health.sweep_interval_secs = 30;
    settings.fallback.domains.push(DomainEntry {
        name: "cooking".into(),
        keywords: vec!["recipe".into()],
        response: Some("No chef around for {category}.".into()),
    });

    settings.save_to(&config_path).unwrap();
    let loaded = Settings::load_from(&config_path).unwrap();

    assert_eq!(loaded.routing.default_timeout_ms, 4_000);
    assert!(loaded.routing.skip_unavailable);
    assert_eq!(loaded.health.sweep_interval_secs, 30);
    assert_eq!(loaded.fallback.domains.len(), 1);
    assert_eq!(loaded.fallback.domains[0].name, "cooking");
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[routing]\nfallback_confidence = 0.25\n\n[health]\nwarmup_secs = 5\n",
    )
    .unwrap();

    let loaded = Settings::load_from(&config_path).unwrap();
    assert_eq!(loaded.routing.fallback_confidence, 0.25);
    assert_eq!(loaded.routing.default_timeout_ms, 10_000);
    assert_eq!(loaded.health.warmup_secs, 5);
    assert_eq!(loaded.health.sweep_interval_secs, 60);
}

#[test]
fn test_load_from_reports_errors() {
    let temp_dir = TempDir::new().unwrap();

    let missing = temp_dir.path().join("missing.toml");
    assert!(matches!(
        Settings::load_from(&missing),
        Err(RouterError::Io(_))
    ));

    let garbled = temp_dir.path().join("garbled.toml");
    std::fs::write(&garbled, "[routing\nnot toml").unwrap();
    assert!(matches!(
        Settings::load_from(&garbled),
        Err(RouterError::Config(_))
    ));

    let invalid = temp_dir.path().join("invalid.toml");
    std::fs::write(&invalid, "[routing]\nmin_timeout_ms = 9000\nmax_timeout_ms = 100\n").unwrap();
    assert!(matches!(
        Settings::load_from(&invalid),
        Err(RouterError::Config(_))
    ));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut settings = Settings::default();
    settings.routing.fallback_confidence = 1.5;
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.health.degraded_error_rate = 0.9;
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.health.sweep_interval_secs = 600;
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.fallback.domains.push(DomainEntry {
        name: "empty".into(),
        keywords: vec![],
        response: None,
    });
    assert!(settings.validate().is_err());
}

#[tokio::test]
async fn test_build_router_applies_settings() {
    let mut settings = Settings::default();
    settings.routing.fallback_confidence = 0.2;
    settings.fallback.domains.push(DomainEntry {
        name: "cooking".into(),
        keywords: vec!["recipe".into()],
        response: None,
    });

    let registry = Arc::new(settings.build_registry());
    registry
        .register_fn(
            "Nobody",
            1,
            |_, _| false,
            |_, _| async { Ok(ProviderReply::ok("unused")) },
        )
        .unwrap();
    let router = settings.build_router(registry);

    assert!(router.health().status_of("Nobody").is_some());
    let result = router
        .route("a recipe for soup", &RouteOptions::new())
        .await
        .unwrap();
    assert_eq!(result.metadata.fallback_category.as_deref(), Some("cooking"));
    assert_eq!(result.confidence, 0.2);
}

#[tokio::test]
async fn test_settings_express_list_orders_plain_registry() {
    let mut settings = Settings::default();
    settings.routing.express_providers = vec!["B".into()];

    let registry = Arc::new(ProviderRegistry::new());
    for name in ["A", "B"] {
        registry
            .register_fn(
                name,
                50,
                |_, _| true,
                move |_, _| async move { Ok(ProviderReply::ok(format!("from {}", name))) },
            )
            .unwrap();
    }
    let router = settings.build_router(registry);
    assert_eq!(router.curated().express, vec!["B"]);

    let express = RouteOptions::new().with_hints(RoutingHints::default().with_mode(RouteMode::Express));
    let result = router.route("hello", &express).await.unwrap();
    assert_eq!(result.provider_name.as_deref(), Some("B"));

    let result = router.route("hello", &RouteOptions::new()).await.unwrap();
    assert_eq!(result.provider_name.as_deref(), Some("A"));
}
