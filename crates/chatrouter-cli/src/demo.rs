//! Built-in demo providers so the CLI can route without any backend.

use async_trait::async_trait;
use chatrouter_core::provider::{ProbeReport, ProviderResult};
use chatrouter_core::{
    Provider, ProviderBuilder, ProviderRegistry, ProviderReply, RouteOptions, RouterError,
};
use serde_json::json;
use std::sync::Arc;

const SEARCH_TRIGGERS: &[&str] = &["search", "find", "look up", "lookup"];

/// Answers simple two-operand arithmetic such as `12 * 4`.
pub fn quick_answer() -> chatrouter_core::Result<Arc<dyn Provider>> {
    let provider = ProviderBuilder::new("QuickAnswer")
        .priority(70)
        .can_handle(|message, _| parse_arithmetic(message).is_some())
        .process(|message, _| async move {
            match parse_arithmetic(&message) {
                Some((lhs, op, rhs)) => match evaluate(lhs, op, rhs) {
                    Some(value) => Ok(ProviderReply::ok(format!("{lhs} {op} {rhs} = {value}"))
                        .with_confidence(1.0)
                        .with_method("arithmetic")),
                    None => Err(RouterError::provider("QuickAnswer", "division by zero")),
                },
                None => Ok(ProviderReply::declined()),
            }
        })
        .build()?;
    Ok(Arc::new(provider))
}

/// Pretends to search; handles messages that ask to find something.
pub fn search() -> chatrouter_core::Result<Arc<dyn Provider>> {
    let provider = ProviderBuilder::new("Search")
        .priority(40)
        .can_handle(|message, _| {
            let lower = message.to_lowercase();
            SEARCH_TRIGGERS.iter().any(|t| lower.contains(t))
        })
        .process(|message, _| async move {
            let query = message.trim().trim_end_matches('?');
            Ok(ProviderReply::ok(format!("Top result for \"{query}\": no live index is attached to the demo."))
                .with_confidence(55.0)
                .with_method("keyword-search")
                .with_metadata(json!({ "results": 0 })))
        })
        .build()?;
    Ok(Arc::new(provider))
}

/// Handles questions. Exposes a self-check for `chatrouter health`.
pub struct Semantic;

#[async_trait]
impl Provider for Semantic {
    fn name(&self) -> &str {
        "Semantic"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn can_handle(&self, message: &str, _options: &RouteOptions) -> bool {
        message.trim_end().ends_with('?')
    }

    async fn process(&self, message: &str, options: &RouteOptions) -> ProviderResult {
        let words = message.split_whitespace().count();
        let user = options.user_id.as_deref().unwrap_or("there");
        Ok(ProviderReply::ok(format!(
            "Good question, {user}. Your {words}-word question needs a real model to answer well."
        ))
        .with_confidence(72.0)
        .with_method("semantic"))
    }

    async fn health_check(&self) -> Option<Result<ProbeReport, RouterError>> {
        Some(Ok(ProbeReport::healthy().with_memory_mb(128.0)))
    }
}

/// Lowest-priority small talk for short messages.
pub fn conversation() -> chatrouter_core::Result<Arc<dyn Provider>> {
    let provider = ProviderBuilder::new("Conversation")
        .priority(10)
        .can_handle(|message, _| message.split_whitespace().count() <= 8)
        .process(|message, _| async move {
            Ok(ProviderReply::ok(format!("You said \"{}\". Tell me more.", message.trim()))
                .with_method("small-talk"))
        })
        .build()?;
    Ok(Arc::new(provider))
}

/// Register every demo provider into `registry`.
pub fn register_all(registry: &ProviderRegistry) -> chatrouter_core::Result<()> {
    registry.register(quick_answer()?)?;
    registry.register(Arc::new(Semantic))?;
    registry.register(search()?)?;
    registry.register(conversation()?)?;
    Ok(())
}

fn parse_arithmetic(message: &str) -> Option<(f64, char, f64)> {
    let trimmed = message.trim().trim_end_matches(['?', '=']).trim();
    let (idx, op) = trimmed
        .char_indices()
        .skip(1)
        .find(|(_, c)| matches!(c, '+' | '-' | '*' | '/'))?;
    let lhs = trimmed[..idx].trim().parse().ok()?;
    let rhs = trimmed[idx + op.len_utf8()..].trim().parse().ok()?;
    Some((lhs, op, rhs))
}

fn evaluate(lhs: f64, op: char, rhs: f64) -> Option<f64> {
    match op {
        '+' => Some(lhs + rhs),
        '-' => Some(lhs - rhs),
        '*' => Some(lhs * rhs),
        '/' if rhs != 0.0 => Some(lhs / rhs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arithmetic() {
        assert_eq!(parse_arithmetic("12 * 4"), Some((12.0, '*', 4.0)));
        assert_eq!(parse_arithmetic("-3 + 5 ="), Some((-3.0, '+', 5.0)));
        assert_eq!(parse_arithmetic("what is love"), None);
        assert_eq!(evaluate(1.0, '/', 0.0), None);
    }
}
