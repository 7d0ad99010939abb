//! Deterministic canned responses for when no provider answers.
//!
//! Rules are tried in a fixed order: greeting, capability question, domain
//! keyword lists (in declaration order), generic catch-all. The first rule
//! with a matching keyword wins. Keywords match on word boundaries, so
//! "hi" does not fire on "this".

use serde::{Deserialize, Serialize};

const EMPTY_INPUT_RESPONSE: &str = "It looks like your message was empty. \
Type a question or a few words and I'll do my best to help.";

const GREETING_RESPONSE: &str = "Hello! I'm here and ready to help. \
What would you like to talk about?";

const CAPABILITY_RESPONSE: &str = "I can answer questions, hold a conversation, \
search for information and describe images. My specialised services are busy \
right now, so my answers may be brief, but ask away and I'll do my best.";

const DOMAIN_RESPONSE: &str = "I can tell you're asking about {category}. \
I couldn't reach a specialist for that topic just now, so please try again in a \
moment or rephrase your question.";

const GENERIC_RESPONSE: &str = "I received your message but couldn't produce a \
detailed answer right now. Could you rephrase it or add a little more detail?";

const GENERIC_CATEGORY_RESPONSE: &str = "I received your message about {category} \
but couldn't produce a detailed answer right now. Could you rephrase it or add a \
little more detail?";

const GREETING_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
    "howdy",
    "bonjour",
    "salut",
];

const CAPABILITY_KEYWORDS: &[&str] = &[
    "what can you do",
    "who are you",
    "what are you",
    "your capabilities",
    "how do you work",
    "help",
];

const BUILTIN_DOMAINS: &[(&str, &[&str])] = &[
    ("weather", &["weather", "forecast", "temperature", "rain", "snow"]),
    (
        "programming",
        &["code", "programming", "rust", "python", "javascript", "compile", "bug", "function"],
    ),
    ("images", &["image", "photo", "picture", "screenshot", "diagram"]),
    ("search", &["search", "find", "look up", "lookup"]),
    ("math", &["calculate", "math", "equation", "multiply", "divide"]),
];

/// Which rule produced a fallback answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackRule {
    EmptyInput,
    Greeting,
    Capability,
    Domain,
    Generic,
}

impl FallbackRule {
    pub fn name(&self) -> &str {
        match self {
            FallbackRule::EmptyInput => "empty_input",
            FallbackRule::Greeting => "greeting",
            FallbackRule::Capability => "capability",
            FallbackRule::Domain => "domain",
            FallbackRule::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackReply {
    pub rule: FallbackRule,
    /// Detected domain, or the caller's special category.
    pub category: Option<String>,
    pub text: String,
}

/// A named keyword list with an optional response template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRule {
    pub name: String,
    pub keywords: Vec<String>,
    pub template: Option<String>,
}

impl DomainRule {
    pub fn new(name: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(|k| normalize(&k)).collect(),
            template: None,
        }
    }

    /// `{category}` in the template is replaced with the topic.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FallbackResponder {
    domains: Vec<DomainRule>,
}

impl Default for FallbackResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackResponder {
    /// Responder with the built-in domain lists.
    pub fn new() -> Self {
        let domains = BUILTIN_DOMAINS
            .iter()
            .map(|(name, keywords)| {
                DomainRule::new(*name, keywords.iter().map(|k| k.to_string()).collect())
            })
            .collect();
        Self { domains }
    }

    /// Append a domain rule; it is tried after the existing ones.
    pub fn with_domain(mut self, rule: DomainRule) -> Self {
        self.domains.push(rule);
        self
    }

    pub fn domains(&self) -> &[DomainRule] {
        &self.domains
    }

    pub fn empty_input(&self) -> FallbackReply {
        FallbackReply {
            rule: FallbackRule::EmptyInput,
            category: None,
            text: EMPTY_INPUT_RESPONSE.to_string(),
        }
    }

    /// Pick the canned answer for `message`. Same input, same output.
    pub fn respond(&self, message: &str, special_category: Option<&str>) -> FallbackReply {
        let text = normalize(message);
        if text.is_empty() {
            return self.empty_input();
        }
        let special = special_category
            .map(str::trim)
            .filter(|c| !c.is_empty());

        if matches_any(&text, GREETING_KEYWORDS) {
            return FallbackReply {
                rule: FallbackRule::Greeting,
                category: None,
                text: GREETING_RESPONSE.to_string(),
            };
        }

        if matches_any(&text, CAPABILITY_KEYWORDS) {
            return FallbackReply {
                rule: FallbackRule::Capability,
                category: None,
                text: CAPABILITY_RESPONSE.to_string(),
            };
        }

        for domain in &self.domains {
            if matches_any(&text, &domain.keywords) {
                let topic = special.unwrap_or(&domain.name);
                let template = domain.template.as_deref().unwrap_or(DOMAIN_RESPONSE);
                tracing::debug!("Fallback matched domain '{}'", domain.name);
                return FallbackReply {
                    rule: FallbackRule::Domain,
                    category: Some(domain.name.clone()),
                    text: template.replace("{category}", topic),
                };
            }
        }

        match special {
            Some(category) => FallbackReply {
                rule: FallbackRule::Generic,
                category: Some(category.to_string()),
                text: GENERIC_CATEGORY_RESPONSE.replace("{category}", category),
            },
            None => FallbackReply {
                rule: FallbackRule::Generic,
                category: None,
                text: GENERIC_RESPONSE.to_string(),
            },
        }
    }
}

/// Lowercase, split on anything that is not a letter, digit or apostrophe,
/// and rejoin with single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn matches_any<S: AsRef<str>>(normalized: &str, keywords: &[S]) -> bool {
    let padded = format!(" {normalized} ");
    keywords.iter().any(|k| {
        let k = k.as_ref();
        !k.is_empty() && padded.contains(&format!(" {k} "))
    })
}
