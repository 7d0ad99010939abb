use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("Provider '{provider}' is missing its {callback} callback")]
    MissingCallback {
        provider: String,
        callback: &'static str,
    },

    #[error("No providers are registered")]
    EmptyRegistry,

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("Routing cancelled by caller")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl RouterError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
