use crate::error::{Result, RouterError};
use crate::hints::RouteOptions;
use crate::provider::traits::{Provider, ProviderResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Capability predicate for closure-based providers.
pub type CanHandleFn = Arc<dyn Fn(&str, &RouteOptions) -> bool + Send + Sync>;

/// Processor for closure-based providers. Receives owned copies so the
/// returned future is `'static`.
pub type ProcessFn = Arc<
    dyn Fn(String, RouteOptions) -> Pin<Box<dyn Future<Output = ProviderResult> + Send>>
        + Send
        + Sync,
>;

/// A provider assembled from closures by [`ProviderBuilder`].
pub struct FnProvider {
    name: String,
    priority: i32,
    can_handle: CanHandleFn,
    process: ProcessFn,
}

#[async_trait::async_trait]
impl Provider for FnProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, message: &str, options: &RouteOptions) -> bool {
        (self.can_handle)(message, options)
    }

    async fn process(&self, message: &str, options: &RouteOptions) -> ProviderResult {
        (self.process)(message.to_string(), options.clone()).await
    }
}

/// Builds a [`FnProvider`]. Both callbacks are mandatory: `build` fails
/// instead of defaulting to "always handles".
pub struct ProviderBuilder {
    name: String,
    priority: i32,
    can_handle: Option<CanHandleFn>,
    process: Option<ProcessFn>,
}

impl ProviderBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            can_handle: None,
            process: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn can_handle<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &RouteOptions) -> bool + Send + Sync + 'static,
    {
        let f: CanHandleFn = Arc::new(f);
        self.can_handle = Some(f);
        self
    }

    pub fn process<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, RouteOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult> + Send + 'static,
    {
        let f: ProcessFn = Arc::new(
            move |message: String,
                  options: RouteOptions|
                  -> Pin<Box<dyn Future<Output = ProviderResult> + Send>> {
                Box::pin(f(message, options))
            },
        );
        self.process = Some(f);
        self
    }

    pub fn build(self) -> Result<FnProvider> {
        if self.name.trim().is_empty() {
            return Err(RouterError::Config("provider name must not be empty".into()));
        }
        let can_handle = self.can_handle.ok_or_else(|| RouterError::MissingCallback {
            provider: self.name.clone(),
            callback: "can_handle",
        })?;
        let process = self.process.ok_or_else(|| RouterError::MissingCallback {
            provider: self.name.clone(),
            callback: "process",
        })?;

        Ok(FnProvider {
            name: self.name,
            priority: self.priority,
            can_handle,
            process,
        })
    }
}
