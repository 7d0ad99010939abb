use crate::constants::curated;
use crate::error::{Result, RouterError};
use crate::hints::{RouteMode, RouteOptions, RoutingHints};
use crate::provider::builder::ProviderBuilder;
use crate::provider::traits::{Provider, ProviderResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Fixed provider subsets promoted by the express and expert modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedSets {
    pub express: Vec<String>,
    pub expert: Vec<String>,
}

impl Default for CuratedSets {
    fn default() -> Self {
        Self {
            express: curated::EXPRESS.iter().map(|s| s.to_string()).collect(),
            expert: curated::EXPERT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CuratedSets {
    fn favoured(&self, mode: RouteMode) -> &[String] {
        match mode {
            RouteMode::Default => &[],
            RouteMode::Express => &self.express,
            RouteMode::Expert => &self.expert,
        }
    }
}

/// Holds every registered provider in registration order.
///
/// Reads take a cheap snapshot (`Arc` clone of the list); registration
/// builds a new list and swaps it in, so concurrent `active_providers`
/// calls never observe a half-updated registry.
pub struct ProviderRegistry {
    providers: RwLock<Arc<Vec<Arc<dyn Provider>>>>,
    curated: CuratedSets,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::with_curated(CuratedSets::default())
    }

    pub fn with_curated(curated: CuratedSets) -> Self {
        Self {
            providers: RwLock::new(Arc::new(Vec::new())),
            curated,
        }
    }

    pub fn curated(&self) -> &CuratedSets {
        &self.curated
    }

    /// Register a provider. Names are unique; a second registration under
    /// the same name is rejected rather than overwriting the first.
    pub fn register(&self, provider: Arc<dyn Provider>) -> Result<()> {
        let name = provider.name().to_string();
        let mut guard = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.iter().any(|p| p.name() == name) {
            return Err(RouterError::DuplicateProvider(name));
        }

        let mut next: Vec<Arc<dyn Provider>> = (**guard).clone();
        next.push(provider);
        *guard = Arc::new(next);

        tracing::info!("Registered provider '{}'", name);
        Ok(())
    }

    /// Register a closure-based provider.
    pub fn register_fn<C, F, Fut>(
        &self,
        name: impl Into<String>,
        priority: i32,
        can_handle: C,
        process: F,
    ) -> Result<()>
    where
        C: Fn(&str, &RouteOptions) -> bool + Send + Sync + 'static,
        F: Fn(String, RouteOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProviderResult> + Send + 'static,
    {
        let provider = ProviderBuilder::new(name)
            .priority(priority)
            .can_handle(can_handle)
            .process(process)
            .build()?;
        self.register(Arc::new(provider))
    }

    fn snapshot(&self) -> Arc<Vec<Arc<dyn Provider>>> {
        self.providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.snapshot().iter().find(|p| p.name() == name).cloned()
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.snapshot().iter().map(|p| p.name().to_string()).collect()
    }

    /// All providers in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Provider>> {
        (*self.snapshot()).clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Candidates for a request, in the order the router must try them.
    ///
    /// Filters by the preferred/skip hints, then sorts by descending
    /// priority. Within one priority the mode's curated subset goes first,
    /// and registration order breaks the remaining ties.
    pub fn active_providers(&self, hints: Option<&RoutingHints>) -> Vec<Arc<dyn Provider>> {
        self.active_providers_with(hints, &self.curated)
    }

    /// Like [`active_providers`](Self::active_providers), promoting from
    /// `curated` instead of the registry's own sets.
    pub fn active_providers_with(
        &self,
        hints: Option<&RoutingHints>,
        curated: &CuratedSets,
    ) -> Vec<Arc<dyn Provider>> {
        let snapshot = self.snapshot();
        let mode = hints.map(|h| h.mode).unwrap_or_default();
        let favoured = curated.favoured(mode);

        let mut candidates: Vec<Arc<dyn Provider>> = snapshot
            .iter()
            .filter(|p| hints.map_or(true, |h| h.admits(p.name())))
            .cloned()
            .collect();

        // sort_by_key is stable, so registration order survives ties.
        candidates.sort_by_key(|p| {
            let promoted = favoured.iter().any(|name| name == p.name());
            (std::cmp::Reverse(p.priority()), !promoted)
        });

        candidates
    }
}
