use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::provider::{HttpMethod, ProviderError, ProviderSummary, ResolvedProvider};

/// Write-phase registry, filled during boot.
#[derive(Debug, Default)]
pub struct ProviderRegistryBuilder {
    providers: BTreeMap<String, Arc<ResolvedProvider>>,
}

impl ProviderRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor. A repeated name is rejected and leaves the
    /// builder untouched.
    pub fn add(&mut self, provider: impl Into<Arc<ResolvedProvider>>) -> Result<(), ProviderError> {
        let provider = provider.into();
        if self.providers.contains_key(&provider.name) {
            return Err(ProviderError::DuplicateProvider(provider.name.clone()));
        }
        tracing::debug!(
            "Registered provider '{}': {} {} / {} {}",
            provider.name,
            provider.auth.method,
            provider.auth.path,
            provider.callback.method,
            provider.callback.path
        );
        self.providers.insert(provider.name.clone(), provider);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Freeze the registry after checking that no two enabled routes share a
    /// method and path.
    pub fn build(self) -> Result<ProviderRegistry, ProviderError> {
        self.check_routes()?;

        Ok(ProviderRegistry {
            providers: self.providers,
        })
    }

    fn check_routes(&self) -> Result<(), ProviderError> {
        let mut claimed: HashMap<(HttpMethod, &str), &str> = HashMap::new();

        for provider in self.providers.values().filter(|p| !p.disabled) {
            for route in [&provider.auth, &provider.callback] {
                if let Some(first) = claimed.insert((route.method, route.path.as_str()), &provider.name)
                {
                    return Err(ProviderError::RouteCollision {
                        method: route.method,
                        path: route.path.clone(),
                        first: first.to_string(),
                        second: provider.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read-phase registry. Immutable once built, so it is shared without locks.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<ResolvedProvider>>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Result<Arc<ResolvedProvider>, ProviderError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }

    pub fn list(&self) -> impl Iterator<Item = &Arc<ResolvedProvider>> {
        self.providers.values()
    }

    /// Enabled providers, the ones that get routes installed.
    pub fn enabled(&self) -> impl Iterator<Item = &Arc<ResolvedProvider>> {
        self.providers.values().filter(|p| !p.disabled)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers that log a user in, sorted by name.
    pub fn login_providers(&self, include_disabled: bool) -> Vec<ProviderSummary> {
        self.summaries(false, include_disabled)
    }

    /// Providers that attach an identity to an existing account, sorted by name.
    pub fn link_providers(&self, include_disabled: bool) -> Vec<ProviderSummary> {
        self.summaries(true, include_disabled)
    }

    fn summaries(&self, link: bool, include_disabled: bool) -> Vec<ProviderSummary> {
        self.providers
            .values()
            .filter(|p| p.link == link && (include_disabled || !p.disabled))
            .map(|p| p.summary())
            .collect()
    }
}
