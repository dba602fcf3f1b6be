//! The composed application.

use std::sync::Arc;

use strata_common::error::{Result, StrataError};
use strata_runtime::instance::{downcast, Instance, TypeKey};
use strata_runtime::provider::{Acquirer, ModuleProvider};

/// Top-level module providers and the acquirers exposed for them.
///
/// When two top-level modules provide the same contract, the later one
/// replaces the earlier acquirer.
#[derive(Debug, Default)]
pub struct Composition {
    providers: Vec<Arc<ModuleProvider>>,
    acquirers: Vec<Acquirer>,
}

impl Composition {
    /// Creates an empty composition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level provider and exposes an acquirer for its contract.
    pub fn register(&mut self, provider: Arc<ModuleProvider>) {
        let acquirer = Acquirer::for_provider(&provider);
        tracing::info!(
            contract = acquirer.contract(),
            lifetime = %acquirer.lifetime(),
            "registering module"
        );
        if let Some(existing) = self.acquirers.iter_mut().find(|a| a.key() == acquirer.key()) {
            tracing::warn!(contract = acquirer.contract(), "contract registered twice, last one wins");
            *existing = acquirer;
        } else {
            self.acquirers.push(acquirer);
        }
        self.providers.push(provider);
    }

    /// Acquires a proxied instance of contract `C`.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if no top-level module provides `C`, or the
    /// provider's error if acquisition fails.
    pub fn acquire<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>> {
        let key = TypeKey::of::<C>();
        let acquirer = self
            .acquirers
            .iter()
            .find(|a| a.key() == key)
            .ok_or_else(|| StrataError::resolution("service", key.name()))?;
        let instance = acquirer.acquire()?;
        downcast::<C>(&instance).ok_or_else(|| StrataError::Proxy {
            contract: acquirer.contract().to_string(),
        })
    }

    /// Acquires an erased instance by contract name.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if no top-level module provides the
    /// contract, or the provider's error if acquisition fails.
    pub fn acquire_by_name(&self, contract: &str) -> Result<Instance> {
        self.acquirers
            .iter()
            .find(|a| a.contract() == contract)
            .ok_or_else(|| StrataError::resolution("service", contract))?
            .acquire()
    }

    /// Acquirers, one per distinct top-level contract.
    #[must_use]
    pub fn acquirers(&self) -> &[Acquirer] {
        &self.acquirers
    }

    /// Top-level providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Arc<ModuleProvider>] {
        &self.providers
    }

    /// The last top-level provider registered for `contract`.
    #[must_use]
    pub fn provider(&self, contract: &str) -> Option<&Arc<ModuleProvider>> {
        self.providers
            .iter()
            .rev()
            .find(|p| p.contract().name() == contract)
    }

    /// Number of providers built, nested ones included.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.providers.iter().map(|p| p.provider_count()).sum()
    }

    /// Releases every provider and cached singleton.
    pub fn dispose(self) {
        tracing::info!(modules = self.module_count(), "disposing composition");
        drop(self);
    }
}
