//! Module providers.
//!
//! A provider owns everything needed to hand out one module: its contract
//! and implementation, a private pool holding the module's settings and
//! dependencies, the behaviors wrapped around it, and its lifetime slot.

use std::sync::Arc;

use strata_common::error::{Result, StrataError};
use strata_common::types::Lifetime;
use strata_compose::spec::ModuleSpecification;

use crate::behavior::BehaviorPipeline;
use crate::descriptor::{ContractType, ImplementationType};
use crate::injector::{construct, ServicePool};
use crate::instance::{downcast, Instance, TypeKey};
use crate::lifetime::InstanceSlot;
use crate::proxy::build_proxy;
use crate::shared::Logger;

/// Builds and hands out one module's proxied instances.
#[derive(Debug)]
pub struct ModuleProvider {
    specification: ModuleSpecification,
    contract: Arc<ContractType>,
    implementation: Arc<ImplementationType>,
    services: ServicePool,
    pipeline: Arc<BehaviorPipeline>,
    behavior_labels: Vec<String>,
    dependencies: Vec<Arc<ModuleProvider>>,
    slot: InstanceSlot,
    logger: Logger,
}

/// Parts assembled by the service builder.
#[derive(Debug)]
pub struct ProviderParts {
    /// The module declaration, with global behaviors merged in.
    pub specification: ModuleSpecification,
    /// Resolved contract.
    pub contract: Arc<ContractType>,
    /// Resolved implementation.
    pub implementation: Arc<ImplementationType>,
    /// Private pool: settings plus dependencies.
    pub services: ServicePool,
    /// Behaviors wrapped around every call.
    pub pipeline: BehaviorPipeline,
    /// Labels of the behaviors in the pipeline.
    pub behavior_labels: Vec<String>,
    /// Sub-providers of `Module`-sourced dependencies.
    pub dependencies: Vec<Arc<ModuleProvider>>,
    /// Logger scoped to this provider.
    pub logger: Logger,
}

impl ModuleProvider {
    /// Assembles a provider from resolved parts.
    #[must_use]
    pub fn new(parts: ProviderParts) -> Self {
        let slot = InstanceSlot::new(parts.specification.lifetime);
        Self {
            specification: parts.specification,
            contract: parts.contract,
            implementation: parts.implementation,
            services: parts.services,
            pipeline: Arc::new(parts.pipeline),
            behavior_labels: parts.behavior_labels,
            dependencies: parts.dependencies,
            slot,
            logger: parts.logger,
        }
    }

    /// Returns a proxied instance of the contract, honoring the lifetime.
    ///
    /// Singletons are created on first acquisition; every acquisition gets
    /// its own proxy around the cached instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the implementation cannot be constructed or the
    /// proxy cannot be built.
    pub fn acquire(&self) -> Result<Instance> {
        self.logger.debug(&format!(
            "acquiring {} ({})",
            self.contract.name(),
            self.implementation.name()
        ));
        let target = self.slot.get_or_create(|| self.create_instance())?;
        build_proxy(
            &self.contract,
            &self.implementation,
            &target,
            Arc::clone(&self.pipeline),
        )
    }

    /// Typed form of [`acquire`](Self::acquire).
    ///
    /// # Errors
    ///
    /// Returns an error if acquisition fails or `C` is not this provider's
    /// contract.
    pub fn acquire_as<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>> {
        let instance = self.acquire()?;
        downcast::<C>(&instance).ok_or_else(|| StrataError::Resolution {
            kind: "service",
            name: format!(
                "{} is provided as {}, not {}",
                self.contract.name(),
                self.contract.key(),
                TypeKey::of::<C>()
            ),
        })
    }

    fn create_instance(&self) -> Result<Instance> {
        self.logger.info(&format!(
            "creating {} for {}",
            self.implementation.name(),
            self.contract.name()
        ));
        construct(
            self.implementation.name(),
            self.implementation.constructors(),
            &self.services,
        )
    }

    /// Logical name of the module.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        self.specification.display_name()
    }

    /// The module declaration this provider was built from.
    #[must_use]
    pub const fn specification(&self) -> &ModuleSpecification {
        &self.specification
    }

    /// Provided contract.
    #[must_use]
    pub fn contract(&self) -> &ContractType {
        &self.contract
    }

    /// Implementation constructed for the contract.
    #[must_use]
    pub fn implementation(&self) -> &ImplementationType {
        &self.implementation
    }

    /// Declared lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.slot.lifetime()
    }

    /// Labels of the behaviors wrapped around every call.
    #[must_use]
    pub fn behavior_labels(&self) -> &[String] {
        &self.behavior_labels
    }

    /// Sub-providers of this module's `Module`-sourced dependencies.
    #[must_use]
    pub fn dependencies(&self) -> &[Arc<Self>] {
        &self.dependencies
    }

    /// The module's private pool.
    #[must_use]
    pub const fn services(&self) -> &ServicePool {
        &self.services
    }

    /// Returns whether a singleton instance has been created yet.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.slot.is_materialized()
    }

    /// Counts this provider plus all sub-providers beneath it.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        1 + self
            .dependencies
            .iter()
            .map(|d| d.provider_count())
            .sum::<usize>()
    }
}

type AcquireFn = dyn Fn() -> Result<Instance> + Send + Sync;

/// A registration handed to the composition root: contract name, lifetime,
/// and the factory producing proxied instances.
#[derive(Clone)]
pub struct Acquirer {
    contract: String,
    key: TypeKey,
    lifetime: Lifetime,
    factory: Arc<AcquireFn>,
}

impl Acquirer {
    /// Creates an acquirer backed by `provider`.
    #[must_use]
    pub fn for_provider(provider: &Arc<ModuleProvider>) -> Self {
        let source = Arc::clone(provider);
        Self {
            contract: provider.contract().name().to_string(),
            key: provider.contract().key(),
            lifetime: provider.lifetime(),
            factory: Arc::new(move || source.acquire()),
        }
    }

    /// Contract name.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Contract type key.
    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    /// Declared lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Produces a proxied instance.
    ///
    /// # Errors
    ///
    /// Propagates the provider's acquisition error.
    pub fn acquire(&self) -> Result<Instance> {
        (self.factory)()
    }
}

impl std::fmt::Debug for Acquirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Acquirer")
            .field("contract", &self.contract)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
