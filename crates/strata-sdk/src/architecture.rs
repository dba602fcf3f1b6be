//! Application composition from the `Architecture` manifest.
//!
//! Wraps `strata-compose`'s loader, validator, and graph together with the
//! runtime's service builder into a single entry point for hosts.

use strata_common::config::AmbientConfig;
use strata_common::error::Result;
use strata_common::types::Archetype;
use strata_compose::graph::{ModuleGraph, ROOT_CONTRACT};
use strata_compose::spec::{ArchitectureSpec, ModuleSpecification};
use strata_compose::{loader, policy, validator};
use strata_runtime::builder::ServiceBuilder;
use strata_runtime::descriptor::archetype_of;
use strata_runtime::registry::{non_empty, TypeRegistry};
use strata_runtime::shared::SharedServices;

use crate::composition::Composition;

/// Composes an application from a manifest, a type registry, and shared
/// services.
#[derive(Debug, Clone, Copy)]
pub struct AppArchitecture<'a> {
    registry: &'a TypeRegistry,
    shared: &'a SharedServices,
    config: &'a AmbientConfig,
}

impl<'a> AppArchitecture<'a> {
    /// Creates a composer over `registry`, `shared`, and `config`.
    #[must_use]
    pub const fn new(
        registry: &'a TypeRegistry,
        shared: &'a SharedServices,
        config: &'a AmbientConfig,
    ) -> Self {
        Self {
            registry,
            shared,
            config,
        }
    }

    /// Loads and statically validates the manifest, with global behaviors
    /// merged into every module.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the manifest is missing, empty, or
    /// malformed.
    pub fn load(&self) -> Result<ArchitectureSpec> {
        let mut architecture = loader::load_architecture(self.config)?;
        validator::validate(&architecture)?;
        merge_global_behaviors(&mut architecture);
        Ok(architecture)
    }

    /// Builds the module graph for the manifest without constructing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be loaded, a contract cannot be
    /// resolved, or an edge violates the archetype policy.
    pub fn plan(&self) -> Result<ModuleGraph> {
        self.plan_spec(&self.load()?)
    }

    /// Builds the module graph for an already loaded manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if a contract cannot be resolved or an edge violates
    /// the archetype policy.
    pub fn plan_spec(&self, architecture: &ArchitectureSpec) -> Result<ModuleGraph> {
        let graph = ModuleGraph::build(architecture, |module| {
            let contract = self
                .registry
                .resolve_contract(&module.contract, non_empty(&module.contract_library))?;
            Ok(archetype_of(&contract))
        })?;
        graph.validate()?;
        Ok(graph)
    }

    /// Loads the manifest and builds every module.
    ///
    /// # Errors
    ///
    /// Returns the first fatal composition error.
    pub fn compose(&self) -> Result<Composition> {
        let architecture = self.load()?;
        self.compose_spec(&architecture)
    }

    /// Builds every module of an already loaded manifest.
    ///
    /// Global behaviors are merged again here, so a manifest assembled in
    /// code gets the same treatment as one from [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns the first fatal composition error.
    pub fn compose_spec(&self, architecture: &ArchitectureSpec) -> Result<Composition> {
        tracing::info!(modules = architecture.modules.len(), "building application modules");
        let mut architecture = architecture.clone();
        merge_global_behaviors(&mut architecture);

        let builder = ServiceBuilder::new(self.registry, self.shared, self.config);
        let mut composition = Composition::new();
        for module in &architecture.modules {
            self.ensure_top_level(module)?;
            let provider = builder.build_service(module)?;
            composition.register(provider);
        }
        tracing::info!(
            modules = composition.module_count(),
            "application modules registered"
        );
        Ok(composition)
    }

    fn ensure_top_level(&self, module: &ModuleSpecification) -> Result<()> {
        let contract = self
            .registry
            .resolve_contract(&module.contract, non_empty(&module.contract_library))?;
        policy::ensure_valid_dependency(
            ROOT_CONTRACT,
            Some(Archetype::ApplicationContainer),
            contract.name(),
            archetype_of(&contract),
        )
        .inspect_err(|err| {
            tracing::error!(module = module.display_name(), error = %err, "invalid top-level module");
        })
    }
}

/// Merges the architecture-level behaviors into every top-level module and
/// pushes each module's global behaviors down its `Module`-sourced tree.
pub fn merge_global_behaviors(architecture: &mut ArchitectureSpec) {
    let globals = architecture.global_behaviors.clone();
    for module in &mut architecture.modules {
        module.add_global_behaviors(&globals);
        module.propagate_global_behaviors();
    }
}

/// Loads, validates, and composes the application in one call.
///
/// # Errors
///
/// Returns the first fatal composition error.
pub fn add_app_architecture(
    registry: &TypeRegistry,
    shared: &SharedServices,
    config: &AmbientConfig,
) -> Result<Composition> {
    AppArchitecture::new(registry, shared, config).compose()
}
