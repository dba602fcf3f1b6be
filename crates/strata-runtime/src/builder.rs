//! Depth-first construction of module providers.
//!
//! For one module specification the builder resolves the contract and
//! implementation, populates the settings object, walks the dependencies
//! (validating each edge against the archetype policy and recursing into
//! `Module`-sourced ones), builds the declared behaviors, and assembles a
//! [`ModuleProvider`].

use std::sync::Arc;

use strata_common::config::AmbientConfig;
use strata_common::error::{Result, StrataError};
use strata_common::types::ImplementationSource;
use strata_compose::policy;
use strata_compose::spec::{BehaviorSpec, ModuleSpecification};

use crate::behavior::{BehaviorPipeline, OperationBehavior};
use crate::descriptor::{ContractType, ImplementationType};
use crate::injector::{construct, ServicePool};
use crate::provider::{ModuleProvider, ProviderParts};
use crate::registry::{non_empty, TypeRegistry};
use crate::settings;
use crate::shared::SharedServices;

/// Builds module providers from specifications.
#[derive(Debug, Clone, Copy)]
pub struct ServiceBuilder<'a> {
    registry: &'a TypeRegistry,
    shared: &'a SharedServices,
    config: &'a AmbientConfig,
}

impl<'a> ServiceBuilder<'a> {
    /// Creates a builder resolving types from `registry`, shared services
    /// from `shared`, and external settings from `config`.
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

    /// Builds the provider for `spec` and, recursively, its dependencies.
    ///
    /// # Errors
    ///
    /// Returns a resolution, policy, configuration, or construction error.
    /// Behaviors that fail to build are logged and skipped instead.
    pub fn build_service(&self, spec: &ModuleSpecification) -> Result<Arc<ModuleProvider>> {
        tracing::info!(
            module = spec.display_name(),
            contract = %spec.contract,
            lifetime = %spec.lifetime,
            "building module"
        );
        let log_factory = self.shared.log_factory()?;
        let contract = self
            .registry
            .resolve_contract(&spec.contract, non_empty(&spec.contract_library))?;
        let implementation = self
            .registry
            .resolve_implementation(&contract, &spec.implementation)?;
        if implementation.contract_key() != contract.key() {
            return Err(StrataError::Construction {
                type_name: implementation.name().to_string(),
                message: format!(
                    "registered as {} but the contract type is {}",
                    implementation.contract_key(),
                    contract.key()
                ),
            });
        }

        let mut services = ServicePool::new();
        self.configure_settings(spec, &mut services)?;
        let dependencies = self.configure_dependencies(spec, &contract, &mut services)?;
        let (pipeline, behavior_labels) = self.configure_behaviors(spec, &contract, &implementation);

        Ok(Arc::new(ModuleProvider::new(ProviderParts {
            specification: spec.clone(),
            logger: log_factory.create_logger(format!("ModuleProvider: {}", contract.name())),
            contract,
            implementation,
            services,
            pipeline,
            behavior_labels,
            dependencies,
        })))
    }

    fn configure_settings(&self, spec: &ModuleSpecification, services: &mut ServicePool) -> Result<()> {
        let Some(block) = spec.implementation.settings_block() else {
            return Ok(());
        };
        let library = non_empty(&spec.implementation.library).ok_or_else(|| {
            StrataError::configuration(format!(
                "module {} declares settings but no implementation library",
                spec.display_name()
            ))
        })?;
        let options = self.registry.resolve_options(library)?;
        let resolved = settings::resolve_external(block, self.config, spec.display_name());
        let instance = options.populate(serde_json::Value::Object(resolved))?;
        tracing::debug!(module = spec.display_name(), settings = options.name(), "settings populated");
        services.insert_instance(options.key(), instance);
        Ok(())
    }

    fn configure_dependencies(
        &self,
        spec: &ModuleSpecification,
        contract: &ContractType,
        services: &mut ServicePool,
    ) -> Result<Vec<Arc<ModuleProvider>>> {
        let globals = spec.global_behaviors();
        let mut providers = Vec::new();
        for dependency in &spec.dependencies {
            let dependency_contract = self
                .registry
                .resolve_contract(&dependency.contract, non_empty(&dependency.contract_library))?;
            policy::ensure_valid_dependency(
                contract.name(),
                contract.archetype(),
                dependency_contract.name(),
                dependency_contract.archetype(),
            )?;

            match dependency.implementation.source {
                ImplementationSource::Shared => {
                    let instance = self.shared.resolve(&dependency_contract.key())?;
                    services.insert_instance(dependency_contract.key(), instance);
                }
                ImplementationSource::Module => {
                    let mut dependency = dependency.clone();
                    dependency.add_global_behaviors(&globals);
                    let provider = self.build_service(&dependency)?;
                    let source = Arc::clone(&provider);
                    services.insert_factory(dependency_contract.key(), move || source.acquire());
                    providers.push(provider);
                }
            }
        }
        Ok(providers)
    }

    fn configure_behaviors(
        &self,
        spec: &ModuleSpecification,
        contract: &ContractType,
        implementation: &ImplementationType,
    ) -> (BehaviorPipeline, Vec<String>) {
        let mut pipeline = BehaviorPipeline::new();
        let mut labels = Vec::new();
        for declared in &spec.behaviors {
            match self.build_behavior(declared, contract, implementation) {
                Ok((behavior, label)) => match &declared.method {
                    Some(method) => {
                        pipeline.add_for_method(method.clone(), behavior);
                        labels.push(format!("{label} on {method}"));
                    }
                    None => {
                        pipeline.add_global(behavior);
                        labels.push(label);
                    }
                },
                Err(err) => tracing::warn!(
                    module = spec.display_name(),
                    behavior = %declared.name,
                    error = %err,
                    "skipping behavior"
                ),
            }
        }
        (pipeline, labels)
    }

    fn build_behavior(
        &self,
        declared: &BehaviorSpec,
        contract: &ContractType,
        implementation: &ImplementationType,
    ) -> Result<(Arc<dyn OperationBehavior>, String)> {
        let failed = |err: StrataError| StrataError::BehaviorBuild {
            behavior: declared.name.clone(),
            message: err.to_string(),
        };
        let behavior_type = self
            .registry
            .resolve_behavior(&declared.name, non_empty(&declared.library))
            .map_err(failed)?;
        let mut behavior = construct(
            behavior_type.name(),
            behavior_type.constructors(),
            self.shared.pool(),
        )
        .map_err(failed)?;
        let label = format!(
            ":{} for {}:{}",
            behavior_type.name(),
            contract.name(),
            implementation.name()
        );
        behavior.set_label(label.clone());
        Ok((Arc::from(behavior), label))
    }
}
