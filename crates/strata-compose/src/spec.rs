//! Declarative module specifications.
//!
//! Field names follow the PascalCase keys of the `Architecture` section, so
//! existing `appsettings.json` manifests deserialize unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strata_common::types::{ImplementationSource, Lifetime};

/// The full `Architecture` section: top-level modules plus global behaviors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ArchitectureSpec {
    /// Modules registered directly with the application container.
    #[serde(default)]
    pub modules: Vec<ModuleSpecification>,
    /// Behaviors applied to every module and propagated to their dependencies.
    #[serde(default)]
    pub global_behaviors: Vec<BehaviorSpec>,
}

/// One node in the declared module graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleSpecification {
    /// Human-readable module name.
    #[serde(default)]
    pub logical_name: String,
    /// Name of the contract type the module provides.
    pub contract: String,
    /// Library expected to export the contract type.
    #[serde(default, rename = "ContractAssembly", alias = "ContractLibrary")]
    pub contract_library: String,
    /// Instance lifetime. Defaults to transient.
    #[serde(default)]
    pub lifetime: Lifetime,
    /// Where and how the implementation is obtained.
    #[serde(default)]
    pub implementation: ImplementationSpec,
    /// Modules and shared services this module depends on, in order.
    #[serde(default)]
    pub dependencies: Vec<ModuleSpecification>,
    /// Behaviors wrapped around every call to this module, in order.
    #[serde(default)]
    pub behaviors: Vec<BehaviorSpec>,
}

/// How a module's implementation is located.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImplementationSpec {
    /// `Module` builds a sub-provider; `Shared` reuses a shared service.
    #[serde(default)]
    pub source: ImplementationSource,
    /// Library scanned for the implementation and its settings type.
    #[serde(default, rename = "Assembly", alias = "Library")]
    pub library: String,
    /// Explicit implementation type name. When absent the library is scanned
    /// for the type implementing the contract.
    #[serde(default, rename = "Type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Raw settings block used to populate the module's settings object.
    #[serde(
        default,
        rename = "ServiceOptions",
        alias = "Settings",
        skip_serializing_if = "Option::is_none"
    )]
    pub settings: Option<Map<String, Value>>,
}

impl ImplementationSpec {
    /// The declared settings block, unless it is absent or empty.
    #[must_use]
    pub fn settings_block(&self) -> Option<&Map<String, Value>> {
        self.settings.as_ref().filter(|s| !s.is_empty())
    }
}

/// A behavior declared on a module or at the architecture level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BehaviorSpec {
    /// Behavior type name.
    pub name: String,
    /// Library expected to export the behavior type.
    #[serde(default, rename = "AssemblyName", alias = "Library")]
    pub library: String,
    /// Whether the behavior propagates to the module's dependencies.
    #[serde(default)]
    pub is_global: bool,
    /// Restricts the behavior to one contract method. Unset means every method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl BehaviorSpec {
    /// Creates a module-local behavior declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            library: library.into(),
            is_global: false,
            method: None,
        }
    }

    /// Scopes the declaration to a single contract method.
    #[must_use]
    pub fn for_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

impl ModuleSpecification {
    /// Creates a module specification for `contract` with default settings.
    #[must_use]
    pub fn new(contract: impl Into<String>) -> Self {
        let contract = contract.into();
        Self {
            logical_name: contract.clone(),
            contract,
            ..Self::default()
        }
    }

    /// Name used in logs and graph output: the logical name, or the contract.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.logical_name.is_empty() {
            &self.contract
        } else {
            &self.logical_name
        }
    }

    /// Merges architecture-level behaviors into this module's own list.
    ///
    /// A behavior already declared by name is promoted to global instead of
    /// being added a second time; otherwise a global copy is appended.
    /// Global behaviors cover every method, so promotion drops any method
    /// scope.
    pub fn add_global_behaviors(&mut self, globals: &[BehaviorSpec]) {
        for global in globals {
            if let Some(existing) = self.behaviors.iter_mut().find(|b| b.name == global.name) {
                existing.is_global = true;
                existing.method = None;
            } else {
                self.behaviors.push(BehaviorSpec {
                    name: global.name.clone(),
                    library: global.library.clone(),
                    is_global: true,
                    method: None,
                });
            }
        }
    }

    /// Returns the behaviors marked global on this module.
    #[must_use]
    pub fn global_behaviors(&self) -> Vec<BehaviorSpec> {
        self.behaviors.iter().filter(|b| b.is_global).cloned().collect()
    }

    /// Pushes this module's global behaviors into every `Module`-sourced
    /// dependency, recursively, so nested modules carry them too.
    pub fn propagate_global_behaviors(&mut self) {
        let globals = self.global_behaviors();
        for dependency in &mut self.dependencies {
            if dependency.implementation.source != ImplementationSource::Module {
                continue;
            }
            dependency.add_global_behaviors(&globals);
            dependency.propagate_global_behaviors();
        }
    }

    /// Counts this module plus all modules beneath it.
    #[must_use]
    pub fn module_count(&self) -> usize {
        1 + self
            .dependencies
            .iter()
            .map(Self::module_count)
            .sum::<usize>()
    }
}
