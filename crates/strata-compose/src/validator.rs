//! Static validation of an architecture manifest.
//!
//! Checks for an empty manifest, unnamed contracts, duplicate behavior names
//! and method-scoped globals before any module is resolved or built.

use std::collections::HashSet;

use strata_common::error::{Result, StrataError};

use crate::spec::{ArchitectureSpec, BehaviorSpec, ModuleSpecification};

/// Validates an architecture manifest for structural correctness.
///
/// # Checks performed
///
/// 1. At least one top-level module is declared.
/// 2. Every module, at any depth, names a contract.
/// 3. No module declares the same behavior name twice.
/// 4. No global behavior is declared twice.
/// 5. No global behavior is scoped to a single method.
///
/// # Errors
///
/// Returns a configuration error if any check fails.
pub fn validate(architecture: &ArchitectureSpec) -> Result<()> {
    tracing::info!("validating architecture manifest");
    check_modules_present(architecture)?;
    check_unique_behaviors(
        "global behaviors",
        architecture.global_behaviors.iter().map(|b| b.name.as_str()),
    )?;
    check_unscoped_globals("global behaviors", architecture.global_behaviors.iter())?;
    for module in &architecture.modules {
        check_module(module)?;
    }
    Ok(())
}

fn check_modules_present(architecture: &ArchitectureSpec) -> Result<()> {
    if architecture.modules.is_empty() {
        return Err(StrataError::configuration(
            "no modules found in configuration",
        ));
    }
    Ok(())
}

fn check_module(module: &ModuleSpecification) -> Result<()> {
    if module.contract.trim().is_empty() {
        return Err(StrataError::configuration(format!(
            "module \"{}\" does not name a contract",
            module.logical_name
        )));
    }
    check_unique_behaviors(
        module.display_name(),
        module.behaviors.iter().map(|b| b.name.as_str()),
    )?;
    check_unscoped_globals(
        module.display_name(),
        module.behaviors.iter().filter(|b| b.is_global),
    )?;
    for dependency in &module.dependencies {
        check_module(dependency)?;
    }
    Ok(())
}

fn check_unique_behaviors<'a>(
    owner: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(StrataError::configuration(format!(
                "duplicate behavior \"{name}\" declared on {owner}"
            )));
        }
    }
    Ok(())
}

fn check_unscoped_globals<'a>(
    owner: &str,
    globals: impl Iterator<Item = &'a BehaviorSpec>,
) -> Result<()> {
    for behavior in globals {
        if let Some(method) = &behavior.method {
            return Err(StrataError::configuration(format!(
                "global behavior \"{}\" on {owner} cannot be limited to method \"{method}\"",
                behavior.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn architecture(modules: Vec<ModuleSpecification>) -> ArchitectureSpec {
        ArchitectureSpec {
            modules,
            global_behaviors: Vec::new(),
        }
    }

    #[test]
    fn validate_empty_manifest_fails() {
        let err = validate(&ArchitectureSpec::default()).unwrap_err();
        assert!(err.to_string().contains("no modules"), "got: {err}");
    }

    #[test]
    fn validate_simple_manifest_succeeds() {
        let mut manager = ModuleSpecification::new("IOrderManager");
        manager.dependencies.push(ModuleSpecification::new("IPricingEngine"));
        assert!(validate(&architecture(vec![manager])).is_ok());
    }

    #[test]
    fn validate_nested_blank_contract_fails() {
        let mut manager = ModuleSpecification::new("IOrderManager");
        manager.dependencies.push(ModuleSpecification {
            logical_name: "pricing".into(),
            ..ModuleSpecification::default()
        });
        let err = validate(&architecture(vec![manager])).unwrap_err();
        assert!(err.to_string().contains("pricing"), "got: {err}");
    }

    #[test]
    fn validate_duplicate_module_behavior_fails() {
        let mut manager = ModuleSpecification::new("IOrderManager");
        manager.behaviors.push(BehaviorSpec::new("CallTimerBehavior", "Strata.Utilities"));
        manager.behaviors.push(BehaviorSpec::new("CallTimerBehavior", "Other"));
        let err = validate(&architecture(vec![manager])).unwrap_err();
        assert!(err.to_string().contains("duplicate behavior"), "got: {err}");
    }

    #[test]
    fn validate_duplicate_global_behavior_fails() {
        let mut spec = architecture(vec![ModuleSpecification::new("IOrderManager")]);
        spec.global_behaviors = vec![
            BehaviorSpec::new("AuditBehavior", "Audit"),
            BehaviorSpec::new("AuditBehavior", "Audit"),
        ];
        let err = validate(&spec).unwrap_err();
        assert!(err.to_string().contains("global behaviors"), "got: {err}");
    }

    #[test]
    fn validate_method_scoped_global_fails() {
        let mut manager = ModuleSpecification::new("IOrderManager");
        let mut audit = BehaviorSpec::new("AuditBehavior", "Audit").for_method("place");
        manager.behaviors.push(audit.clone());
        assert!(validate(&architecture(vec![manager.clone()])).is_ok());

        audit.is_global = true;
        manager.behaviors[0] = audit;
        let err = validate(&architecture(vec![manager])).unwrap_err();
        assert!(err.to_string().contains("method \"place\""), "got: {err}");
    }

    #[test]
    fn merged_globals_never_trip_the_duplicate_check() {
        let mut manager = ModuleSpecification::new("IOrderManager");
        manager.behaviors.push(BehaviorSpec::new("AuditBehavior", "Audit"));
        manager.add_global_behaviors(&[BehaviorSpec::new("AuditBehavior", "Audit")]);
        assert!(validate(&architecture(vec![manager])).is_ok());
    }
}
