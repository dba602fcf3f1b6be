//! Extraction of the `Architecture` manifest from the ambient configuration.

use serde_json::Value;
use strata_common::config::AmbientConfig;
use strata_common::constants::{ARCHITECTURE_SECTION, GLOBAL_BEHAVIORS_KEY, MODULES_KEY};
use strata_common::error::{Result, StrataError};

use crate::spec::{ArchitectureSpec, BehaviorSpec, ModuleSpecification};

/// Reads `Architecture:Modules` and `Architecture:GlobalBehaviors`.
///
/// # Errors
///
/// Returns a configuration error if no modules are declared, or if any
/// module or behavior entry is malformed.
pub fn load_architecture(config: &AmbientConfig) -> Result<ArchitectureSpec> {
    let modules_path = format!("{ARCHITECTURE_SECTION}:{MODULES_KEY}");
    let behaviors_path = format!("{ARCHITECTURE_SECTION}:{GLOBAL_BEHAVIORS_KEY}");

    let modules: Vec<ModuleSpecification> = match config.section(&modules_path) {
        Some(Value::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| StrataError::configuration(format!("malformed module entry: {e}")))?,
    };
    if modules.is_empty() {
        tracing::warn!("no modules found in configuration");
        return Err(StrataError::configuration(
            "no modules found in configuration",
        ));
    }

    let global_behaviors: Vec<BehaviorSpec> = match config.section(&behaviors_path) {
        Some(Value::Null) | None => Vec::new(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| StrataError::configuration(format!("malformed global behavior: {e}")))?,
    };

    tracing::info!(
        modules = modules.len(),
        global_behaviors = global_behaviors.len(),
        "architecture manifest loaded"
    );
    Ok(ArchitectureSpec {
        modules,
        global_behaviors,
    })
}
