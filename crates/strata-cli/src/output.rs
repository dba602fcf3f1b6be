//! Formatted output helpers for CLI commands.
//!
//! Renders module graph nodes, behavior declarations, and durations
//! consistently across `plan` and `run`.

use std::time::Duration;

use strata_compose::graph::ModuleNode;
use strata_compose::spec::{BehaviorSpec, ModuleSpecification};

/// A horizontal rule `width` characters wide.
#[must_use]
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// One line describing a planned module.
#[must_use]
pub fn module_line(node: &ModuleNode) -> String {
    let archetype = node
        .archetype
        .map_or_else(|| "untagged".to_string(), |a| a.to_string());
    format!(
        "{} ({}) [{archetype}] {}, {}",
        node.path, node.contract, node.lifetime, node.source
    )
}

/// One line describing a declared behavior.
#[must_use]
pub fn behavior_line(behavior: &BehaviorSpec) -> String {
    let scope = match (&behavior.method, behavior.is_global) {
        (_, true) => ", global".to_string(),
        (Some(method), false) => format!(", on {method}"),
        (None, false) => String::new(),
    };
    if behavior.library.is_empty() {
        format!("{}{scope}", behavior.name)
    } else {
        format!("{} from {}{scope}", behavior.name, behavior.library)
    }
}

/// Finds the module at a slash-separated graph path such as `Svc1/Engine1`.
#[must_use]
pub fn find_module<'a>(modules: &'a [ModuleSpecification], path: &str) -> Option<&'a ModuleSpecification> {
    let mut segments = path.split('/');
    let first = segments.next()?;
    let mut current = modules.iter().find(|m| m.display_name() == first)?;
    for segment in segments {
        current = current
            .dependencies
            .iter()
            .find(|m| m.display_name() == segment)?;
    }
    Some(current)
}

/// Formats a duration as milliseconds below one second, seconds above.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
