//! Layered-architecture dependency policy.
//!
//! Each archetype may only depend on the archetypes listed in its row of the
//! table below. Anything untagged is rejected on either side of an edge.
//!
//! | Receiver               | May depend on                     |
//! |------------------------|-----------------------------------|
//! | `ApplicationContainer` | Manager, Client, Utility          |
//! | `Client`               | Utility, Engine                   |
//! | `Manager`              | Utility, Engine, `ResourceAccess` |
//! | `Engine`               | Utility, `ResourceAccess`         |
//! | `ResourceAccess`       | Utility                           |
//! | `Utility`              | Utility                           |

use strata_common::error::{Result, StrataError};
use strata_common::types::Archetype;

/// Returns the archetypes `receiver` may declare dependencies on.
#[must_use]
pub const fn allowed_dependencies(receiver: Archetype) -> &'static [Archetype] {
    match receiver {
        Archetype::ApplicationContainer => {
            &[Archetype::Manager, Archetype::Client, Archetype::Utility]
        }
        Archetype::Client => &[Archetype::Utility, Archetype::Engine],
        Archetype::Manager => &[
            Archetype::Utility,
            Archetype::Engine,
            Archetype::ResourceAccess,
        ],
        Archetype::Engine => &[Archetype::Utility, Archetype::ResourceAccess],
        Archetype::ResourceAccess | Archetype::Utility => &[Archetype::Utility],
    }
}

/// Returns whether an edge from `receiver` to `dependency` is permitted.
#[must_use]
pub fn is_valid_dependency(receiver: Option<Archetype>, dependency: Option<Archetype>) -> bool {
    match (receiver, dependency) {
        (Some(receiver), Some(dependency)) => allowed_dependencies(receiver).contains(&dependency),
        _ => false,
    }
}

/// Checks an edge and reports a [`StrataError::PolicyViolation`] naming both ends.
///
/// # Errors
///
/// Returns an error if the edge is not permitted by the policy table.
pub fn ensure_valid_dependency(
    receiver: &str,
    receiver_archetype: Option<Archetype>,
    dependency: &str,
    dependency_archetype: Option<Archetype>,
) -> Result<()> {
    if is_valid_dependency(receiver_archetype, dependency_archetype) {
        return Ok(());
    }
    Err(StrataError::PolicyViolation {
        receiver: receiver.to_string(),
        receiver_archetype,
        dependency: dependency.to_string(),
        dependency_archetype,
    })
}
