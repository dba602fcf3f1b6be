//! Domain primitive types used across the Strata workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StrataError;

/// Layering tag attached to a service contract.
///
/// The set is closed: every contract carries at most one archetype, and the
/// archetype decides which other kinds of module it may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Cross-cutting infrastructure (logging, clocks, caches).
    Utility,
    /// Encapsulates access to stored or remote resources.
    ResourceAccess,
    /// Calculations, transformations, validation.
    Engine,
    /// Orchestrates engines and resource access to fulfil use cases.
    Manager,
    /// Public face of the system.
    Client,
    /// The composition root. Never a dependency of anything.
    ApplicationContainer,
}

impl Archetype {
    /// Every archetype, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Utility,
        Self::ResourceAccess,
        Self::Engine,
        Self::Manager,
        Self::Client,
        Self::ApplicationContainer,
    ];

    /// Returns the archetype's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Utility => "Utility",
            Self::ResourceAccess => "ResourceAccess",
            Self::Engine => "Engine",
            Self::Manager => "Manager",
            Self::Client => "Client",
            Self::ApplicationContainer => "ApplicationContainer",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance lifetime of a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Lifetime {
    /// A new instance per acquisition.
    #[default]
    Transient,
    /// One instance per logical unit of work. Treated as transient by the runtime.
    Scoped,
    /// One lazily created instance for the life of the provider.
    Singleton,
}

impl Lifetime {
    /// Returns whether acquisitions share one cached instance.
    #[must_use]
    pub const fn is_cached(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

impl FromStr for Lifetime {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Transient" => Ok(Self::Transient),
            "Scoped" => Ok(Self::Scoped),
            "Singleton" => Ok(Self::Singleton),
            other => Err(StrataError::configuration(format!(
                "lifetime {other} is not supported"
            ))),
        }
    }
}

impl TryFrom<String> for Lifetime {
    type Error = StrataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "Transient"),
            Self::Scoped => write!(f, "Scoped"),
            Self::Singleton => write!(f, "Singleton"),
        }
    }
}

/// Where a module's implementation comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ImplementationSource {
    /// Built by the runtime as a full sub-module.
    #[default]
    Module,
    /// Taken as-is from the externally built shared services.
    Shared,
}

impl FromStr for ImplementationSource {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Module" => Ok(Self::Module),
            "Shared" => Ok(Self::Shared),
            other => Err(StrataError::configuration(format!(
                "implementation source {other} is not supported"
            ))),
        }
    }
}

impl TryFrom<String> for ImplementationSource {
    type Error = StrataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ImplementationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "Module"),
            Self::Shared => write!(f, "Shared"),
        }
    }
}

/// Returns the simple name of a possibly qualified type name.
///
/// Both `.` and `::` separators are recognized, so
/// `Apps.Engines.IEngine1` and `apps::engines::IEngine1` both yield `IEngine1`.
#[must_use]
pub fn simple_name(type_name: &str) -> &str {
    let tail = type_name.rsplit("::").next().unwrap_or(type_name);
    tail.rsplit('.').next().unwrap_or(tail)
}
