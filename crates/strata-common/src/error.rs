//! Unified error types for the Strata workspace.
//!
//! Composition failures are fatal and surface through [`StrataError`].
//! Faults raised by a proxied call are never wrapped here: they pass through
//! the interception pipeline unchanged.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Archetype;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StrataError {
    /// The architecture manifest is missing, empty, or malformed.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A dependency edge violates the archetype policy.
    #[error(
        "{} modules like {receiver} may not depend on {} modules such as {dependency}",
        archetype_label(*receiver_archetype),
        archetype_label(*dependency_archetype)
    )]
    PolicyViolation {
        /// Contract name of the module declaring the dependency.
        receiver: String,
        /// Archetype of the receiving contract, if it has one.
        receiver_archetype: Option<Archetype>,
        /// Contract name of the declared dependency.
        dependency: String,
        /// Archetype of the dependency contract, if it has one.
        dependency_archetype: Option<Archetype>,
    },

    /// A named type, library, or implementation could not be found.
    #[error("{kind} could not be resolved: {name}")]
    Resolution {
        /// What was being resolved (type, library, implementation, service).
        kind: &'static str,
        /// The name that failed to resolve.
        name: String,
    },

    /// A behavior could not be resolved or constructed.
    ///
    /// Composition treats this as non-fatal: the behavior is skipped.
    #[error("behavior {behavior} could not be built: {message}")]
    BehaviorBuild {
        /// Declared behavior name.
        behavior: String,
        /// Why the behavior was skipped.
        message: String,
    },

    /// A constructor ran but did not yield a usable instance.
    #[error("could not construct {type_name}: {message}")]
    Construction {
        /// Implementation or behavior type being constructed.
        type_name: String,
        /// Description of the failure.
        message: String,
    },

    /// An interception proxy could not be built around an instance.
    #[error("could not create a proxy for {contract}")]
    Proxy {
        /// Contract the proxy was requested for.
        contract: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A YAML configuration document could not be parsed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl StrataError {
    /// Shorthand for a [`StrataError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a [`StrataError::Resolution`] error.
    pub fn resolution(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Resolution {
            kind,
            name: name.into(),
        }
    }
}

fn archetype_label(archetype: Option<Archetype>) -> &'static str {
    archetype.map_or("NonSystemComponent", Archetype::as_str)
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StrataError>;
