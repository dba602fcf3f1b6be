//! # strata-runtime
//!
//! Runtime half of the Strata composition model.
//!
//! Handles:
//! - **Registry**: Named libraries of contract, implementation, behavior,
//!   and settings registrations, resolved by logical name.
//! - **Injector**: Constructor selection against a pool of available services.
//! - **Lifetime**: Transient and singleton instance slots.
//! - **Behavior**: The before/after hook pipeline and per-call method context.
//! - **Operation**: Workload-tagged request and response envelopes.
//! - **Proxy**: `Intercepted<dyn Contract>` and the `intercept_contract!` macro.
//! - **Builder**: The depth-first walk producing one [`provider::ModuleProvider`]
//!   per declared module.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod behavior;
pub mod builder;
pub mod descriptor;
pub mod injector;
pub mod instance;
pub mod lifetime;
pub mod operation;
pub mod provider;
pub mod proxy;
pub mod registry;
pub mod settings;
pub mod shared;

#[cfg(test)]
pub(crate) mod testing;
