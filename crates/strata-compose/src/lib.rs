//! # strata-compose
//!
//! Declarative side of the Strata runtime.
//!
//! Handles:
//! - **Spec**: The serde model of the `Architecture` manifest and the
//!   global-behavior merge rule.
//! - **Loader**: Extraction of the manifest from the ambient configuration.
//! - **Policy**: The archetype table deciding which module kinds may depend
//!   on which.
//! - **Graph**: A `petgraph` view of the declared module tree with edge
//!   validation and dependency-first ordering.
//! - **Validator**: Static checks over the manifest before anything is built.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod graph;
pub mod loader;
pub mod policy;
pub mod spec;
pub mod validator;
