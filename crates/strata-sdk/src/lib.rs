//! # strata-sdk
//!
//! Public SDK for composing an application with Strata.
//!
//! Provides the main entry points:
//! - [`AppArchitecture`](architecture::AppArchitecture): Loads the `Architecture`
//!   manifest, validates it, and builds one provider per module.
//! - [`Composition`](composition::Composition): The composed application, from
//!   which proxied contract instances are acquired.
//! - [`utilities::library`]: The bundled `Strata.Utilities` library holding
//!   [`CallTimerBehavior`](utilities::CallTimerBehavior).
//! - [`local_settings::load_local_settings`]: Development `KEY=VALUE` overrides.
//!
//! # Example
//!
//! ```rust,no_run
//! use strata_common::config::AmbientConfig;
//! use strata_runtime::registry::TypeRegistry;
//! use strata_runtime::shared::{LogFactory, SharedServices};
//! use strata_sdk::architecture::AppArchitecture;
//!
//! let config = AmbientConfig::from_file("appsettings.json".as_ref()).unwrap();
//! let registry = TypeRegistry::new().with(strata_sdk::utilities::library());
//! let shared = SharedServices::with_log_factory(LogFactory::new());
//! let composition = AppArchitecture::new(&registry, &shared, &config).compose().unwrap();
//! println!("{} modules composed", composition.module_count());
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod architecture;
pub mod composition;
pub mod local_settings;
pub mod utilities;

pub use strata_runtime::intercept_contract;
