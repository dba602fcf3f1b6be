//! Bundled demo catalog: a calculator engine behind a service manager.
//!
//! The manager adds a fixed list of numbers through the engine, passing them
//! in an operation request. Its settings type shows literal, string-typed
//! numeric, and `EXT:` indirected values.

use std::sync::Arc;

use serde::Deserialize;
use strata_common::types::Archetype;
use strata_runtime::descriptor::{ContractType, ImplementationType, OptionsType};
use strata_runtime::injector::Parameter;
use strata_runtime::operation::{OperationRequest, OperationResponse, ServiceError};
use strata_runtime::registry::{Library, TypeRegistry};
use strata_runtime::shared::{LogFactory, SharedServices};
use strata_sdk::intercept_contract;

/// Adds numbers.
pub trait IEngine1: Send + Sync {
    /// Sum of the request's numbers; errors when there are none or the sum
    /// overflows.
    fn calc_sum(&self, request: OperationRequest<Vec<i64>>) -> OperationResponse<i64>;
}

intercept_contract!(IEngine1 {
    invoke fn calc_sum(&self, request: OperationRequest<Vec<i64>>) -> OperationResponse<i64>;
});

/// The demo use case.
pub trait ISvc1: Send + Sync {
    /// Runs the use case and returns its report line.
    fn do_something(&self) -> String;
}

intercept_contract!(ISvc1 {
    invoke fn do_something(&self) -> String;
});

struct CalcEngine;

const CALC_SUM_SITE: &str = "CalcEngine.calc_sum";

impl IEngine1 for CalcEngine {
    fn calc_sum(&self, request: OperationRequest<Vec<i64>>) -> OperationResponse<i64> {
        let numbers = request.payload.as_deref().unwrap_or_default();
        if numbers.is_empty() {
            let mut response = OperationResponse::new(&request, None);
            response.add_error(ServiceError::error(CALC_SUM_SITE, "Validation", "no numbers to add"));
            return response;
        }
        let sum = numbers.iter().try_fold(0_i64, |acc, n| acc.checked_add(*n));
        let mut response = OperationResponse::new(&request, sum);
        if sum.is_none() {
            response.add_error(ServiceError::error(CALC_SUM_SITE, "Overflow", "sum does not fit in 64 bits"));
        }
        response
    }
}

/// Settings read from the manager's `ServiceOptions` block.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service1Options {
    /// Free-form text option.
    #[serde(default)]
    pub string_option: String,
    /// Numeric option; accepts `"42"` as well as `42`.
    #[serde(default, deserialize_with = "strata_runtime::settings::lenient")]
    pub int_option: i64,
    /// Usually an `EXT:` reference into the ambient configuration.
    #[serde(default)]
    pub some_secret: String,
}

struct Service1 {
    engine: Arc<dyn IEngine1>,
    settings: Option<Arc<Service1Options>>,
}

impl ISvc1 for Service1 {
    fn do_something(&self) -> String {
        if let Some(settings) = &self.settings {
            tracing::debug!(
                string_option = %settings.string_option,
                int_option = settings.int_option,
                has_secret = !settings.some_secret.is_empty(),
                "service settings"
            );
        }
        let numbers = vec![1, 2, 3, 4, 5];
        let equation = numbers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+");
        let request = OperationRequest::new("Svc1", "CalcSum", Some(numbers));
        let response = self.engine.calc_sum(request);
        match response.payload {
            Some(sum) if response.is_successful() => format!("The sum of {equation} is {sum}."),
            _ => {
                let errors: Vec<String> = response.errors().iter().map(ToString::to_string).collect();
                format!("Could not add {equation}: {}", errors.join("; "))
            }
        }
    }
}

/// Registry holding the demo libraries and `Strata.Utilities`.
///
/// Implementation libraries are deferred, so they are only built when a
/// manifest names them.
pub fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new()
        .with(
            Library::new("Apps.Engines.Engine1.Abstractions")
                .export(ContractType::of::<dyn IEngine1>("IEngine1", Archetype::Engine)),
        )
        .with(
            Library::new("Apps.Managers.Svc1.Abstractions")
                .export(ContractType::of::<dyn ISvc1>("ISvc1", Archetype::Manager)),
        )
        .with(strata_sdk::utilities::library());

    registry.register_deferred("Apps.Engines.Engine1", || {
        Library::new("Apps.Engines.Engine1").export(
            ImplementationType::builder::<dyn IEngine1>("CalcEngine", "IEngine1")
                .constructor(Vec::new(), |_| Ok(Arc::new(CalcEngine) as Arc<dyn IEngine1>))
                .build(),
        )
    });
    registry.register_deferred("Managers.Svc1", || {
        Library::new("Managers.Svc1")
            .export(
                ImplementationType::builder::<dyn ISvc1>("Service1", "ISvc1")
                    .constructor(
                        vec![
                            Parameter::required::<dyn IEngine1>(),
                            Parameter::optional::<Service1Options>(),
                        ],
                        |args| {
                            Ok(Arc::new(Service1 {
                                engine: args.required::<dyn IEngine1>()?,
                                settings: args.optional::<Service1Options>()?,
                            }) as Arc<dyn ISvc1>)
                        },
                    )
                    .build(),
            )
            .export(OptionsType::of::<Service1Options>("Service1Options"))
    });
    registry
}

/// Shared services handed to every module: the log factory.
pub fn shared_services() -> SharedServices {
    SharedServices::with_log_factory(LogFactory::with_prefix("strata"))
}
