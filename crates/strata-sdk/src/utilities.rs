//! Bundled utility behaviors.

use std::sync::Arc;

use serde_json::Value;
use strata_common::constants::UTILITIES_LIBRARY;
use strata_runtime::behavior::{MethodContext, OperationBehavior};
use strata_runtime::descriptor::BehaviorType;
use strata_runtime::injector::Parameter;
use strata_runtime::operation::{OperationResponse, RequestHeader};
use strata_runtime::registry::Library;
use strata_runtime::shared::{LogFactory, Logger};

/// Name under which [`CallTimerBehavior`] is registered.
pub const CALL_TIMER_BEHAVIOR: &str = "CallTimerBehavior";

/// Logs every call on entry with its arguments, and on exit with the
/// elapsed time and any fault.
///
/// Calls taking an [`OperationRequest`](strata_runtime::operation::OperationRequest)
/// are tagged with its workload. A returned
/// [`OperationResponse`] holding error-severity entries is logged as a warning.
#[derive(Debug)]
pub struct CallTimerBehavior {
    log_factory: Arc<LogFactory>,
    logger: Logger,
}

impl CallTimerBehavior {
    /// Creates a timer logging under the `CallTimer` category until labeled.
    #[must_use]
    pub fn new(log_factory: Arc<LogFactory>) -> Self {
        let logger = log_factory.create_logger("CallTimer");
        Self {
            log_factory,
            logger,
        }
    }

    /// Category the timer currently logs under.
    #[must_use]
    pub fn category(&self) -> &str {
        self.logger.category()
    }
}

impl OperationBehavior for CallTimerBehavior {
    fn set_label(&mut self, label: String) {
        self.logger = self.log_factory.create_logger(label);
    }

    fn on_method_entry(&self, context: &MethodContext) {
        self.logger.info(&format!(
            "Entering {}{} with parameters {}",
            context.method_name,
            workload(&context.parameters),
            render(&context.parameters)
        ));
    }

    fn on_method_exit(&self, context: &MethodContext) {
        let elapsed = context.elapsed().as_millis();
        let call = format!(
            "{}{} with parameters {} in {elapsed} ms",
            context.method_name,
            workload(&context.parameters),
            render(&context.parameters)
        );
        if let Some(fault) = &context.fault {
            self.logger.warn(&format!("Exiting {call}, faulted: {fault}"));
            return;
        }
        match context.return_value.as_ref().and_then(OperationResponse::<Value>::from_value) {
            Some(response) if response.has_errors() => {
                let errors: Vec<String> = response.errors().iter().map(ToString::to_string).collect();
                self.logger.warn(&format!(
                    "Exiting {call}, response errors: {}",
                    errors.join("; ")
                ));
            }
            _ => self.logger.info(&format!("Exiting {call}")),
        }
    }
}

/// ` for workload {name} ({id})` when an argument is an operation request.
fn workload(parameters: &[Value]) -> String {
    parameters
        .iter()
        .find_map(RequestHeader::from_value)
        .map_or_else(String::new, |header| {
            format!(" for workload {} ({})", header.workload_name, header.workload_id)
        })
}

fn render(parameters: &[Value]) -> String {
    Value::Array(parameters.to_vec()).to_string()
}

/// The `Strata.Utilities` library.
#[must_use]
pub fn library() -> Library {
    Library::new(UTILITIES_LIBRARY).export(BehaviorType::new(CALL_TIMER_BEHAVIOR).constructor(
        vec![Parameter::required::<LogFactory>()],
        |args| Ok(CallTimerBehavior::new(args.required::<LogFactory>()?)),
    ))
}
