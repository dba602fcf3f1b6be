//! Interception proxies.
//!
//! A proxy implements the same contract as its target and routes every call
//! through a [`BehaviorPipeline`]: entry hooks, the real call, exit hooks.
//! Return values and faults pass through untouched.
//!
//! Contracts opt in with [`intercept_contract!`](crate::intercept_contract),
//! which implements the contract for [`Intercepted<dyn Contract>`] and
//! registers the trait object as a [`Contract`].
//!
//! ```ignore
//! pub trait IEngine1: Send + Sync {
//!     fn calc_sum(&self, numbers: Vec<i64>) -> i64;
//!     fn try_parse(&self, text: String) -> Result<i64, String>;
//! }
//!
//! strata_runtime::intercept_contract!(IEngine1 {
//!     invoke fn calc_sum(&self, numbers: Vec<i64>) -> i64;
//!     try_invoke fn try_parse(&self, text: String) -> Result<i64, String>;
//! });
//! ```
//!
//! Three call modes exist:
//!
//! - `invoke`: the return value is recorded as-is.
//! - `try_invoke`: an `Err` is recorded as the call's fault.
//! - `invoke_blocking`: the method returns an owned boxed future; the proxy
//!   drives it to completion before the exit hooks run and hands back an
//!   already-resolved future.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use strata_common::error::{Result, StrataError};

use crate::behavior::{BehaviorPipeline, MethodContext};
use crate::descriptor::{ContractType, ImplementationType};
use crate::instance::Instance;

/// A contract type that can be wrapped in an interception proxy.
///
/// Implemented for `dyn Trait` by [`intercept_contract!`](crate::intercept_contract).
pub trait Contract: Send + Sync + 'static {
    /// Wraps `target` so every call runs through `pipeline`.
    fn intercept(target: Arc<Self>, pipeline: Arc<BehaviorPipeline>) -> Arc<Self>;
}

/// Proxy around a contract implementation.
pub struct Intercepted<T: ?Sized> {
    target: Arc<T>,
    pipeline: Arc<BehaviorPipeline>,
}

impl<T: ?Sized + Send + Sync> Intercepted<T> {
    /// Wraps `target` with `pipeline`.
    #[must_use]
    pub const fn new(target: Arc<T>, pipeline: Arc<BehaviorPipeline>) -> Self {
        Self { target, pipeline }
    }

    /// Returns the wrapped implementation.
    #[must_use]
    pub const fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// Returns the behaviors applied to each call.
    #[must_use]
    pub fn pipeline(&self) -> &BehaviorPipeline {
        &self.pipeline
    }

    /// Routes a call whose return value is recorded as-is.
    pub fn invoke<R, F>(&self, method: &str, parameters: Vec<Value>, call: F) -> R
    where
        R: Serialize,
        F: FnOnce(&T) -> R,
    {
        self.run(method, parameters, call, |result, context| {
            context.return_value = Some(argument(result));
        })
    }

    /// Routes a fallible call, recording an `Err` as the call's fault.
    ///
    /// The error itself is returned to the caller unchanged.
    pub fn try_invoke<R, E, F>(
        &self,
        method: &str,
        parameters: Vec<Value>,
        call: F,
    ) -> std::result::Result<R, E>
    where
        R: Serialize,
        E: Display,
        F: FnOnce(&T) -> std::result::Result<R, E>,
    {
        self.run(method, parameters, call, |result, context| match result {
            Ok(value) => context.return_value = Some(argument(value)),
            Err(error) => context.fault = Some(error.to_string()),
        })
    }

    /// Routes a call returning a future, driving it to completion so exit
    /// hooks observe the settled value.
    pub fn invoke_blocking<Fut, F>(&self, method: &str, parameters: Vec<Value>, call: F) -> Fut::Output
    where
        Fut: Future,
        Fut::Output: Serialize,
        F: FnOnce(&T) -> Fut,
    {
        self.run(
            method,
            parameters,
            |target| futures::executor::block_on(call(target)),
            |result, context| context.return_value = Some(argument(result)),
        )
    }

    fn run<R>(
        &self,
        method: &str,
        parameters: Vec<Value>,
        call: impl FnOnce(&T) -> R,
        record: impl FnOnce(&R, &mut MethodContext),
    ) -> R {
        let mut context = MethodContext::new(method, parameters);
        tracing::trace!(method, call_id = %context.call_id, "intercepted call");
        self.pipeline.enter(&context);

        match panic::catch_unwind(AssertUnwindSafe(|| call(&*self.target))) {
            Ok(result) => {
                record(&result, &mut context);
                self.pipeline.exit(&context);
                result
            }
            Err(payload) => {
                context.fault = Some(panic_message(&*payload));
                self.pipeline.exit(&context);
                panic::resume_unwind(payload)
            }
        }
    }
}

/// Serializes one argument or return value for a [`MethodContext`].
///
/// Values that fail to serialize are recorded as `null`.
pub fn argument<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Wraps a freshly resolved instance in a proxy for `contract`.
///
/// # Errors
///
/// Returns [`StrataError::Proxy`] if `instance` does not hold the contract type.
pub fn build_proxy(
    contract: &ContractType,
    implementation: &ImplementationType,
    instance: &Instance,
    pipeline: Arc<BehaviorPipeline>,
) -> Result<Instance> {
    tracing::debug!(
        contract = contract.name(),
        implementation = implementation.name(),
        behaviors = pipeline.global_count(),
        "building interception proxy"
    );
    contract
        .intercept(instance, pipeline)
        .ok_or_else(|| StrataError::Proxy {
            contract: contract.name().to_string(),
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

/// Implements [`Contract`] for `dyn $contract` and the contract itself for
/// [`Intercepted<dyn $contract>`].
///
/// Each method is listed with its call mode (`invoke`, `try_invoke`, or
/// `invoke_blocking`). Arguments must implement `Serialize`, as must return
/// values (the `Ok` type for `try_invoke`, the future's output for
/// `invoke_blocking`).
#[macro_export]
macro_rules! intercept_contract {
    ($contract:ident {
        $($mode:ident fn $method:ident(&self $(, $arg:ident : $ty:ty)*) -> $ret:ty;)*
    }) => {
        impl $crate::proxy::Contract for dyn $contract {
            fn intercept(
                target: ::std::sync::Arc<Self>,
                pipeline: ::std::sync::Arc<$crate::behavior::BehaviorPipeline>,
            ) -> ::std::sync::Arc<Self> {
                ::std::sync::Arc::new($crate::proxy::Intercepted::new(target, pipeline))
            }
        }

        impl $contract for $crate::proxy::Intercepted<dyn $contract> {
            $(
                fn $method(&self $(, $arg: $ty)*) -> $ret {
                    let parameters = ::std::vec![$($crate::proxy::argument(&$arg)),*];
                    $crate::__intercepted_call!(
                        $mode,
                        self,
                        ::std::stringify!($method),
                        parameters,
                        move |target| target.$method($($arg),*)
                    )
                }
            )*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __intercepted_call {
    (invoke, $proxy:expr, $name:expr, $parameters:expr, $call:expr) => {
        $proxy.invoke($name, $parameters, $call)
    };
    (try_invoke, $proxy:expr, $name:expr, $parameters:expr, $call:expr) => {
        $proxy.try_invoke($name, $parameters, $call)
    };
    (invoke_blocking, $proxy:expr, $name:expr, $parameters:expr, $call:expr) => {
        ::std::boxed::Box::pin(::std::future::ready(
            $proxy.invoke_blocking($name, $parameters, $call),
        ))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{downcast, erase};
    use crate::testing::{Calculator, ICalculator, Journal, Recorder};

    fn proxied(events: &Journal) -> Arc<dyn ICalculator> {
        let pipeline = BehaviorPipeline::with_global(vec![Arc::new(Recorder::new("rec", events))]);
        let target: Arc<dyn ICalculator> = Arc::new(Calculator::default());
        <dyn ICalculator as Contract>::intercept(target, Arc::new(pipeline))
    }

    #[test]
    fn proxy_returns_target_value_and_runs_hooks() {
        let events = Recorder::events();
        let calc = proxied(&events);
        assert_eq!(calc.sum(vec![1, 2, 3]), 6);
        assert_eq!(Recorder::drain(&events), vec!["rec:enter:sum", "rec:exit:sum"]);
    }

    #[test]
    fn contexts_carry_arguments_and_return_value() {
        let events = Recorder::events();
        let calc = proxied(&events);
        let _ = calc.sum(vec![4, 5]);
        let contexts = Recorder::contexts(&events);
        let exit = contexts.last().expect("exit recorded");
        assert_eq!(exit.parameters, vec![serde_json::json!([4, 5])]);
        assert_eq!(exit.return_value, Some(Value::from(9)));
        assert!(exit.fault.is_none());
    }

    #[test]
    fn entry_and_exit_share_a_call_id() {
        let events = Recorder::events();
        let calc = proxied(&events);
        let _ = calc.sum(Vec::new());
        let contexts = Recorder::contexts(&events);
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].call_id, contexts[1].call_id);
    }

    #[test]
    fn errors_pass_through_and_are_recorded_as_faults() {
        let events = Recorder::events();
        let calc = proxied(&events);
        let err = calc.parse("seven".into()).unwrap_err();
        assert!(err.contains("seven"));
        let exit = Recorder::contexts(&events).pop().expect("exit recorded");
        assert_eq!(exit.fault.as_deref(), Some(err.as_str()));
        assert!(exit.return_value.is_none());
    }

    #[test]
    fn panics_run_exit_hooks_then_propagate() {
        let events = Recorder::events();
        let calc = proxied(&events);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| calc.explode()));
        assert!(outcome.is_err());
        let exit = Recorder::contexts(&events).pop().expect("exit recorded");
        assert_eq!(exit.fault.as_deref(), Some("boom"));
    }

    #[test]
    fn blocking_calls_settle_before_exit_hooks() {
        let events = Recorder::events();
        let calc = proxied(&events);
        let value = futures::executor::block_on(calc.double_later(21));
        assert_eq!(value, 42);
        let exit = Recorder::contexts(&events).pop().expect("exit recorded");
        assert_eq!(exit.return_value, Some(Value::from(42)));
    }

    #[test]
    fn intercept_of_foreign_instance_is_refused() {
        let contract = ContractType::untagged::<dyn ICalculator>("ICalculator");
        let instance = erase(Arc::new("not a calculator".to_string()));
        assert!(contract.intercept(&instance, Arc::new(BehaviorPipeline::new())).is_none());
    }

    #[test]
    fn erased_intercept_yields_a_working_proxy() {
        let contract = ContractType::untagged::<dyn ICalculator>("ICalculator");
        let target: Arc<dyn ICalculator> = Arc::new(Calculator::default());
        let proxy = contract
            .intercept(&erase(target), Arc::new(BehaviorPipeline::new()))
            .expect("proxy");
        let calc = downcast::<dyn ICalculator>(&proxy).expect("contract type");
        assert_eq!(calc.sum(vec![2, 2]), 4);
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&5_u8), "panic");
    }
}
