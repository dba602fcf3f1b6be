//! Operation behaviors and the hook pipeline that runs them.
//!
//! A behavior observes every call routed through an interception proxy: it
//! sees the method name and arguments before the call, and the return value
//! or fault after it. Behaviors never alter arguments or results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::{self, BoxFuture};
use serde_json::Value;
use uuid::Uuid;

/// Snapshot of one intercepted call.
#[derive(Debug, Clone)]
pub struct MethodContext {
    /// Unique identifier of this call, shared by its entry and exit hooks.
    pub call_id: Uuid,
    /// Name of the contract method being called.
    pub method_name: String,
    /// Arguments in declaration order, serialized.
    pub parameters: Vec<Value>,
    /// Serialized return value, set once the call has returned normally.
    pub return_value: Option<Value>,
    /// Fault description, set when the call failed or panicked.
    pub fault: Option<String>,
    /// Wall-clock time the call started.
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl MethodContext {
    /// Opens a context for a call to `method_name`.
    #[must_use]
    pub fn new(method_name: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            method_name: method_name.into(),
            parameters,
            return_value: None,
            fault: None,
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Time elapsed since the call started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns whether the call recorded a fault.
    #[must_use]
    pub const fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }
}

/// Hooks run around every intercepted call.
///
/// Every hook defaults to doing nothing, so a behavior only overrides the
/// side it cares about. A behavior whose work is asynchronous overrides the
/// `_async` hooks instead; the synchronous hooks block on them, since the
/// proxy boundary itself is synchronous.
pub trait OperationBehavior: Send + Sync {
    /// Receives the label `":{behavior} for {contract}:{implementation}"`
    /// once, right after construction.
    fn set_label(&mut self, label: String) {
        let _ = label;
    }

    /// Asynchronous form of [`on_method_entry`](Self::on_method_entry).
    fn on_method_entry_async<'a>(&'a self, context: &'a MethodContext) -> BoxFuture<'a, ()> {
        let _ = context;
        Box::pin(future::ready(()))
    }

    /// Asynchronous form of [`on_method_exit`](Self::on_method_exit).
    fn on_method_exit_async<'a>(&'a self, context: &'a MethodContext) -> BoxFuture<'a, ()> {
        let _ = context;
        Box::pin(future::ready(()))
    }

    /// Called before the target method runs.
    fn on_method_entry(&self, context: &MethodContext) {
        futures::executor::block_on(self.on_method_entry_async(context));
    }

    /// Called after the target method returns or faults.
    fn on_method_exit(&self, context: &MethodContext) {
        futures::executor::block_on(self.on_method_exit_async(context));
    }
}

/// Ordered behaviors attached to one proxy.
///
/// Entry hooks run global behaviors first, then behaviors scoped to the
/// called method. Exit hooks run in the reverse grouping.
#[derive(Default, Clone)]
pub struct BehaviorPipeline {
    global: Vec<Arc<dyn OperationBehavior>>,
    by_method: HashMap<String, Vec<Arc<dyn OperationBehavior>>>,
}

impl BehaviorPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline whose behaviors apply to every method.
    #[must_use]
    pub fn with_global(behaviors: Vec<Arc<dyn OperationBehavior>>) -> Self {
        Self {
            global: behaviors,
            by_method: HashMap::new(),
        }
    }

    /// Appends a behavior that applies to every method.
    pub fn add_global(&mut self, behavior: Arc<dyn OperationBehavior>) {
        self.global.push(behavior);
    }

    /// Appends a behavior that only applies to `method`.
    pub fn add_for_method(&mut self, method: impl Into<String>, behavior: Arc<dyn OperationBehavior>) {
        self.by_method.entry(method.into()).or_default().push(behavior);
    }

    /// Number of behaviors applied to every method.
    #[must_use]
    pub fn global_count(&self) -> usize {
        self.global.len()
    }

    /// Returns whether no behavior is registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.by_method.values().all(Vec::is_empty)
    }

    /// Runs the entry hooks for `context`.
    pub fn enter(&self, context: &MethodContext) {
        for behavior in &self.global {
            behavior.on_method_entry(context);
        }
        for behavior in self.scoped(&context.method_name) {
            behavior.on_method_entry(context);
        }
    }

    /// Runs the exit hooks for `context`.
    pub fn exit(&self, context: &MethodContext) {
        for behavior in self.scoped(&context.method_name) {
            behavior.on_method_exit(context);
        }
        for behavior in &self.global {
            behavior.on_method_exit(context);
        }
    }

    fn scoped(&self, method: &str) -> &[Arc<dyn OperationBehavior>] {
        self.by_method.get(method).map_or(&[], Vec::as_slice)
    }
}

impl std::fmt::Debug for BehaviorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorPipeline")
            .field("global", &self.global.len())
            .field("methods", &self.by_method.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[test]
    fn context_starts_without_outcome() {
        let context = MethodContext::new("calc_sum", vec![Value::from(1)]);
        assert_eq!(context.method_name, "calc_sum");
        assert!(context.return_value.is_none());
        assert!(!context.is_faulted());
    }

    #[test]
    fn entry_runs_global_then_scoped_and_exit_reverses() {
        let events = Recorder::events();
        let mut pipeline = BehaviorPipeline::new();
        pipeline.add_global(Arc::new(Recorder::new("global", &events)));
        pipeline.add_for_method("calc_sum", Arc::new(Recorder::new("scoped", &events)));

        let context = MethodContext::new("calc_sum", Vec::new());
        pipeline.enter(&context);
        pipeline.exit(&context);

        assert_eq!(
            Recorder::drain(&events),
            vec![
                "global:enter:calc_sum",
                "scoped:enter:calc_sum",
                "scoped:exit:calc_sum",
                "global:exit:calc_sum",
            ]
        );
    }

    #[test]
    fn scoped_behaviors_skip_other_methods() {
        let events = Recorder::events();
        let mut pipeline = BehaviorPipeline::new();
        pipeline.add_for_method("calc_sum", Arc::new(Recorder::new("scoped", &events)));

        let context = MethodContext::new("do_something", Vec::new());
        pipeline.enter(&context);
        pipeline.exit(&context);
        assert!(Recorder::drain(&events).is_empty());
    }

    #[test]
    fn global_behaviors_keep_declaration_order() {
        let events = Recorder::events();
        let pipeline = BehaviorPipeline::with_global(vec![
            Arc::new(Recorder::new("first", &events)),
            Arc::new(Recorder::new("second", &events)),
        ]);
        assert_eq!(pipeline.global_count(), 2);
        pipeline.enter(&MethodContext::new("m", Vec::new()));
        assert_eq!(Recorder::drain(&events), vec!["first:enter:m", "second:enter:m"]);
    }

    #[test]
    fn default_hooks_do_nothing() {
        struct Silent;
        impl OperationBehavior for Silent {}

        let mut silent = Silent;
        silent.set_label("ignored".into());
        let pipeline = BehaviorPipeline::with_global(vec![Arc::new(silent)]);
        assert!(!pipeline.is_empty());
        pipeline.enter(&MethodContext::new("m", Vec::new()));
    }

    #[test]
    fn async_hooks_run_through_the_synchronous_pipeline() {
        use std::sync::Mutex;

        struct Deferred {
            seen: Mutex<Vec<String>>,
        }

        impl OperationBehavior for Deferred {
            fn on_method_entry_async<'a>(&'a self, context: &'a MethodContext) -> BoxFuture<'a, ()> {
                Box::pin(async move {
                    self.seen.lock().unwrap().push(format!("enter {}", context.method_name));
                })
            }

            fn on_method_exit_async<'a>(&'a self, context: &'a MethodContext) -> BoxFuture<'a, ()> {
                Box::pin(async move {
                    self.seen.lock().unwrap().push(format!("exit {}", context.method_name));
                })
            }
        }

        let behavior = Arc::new(Deferred {
            seen: Mutex::new(Vec::new()),
        });
        let shared: Arc<dyn OperationBehavior> = behavior.clone();
        let pipeline = BehaviorPipeline::with_global(vec![shared]);
        let context = MethodContext::new("calc_sum", Vec::new());
        pipeline.enter(&context);
        pipeline.exit(&context);
        assert_eq!(
            *behavior.seen.lock().unwrap(),
            vec!["enter calc_sum".to_string(), "exit calc_sum".to_string()]
        );
    }
}
