//! Fixtures shared by the unit tests of this crate.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use strata_common::types::Archetype;

use crate::behavior::{MethodContext, OperationBehavior};
use crate::descriptor::{ContractType, ImplementationType, OptionsType};
use crate::injector::Parameter;
use crate::registry::Library;

pub type Journal = Arc<Mutex<Vec<(String, MethodContext)>>>;

/// Behavior appending `"{name}:{enter|exit}:{method}"` to a journal.
pub struct Recorder {
    name: String,
    journal: Journal,
}

impl Recorder {
    pub fn events() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: Arc::clone(journal),
        }
    }

    pub fn drain(journal: &Journal) -> Vec<String> {
        journal
            .lock()
            .unwrap()
            .drain(..)
            .map(|(line, _)| line)
            .collect()
    }

    pub fn contexts(journal: &Journal) -> Vec<MethodContext> {
        journal
            .lock()
            .unwrap()
            .iter()
            .map(|(_, context)| context.clone())
            .collect()
    }

    fn push(&self, phase: &str, context: &MethodContext) {
        let line = format!("{}:{phase}:{}", self.name, context.method_name);
        self.journal.lock().unwrap().push((line, context.clone()));
    }
}

impl OperationBehavior for Recorder {
    fn set_label(&mut self, label: String) {
        self.name = label;
    }

    fn on_method_entry(&self, context: &MethodContext) {
        self.push("enter", context);
    }

    fn on_method_exit(&self, context: &MethodContext) {
        self.push("exit", context);
    }
}

pub type Deferred<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub trait ICalculator: Send + Sync {
    fn sum(&self, numbers: Vec<i64>) -> i64;
    fn parse(&self, text: String) -> Result<i64, String>;
    fn explode(&self) -> ();
    fn double_later(&self, value: i64) -> Deferred<i64>;
    fn instance_id(&self) -> u64;
}

crate::intercept_contract!(ICalculator {
    invoke fn sum(&self, numbers: Vec<i64>) -> i64;
    try_invoke fn parse(&self, text: String) -> Result<i64, String>;
    invoke fn explode(&self) -> ();
    invoke_blocking fn double_later(&self, value: i64) -> Deferred<i64>;
    invoke fn instance_id(&self) -> u64;
});

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub max: i64,
}

pub struct Calculator {
    id: u64,
    limits: Option<Arc<Limits>>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Calculator {
    pub fn new(limits: Option<Arc<Limits>>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            limits,
        }
    }
}

impl ICalculator for Calculator {
    fn sum(&self, numbers: Vec<i64>) -> i64 {
        let total = numbers.iter().sum();
        match &self.limits {
            Some(limits) if limits.max > 0 => i64::min(total, limits.max),
            _ => total,
        }
    }

    fn parse(&self, text: String) -> Result<i64, String> {
        text.parse().map_err(|_| format!("{text} is not a number"))
    }

    fn explode(&self) {
        panic!("boom");
    }

    fn double_later(&self, value: i64) -> Deferred<i64> {
        Box::pin(async move { value * 2 })
    }

    fn instance_id(&self) -> u64 {
        self.id
    }
}

pub fn calculator_contract() -> ContractType {
    ContractType::of::<dyn ICalculator>("ICalculator", Archetype::Engine)
}

/// Library exporting `Calculator` and its `Limits` settings type.
pub fn calculator_library(name: &str) -> Library {
    Library::new(name)
        .export(
            ImplementationType::builder::<dyn ICalculator>("Calculator", "ICalculator")
                .constructor(Vec::new(), |_| {
                    Ok(Arc::new(Calculator::default()) as Arc<dyn ICalculator>)
                })
                .constructor(vec![Parameter::required::<Limits>()], |args| {
                    let limits = args.required::<Limits>()?;
                    Ok(Arc::new(Calculator::new(Some(limits))) as Arc<dyn ICalculator>)
                })
                .build(),
        )
        .export(OptionsType::of::<Limits>("Limits"))
}
