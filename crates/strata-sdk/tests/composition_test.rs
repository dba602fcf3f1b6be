//! Integration tests for manifest-driven composition and interception.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use strata_common::config::AmbientConfig;
use strata_common::error::StrataError;
use strata_common::types::Archetype;
use strata_runtime::behavior::{MethodContext, OperationBehavior};
use strata_runtime::descriptor::{BehaviorType, ContractType, ImplementationType, OptionsType};
use strata_runtime::injector::Parameter;
use strata_runtime::registry::{Library, TypeRegistry};
use strata_runtime::shared::{LogFactory, SharedServices};
use strata_sdk::architecture::{add_app_architecture, AppArchitecture};
use strata_sdk::composition::Composition;
use strata_sdk::intercept_contract;
use strata_sdk::local_settings::load_local_settings;

// Contracts ------------------------------------------------------------------

pub trait IOrderManager: Send + Sync {
    fn place(&self, items: Vec<i64>) -> i64;
    fn cancel(&self, reason: String) -> Result<i64, String>;
    fn crash(&self);
    fn connection(&self) -> String;
    fn instance_id(&self) -> u64;
}

intercept_contract!(IOrderManager {
    invoke fn place(&self, items: Vec<i64>) -> i64;
    try_invoke fn cancel(&self, reason: String) -> Result<i64, String>;
    invoke fn crash(&self) -> ();
    invoke fn connection(&self) -> String;
    invoke fn instance_id(&self) -> u64;
});

pub trait IPricingEngine: Send + Sync {
    fn price(&self, items: Vec<i64>) -> i64;
    fn instance_id(&self) -> u64;
}

intercept_contract!(IPricingEngine {
    invoke fn price(&self, items: Vec<i64>) -> i64;
    invoke fn instance_id(&self) -> u64;
});

pub trait IOrderAccess: Send + Sync {
    fn connection(&self) -> String;
}

intercept_contract!(IOrderAccess {
    invoke fn connection(&self) -> String;
});

// Implementations ------------------------------------------------------------

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}

struct OrderManager {
    id: u64,
    pricing: Arc<dyn IPricingEngine>,
    access: Option<Arc<dyn IOrderAccess>>,
}

impl IOrderManager for OrderManager {
    fn place(&self, items: Vec<i64>) -> i64 {
        self.pricing.price(items)
    }

    fn cancel(&self, reason: String) -> Result<i64, String> {
        Err(format!("cannot cancel: {reason}"))
    }

    fn crash(&self) {
        panic!("manager crashed");
    }

    fn connection(&self) -> String {
        self.access
            .as_ref()
            .map_or_else(|| "none".to_string(), |a| a.connection())
    }

    fn instance_id(&self) -> u64 {
        self.id
    }
}

struct PricingEngine {
    id: u64,
    access: Option<Arc<dyn IOrderAccess>>,
}

impl IPricingEngine for PricingEngine {
    fn price(&self, items: Vec<i64>) -> i64 {
        if let Some(access) = &self.access {
            let _ = access.connection();
        }
        items.iter().sum()
    }

    fn instance_id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OrderAccessOptions {
    #[serde(default)]
    connection_string: String,
    #[serde(default, deserialize_with = "strata_runtime::settings::lenient")]
    pool_size: u32,
}

struct OrderAccess {
    options: Option<Arc<OrderAccessOptions>>,
}

impl IOrderAccess for OrderAccess {
    fn connection(&self) -> String {
        self.options.as_ref().map_or_else(String::new, |o| {
            format!("{} ({})", o.connection_string, o.pool_size)
        })
    }
}

// Behaviors ------------------------------------------------------------------

type Journal = Arc<Mutex<Vec<(String, MethodContext)>>>;

struct Recorder {
    label: String,
    journal: Journal,
}

impl OperationBehavior for Recorder {
    fn set_label(&mut self, label: String) {
        self.label = label;
    }

    fn on_method_entry(&self, context: &MethodContext) {
        let line = format!("{} enter {}", self.label, context.method_name);
        self.journal.lock().unwrap().push((line, context.clone()));
    }

    fn on_method_exit(&self, context: &MethodContext) {
        let line = format!("{} exit {}", self.label, context.method_name);
        self.journal.lock().unwrap().push((line, context.clone()));
    }
}

fn lines(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().iter().map(|(line, _)| line.clone()).collect()
}

// Catalog --------------------------------------------------------------------

fn registry(journal: &Journal) -> TypeRegistry {
    let contracts = Library::new("Orders.Contracts")
        .export(ContractType::of::<dyn IOrderManager>("IOrderManager", Archetype::Manager))
        .export(ContractType::of::<dyn IPricingEngine>("IPricingEngine", Archetype::Engine))
        .export(ContractType::of::<dyn IOrderAccess>(
            "IOrderAccess",
            Archetype::ResourceAccess,
        ));

    let behaviors = {
        let first = Arc::clone(journal);
        let second = Arc::clone(journal);
        Library::new("Test.Behaviors")
            .export(BehaviorType::new("Audit").constructor(
                vec![Parameter::required::<LogFactory>()],
                move |_| {
                    Ok(Recorder {
                        label: String::new(),
                        journal: Arc::clone(&first),
                    })
                },
            ))
            .export(BehaviorType::new("Trace").constructor(Vec::new(), move |_| {
                Ok(Recorder {
                    label: String::new(),
                    journal: Arc::clone(&second),
                })
            }))
    };

    let mut registry = TypeRegistry::new()
        .with(contracts)
        .with(behaviors)
        .with(strata_sdk::utilities::library());

    registry.register_deferred("Orders.Managers", || {
        Library::new("Orders.Managers").export(
            ImplementationType::builder::<dyn IOrderManager>("OrderManager", "IOrderManager")
                .constructor(vec![Parameter::required::<dyn IPricingEngine>()], |args| {
                    Ok(Arc::new(OrderManager {
                        id: next_id(),
                        pricing: args.required::<dyn IPricingEngine>()?,
                        access: None,
                    }) as Arc<dyn IOrderManager>)
                })
                .constructor(
                    vec![
                        Parameter::required::<dyn IPricingEngine>(),
                        Parameter::required::<dyn IOrderAccess>(),
                    ],
                    |args| {
                        Ok(Arc::new(OrderManager {
                            id: next_id(),
                            pricing: args.required::<dyn IPricingEngine>()?,
                            access: Some(args.required::<dyn IOrderAccess>()?),
                        }) as Arc<dyn IOrderManager>)
                    },
                )
                .build(),
        )
    });
    registry.register_deferred("Orders.Engines", || {
        Library::new("Orders.Engines").export(
            ImplementationType::builder::<dyn IPricingEngine>("PricingEngine", "IPricingEngine")
                .constructor(Vec::new(), |_| {
                    Ok(Arc::new(PricingEngine {
                        id: next_id(),
                        access: None,
                    }) as Arc<dyn IPricingEngine>)
                })
                .constructor(vec![Parameter::required::<dyn IOrderAccess>()], |args| {
                    Ok(Arc::new(PricingEngine {
                        id: next_id(),
                        access: Some(args.required::<dyn IOrderAccess>()?),
                    }) as Arc<dyn IPricingEngine>)
                })
                .build(),
        )
    });
    registry.register_deferred("Orders.Access", || {
        Library::new("Orders.Access")
            .export(
                ImplementationType::builder::<dyn IOrderAccess>("OrderAccess", "IOrderAccess")
                    .constructor(Vec::new(), |_| {
                        Ok(Arc::new(OrderAccess { options: None }) as Arc<dyn IOrderAccess>)
                    })
                    .constructor(vec![Parameter::required::<OrderAccessOptions>()], |args| {
                        Ok(Arc::new(OrderAccess {
                            options: Some(args.required::<OrderAccessOptions>()?),
                        }) as Arc<dyn IOrderAccess>)
                    })
                    .build(),
            )
            .export(OptionsType::of::<OrderAccessOptions>("OrderAccessOptions"))
    });
    registry
}

fn shared() -> SharedServices {
    SharedServices::with_log_factory(LogFactory::new())
}

fn compose(journal: &Journal, config: &AmbientConfig) -> Result<Composition, StrataError> {
    let registry = registry(journal);
    let shared = shared();
    AppArchitecture::new(&registry, &shared, config).compose()
}

fn config(text: &str) -> AmbientConfig {
    AmbientConfig::from_json_str(text).expect("valid json")
}

const LAYERED: &str = r#"{
    "Db": { "ConnectionString": "Server=orders;Database=main" },
    "Architecture": {
        "Modules": [
            {
                "LogicalName": "Orders",
                "Contract": "IOrderManager",
                "Lifetime": "Singleton",
                "Implementation": { "Source": "Module", "Assembly": "Orders.Managers" },
                "Dependencies": [
                    {
                        "Contract": "IPricingEngine",
                        "Implementation": { "Source": "Module", "Assembly": "Orders.Engines" }
                    },
                    {
                        "Contract": "IOrderAccess",
                        "Implementation": {
                            "Source": "Module",
                            "Assembly": "Orders.Access",
                            "ServiceOptions": {
                                "ConnectionString": "EXT:Db:ConnectionString",
                                "PoolSize": "EXT:Db:PoolSize"
                            }
                        }
                    }
                ]
            }
        ]
    }
}"#;

const THREE_TIER: &str = r#"{
    "Architecture": {
        "GlobalBehaviors": [ { "Name": "Audit", "AssemblyName": "Test.Behaviors" } ],
        "Modules": [
            {
                "LogicalName": "Orders",
                "Contract": "IOrderManager",
                "Implementation": { "Source": "Module", "Assembly": "Orders.Managers" },
                "Dependencies": [
                    {
                        "Contract": "IPricingEngine",
                        "Implementation": { "Source": "Module", "Assembly": "Orders.Engines" },
                        "Dependencies": [
                            {
                                "Contract": "IOrderAccess",
                                "Implementation": { "Source": "Module", "Assembly": "Orders.Access" }
                            }
                        ]
                    }
                ]
            }
        ]
    }
}"#;

// Tests ----------------------------------------------------------------------

#[test]
fn valid_graph_builds_one_provider_per_module() {
    let journal = Journal::default();
    let composition = compose(&journal, &config(LAYERED)).expect("should compose");
    assert_eq!(composition.acquirers().len(), 1);
    assert_eq!(composition.module_count(), 3);

    let orders = composition.provider("IOrderManager").expect("provider");
    let contracts: Vec<&str> = orders
        .dependencies()
        .iter()
        .map(|p| p.contract().name())
        .collect();
    assert_eq!(contracts, vec!["IPricingEngine", "IOrderAccess"]);

    let manager = composition.acquire::<dyn IOrderManager>().expect("acquire");
    assert_eq!(manager.place(vec![10, 20, 12]), 42);
}

#[test]
fn plan_orders_dependencies_first() {
    let journal = Journal::default();
    let registry = registry(&journal);
    let shared = shared();
    let config = config(LAYERED);
    let graph = AppArchitecture::new(&registry, &shared, &config)
        .plan()
        .expect("should plan");
    let order: Vec<&str> = graph
        .resolve_order()
        .expect("acyclic")
        .iter()
        .map(|n| n.contract.as_str())
        .collect();
    assert_eq!(order.last(), Some(&"IOrderManager"));
    assert_eq!(graph.module_count(), 3);
}

#[test]
fn resource_access_depending_on_manager_fails() {
    let manifest = r#"{ "Architecture": { "Modules": [ {
        "Contract": "IOrderManager",
        "Implementation": { "Assembly": "Orders.Managers" },
        "Dependencies": [ {
            "Contract": "IOrderAccess",
            "Implementation": { "Assembly": "Orders.Access" },
            "Dependencies": [ { "Contract": "IOrderManager" } ]
        } ]
    } ] } }"#;
    let journal = Journal::default();
    let err = compose(&journal, &config(manifest)).unwrap_err();
    assert!(
        matches!(
            err,
            StrataError::PolicyViolation {
                receiver_archetype: Some(Archetype::ResourceAccess),
                dependency_archetype: Some(Archetype::Manager),
                ..
            }
        ),
        "got: {err}"
    );
    assert_eq!(
        err.to_string(),
        "ResourceAccess modules like IOrderAccess may not depend on Manager modules such as IOrderManager"
    );
}

#[test]
fn engine_at_top_level_fails() {
    let manifest = r#"{ "Architecture": { "Modules": [ {
        "Contract": "IPricingEngine",
        "Implementation": { "Assembly": "Orders.Engines" }
    } ] } }"#;
    let journal = Journal::default();
    let err = compose(&journal, &config(manifest)).unwrap_err();
    assert!(err.to_string().contains("ApplicationContainer"), "got: {err}");
}

#[test]
fn singleton_is_shared_and_transient_is_fresh() {
    let journal = Journal::default();
    let composition = compose(&journal, &config(LAYERED)).expect("should compose");
    let a = composition.acquire::<dyn IOrderManager>().unwrap();
    let b = composition.acquire::<dyn IOrderManager>().unwrap();
    assert_eq!(a.instance_id(), b.instance_id());

    let transient = LAYERED.replace(r#""Lifetime": "Singleton""#, r#""Lifetime": "Transient""#);
    let composition = compose(&journal, &config(&transient)).expect("should compose");
    let a = composition.acquire::<dyn IOrderManager>().unwrap();
    let b = composition.acquire::<dyn IOrderManager>().unwrap();
    assert_ne!(a.instance_id(), b.instance_id());
}

#[test]
fn unknown_lifetime_is_a_configuration_error() {
    let manifest = LAYERED.replace(r#""Lifetime": "Singleton""#, r#""Lifetime": "PerRequest""#);
    let journal = Journal::default();
    let err = compose(&journal, &config(&manifest)).unwrap_err();
    assert!(matches!(err, StrataError::Configuration { .. }), "got: {err}");
    assert!(err.to_string().contains("PerRequest"), "got: {err}");
}

#[test]
fn global_behaviors_apply_once_at_every_depth() {
    let manifest = LAYERED.replace(
        r#""Architecture": {"#,
        r#""Architecture": {
            "GlobalBehaviors": [ { "Name": "Audit", "AssemblyName": "Test.Behaviors" } ],"#,
    );
    let manifest = manifest.replace(
        r#""LogicalName": "Orders","#,
        r#""LogicalName": "Orders",
           "Behaviors": [ { "Name": "Audit", "AssemblyName": "Test.Behaviors" } ],"#,
    );
    let journal = Journal::default();
    let composition = compose(&journal, &config(&manifest)).expect("should compose");
    let orders = composition.provider("IOrderManager").unwrap();

    let mut pending = vec![Arc::clone(orders)];
    let mut visited = 0;
    while let Some(provider) = pending.pop() {
        visited += 1;
        let behaviors = &provider.specification().behaviors;
        assert_eq!(behaviors.len(), 1, "{}", provider.logical_name());
        assert!(behaviors[0].is_global);
        assert_eq!(provider.behavior_labels().len(), 1);
        pending.extend(provider.dependencies().iter().cloned());
    }
    assert_eq!(visited, 3);
    assert_eq!(
        orders.behavior_labels(),
        [":Audit for IOrderManager:OrderManager"]
    );
}

#[test]
fn hooks_run_in_order_around_nested_calls() {
    let manifest = LAYERED.replace(
        r#""LogicalName": "Orders","#,
        r#""LogicalName": "Orders",
           "Behaviors": [
               { "Name": "Audit", "AssemblyName": "Test.Behaviors", "IsGlobal": true },
               { "Name": "Trace", "AssemblyName": "Test.Behaviors" }
           ],"#,
    );
    let journal = Journal::default();
    let composition = compose(&journal, &config(&manifest)).expect("should compose");
    let manager = composition.acquire::<dyn IOrderManager>().unwrap();
    assert_eq!(manager.place(vec![1, 2]), 3);

    assert_eq!(
        lines(&journal),
        vec![
            ":Audit for IOrderManager:OrderManager enter place",
            ":Trace for IOrderManager:OrderManager enter place",
            ":Audit for IPricingEngine:PricingEngine enter price",
            ":Audit for IPricingEngine:PricingEngine exit price",
            ":Audit for IOrderManager:OrderManager exit place",
            ":Trace for IOrderManager:OrderManager exit place",
        ]
    );
    let contexts = journal.lock().unwrap();
    let (_, exit) = contexts.last().unwrap();
    assert_eq!(exit.parameters, vec![serde_json::json!([1, 2])]);
    assert_eq!(exit.return_value, Some(serde_json::json!(3)));
}

#[test]
fn faults_pass_through_after_exit_hooks() {
    let manifest = LAYERED.replace(
        r#""LogicalName": "Orders","#,
        r#""LogicalName": "Orders",
           "Behaviors": [ { "Name": "Trace", "AssemblyName": "Test.Behaviors" } ],"#,
    );
    let journal = Journal::default();
    let composition = compose(&journal, &config(&manifest)).expect("should compose");
    let manager = composition.acquire::<dyn IOrderManager>().unwrap();

    let err = manager.cancel("late".into()).unwrap_err();
    assert_eq!(err, "cannot cancel: late");
    {
        let entries = journal.lock().unwrap();
        let (line, exit) = entries.last().unwrap();
        assert!(line.ends_with("exit cancel"));
        assert_eq!(exit.fault.as_deref(), Some("cannot cancel: late"));
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| manager.crash()));
    assert!(outcome.is_err());
    let entries = journal.lock().unwrap();
    let (line, exit) = entries.last().unwrap();
    assert!(line.ends_with("exit crash"));
    assert_eq!(exit.fault.as_deref(), Some("manager crashed"));
}

#[test]
fn external_settings_resolve_from_ambient_configuration() {
    let journal = Journal::default();
    let mut config = config(LAYERED);
    config.set("Db:PoolSize", "8").expect("set");
    let composition = compose(&journal, &config).expect("should compose");
    let manager = composition.acquire::<dyn IOrderManager>().unwrap();
    assert_eq!(manager.connection(), "Server=orders;Database=main (8)");
}

#[test]
fn missing_external_setting_leaves_the_default() {
    let journal = Journal::default();
    let composition = compose(&journal, &config(LAYERED)).expect("should compose");
    let manager = composition.acquire::<dyn IOrderManager>().unwrap();
    assert_eq!(manager.connection(), "Server=orders;Database=main (0)");
}

#[test]
fn local_settings_feed_external_references() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "# development overrides").unwrap();
    writeln!(file, "Db__PoolSize=4").unwrap();

    let journal = Journal::default();
    let mut config = config(LAYERED);
    let applied = load_local_settings(file.path(), true, false, &mut config).unwrap();
    assert_eq!(applied, 1);
    let composition = compose(&journal, &config).expect("should compose");
    let manager = composition.acquire::<dyn IOrderManager>().unwrap();
    assert!(manager.connection().ends_with("(4)"));
}

#[test]
fn empty_module_list_is_a_configuration_error() {
    let journal = Journal::default();
    let err = compose(&journal, &config(r#"{ "Architecture": { "Modules": [] } }"#)).unwrap_err();
    assert!(matches!(err, StrataError::Configuration { .. }), "got: {err}");
}

#[test]
fn unknown_behavior_is_skipped_not_fatal() {
    let manifest = LAYERED.replace(
        r#""LogicalName": "Orders","#,
        r#""LogicalName": "Orders",
           "Behaviors": [
               { "Name": "Ghost", "AssemblyName": "Nowhere" },
               { "Name": "CallTimerBehavior", "AssemblyName": "Strata.Utilities" }
           ],"#,
    );
    let journal = Journal::default();
    let composition = compose(&journal, &config(&manifest)).expect("should compose");
    let orders = composition.provider("IOrderManager").unwrap();
    assert_eq!(
        orders.behavior_labels(),
        [":CallTimerBehavior for IOrderManager:OrderManager"]
    );
}

#[test]
fn acquiring_an_unregistered_contract_fails() {
    let journal = Journal::default();
    let composition = compose(&journal, &config(LAYERED)).expect("should compose");
    let err = composition.acquire::<dyn IPricingEngine>().err().unwrap();
    assert!(matches!(err, StrataError::Resolution { kind: "service", .. }), "got: {err}");
    assert!(composition.acquire_by_name("IOrderManager").is_ok());
    composition.dispose();
}

#[test]
fn missing_log_factory_is_fatal() {
    let journal = Journal::default();
    let registry = registry(&journal);
    let shared = SharedServices::new();
    let config = config(LAYERED);
    let err = AppArchitecture::new(&registry, &shared, &config)
        .compose()
        .unwrap_err();
    assert!(err.to_string().contains("log factory"), "got: {err}");
}

#[test]
fn method_scoped_behavior_nests_inside_globals() {
    let manifest = LAYERED.replace(
        r#""LogicalName": "Orders","#,
        r#""LogicalName": "Orders",
           "Behaviors": [
               { "Name": "Audit", "AssemblyName": "Test.Behaviors", "IsGlobal": true },
               { "Name": "Trace", "AssemblyName": "Test.Behaviors", "Method": "place" }
           ],"#,
    );
    let journal = Journal::default();
    let composition = compose(&journal, &config(&manifest)).expect("should compose");
    let orders = composition.provider("IOrderManager").unwrap();
    assert_eq!(
        orders.behavior_labels(),
        [
            ":Audit for IOrderManager:OrderManager",
            ":Trace for IOrderManager:OrderManager on place",
        ]
    );
    let manager = composition.acquire::<dyn IOrderManager>().unwrap();

    assert_eq!(manager.place(vec![5]), 5);
    assert_eq!(
        lines(&journal),
        vec![
            ":Audit for IOrderManager:OrderManager enter place",
            ":Trace for IOrderManager:OrderManager enter place",
            ":Audit for IPricingEngine:PricingEngine enter price",
            ":Audit for IPricingEngine:PricingEngine exit price",
            ":Trace for IOrderManager:OrderManager exit place",
            ":Audit for IOrderManager:OrderManager exit place",
        ]
    );

    journal.lock().unwrap().clear();
    let _ = manager.connection();
    assert_eq!(
        lines(&journal),
        vec![
            ":Audit for IOrderManager:OrderManager enter connection",
            ":Audit for IOrderAccess:OrderAccess enter connection",
            ":Audit for IOrderAccess:OrderAccess exit connection",
            ":Audit for IOrderManager:OrderManager exit connection",
        ]
    );
}

#[test]
fn grandchild_runs_top_level_global_once() {
    let journal = Journal::default();
    let composition = compose(&journal, &config(THREE_TIER)).expect("should compose");
    let orders = composition.provider("IOrderManager").unwrap();
    let access = &orders.dependencies()[0].dependencies()[0];
    assert_eq!(access.contract().name(), "IOrderAccess");
    assert_eq!(access.behavior_labels(), [":Audit for IOrderAccess:OrderAccess"]);

    let manager = composition.acquire::<dyn IOrderManager>().unwrap();
    assert_eq!(manager.place(vec![3, 4]), 7);

    let recorded = lines(&journal);
    let grandchild_entries = recorded
        .iter()
        .filter(|line| line.as_str() == ":Audit for IOrderAccess:OrderAccess enter connection")
        .count();
    assert_eq!(grandchild_entries, 1);
    assert_eq!(
        recorded,
        vec![
            ":Audit for IOrderManager:OrderManager enter place",
            ":Audit for IPricingEngine:PricingEngine enter price",
            ":Audit for IOrderAccess:OrderAccess enter connection",
            ":Audit for IOrderAccess:OrderAccess exit connection",
            ":Audit for IPricingEngine:PricingEngine exit price",
            ":Audit for IOrderManager:OrderManager exit place",
        ]
    );
}

#[test]
fn plan_spec_reuses_a_loaded_manifest() {
    let journal = Journal::default();
    let registry = registry(&journal);
    let shared = shared();
    let loaded = config(THREE_TIER);
    let manifest = AppArchitecture::new(&registry, &shared, &loaded)
        .load()
        .expect("should load");

    let empty = AmbientConfig::new();
    let architecture = AppArchitecture::new(&registry, &shared, &empty);
    assert!(architecture.plan().is_err());
    let graph = architecture.plan_spec(&manifest).expect("should plan");
    assert_eq!(graph.module_count(), 3);
    let engine = graph.dependencies_of("Orders/IPricingEngine");
    assert_eq!(engine.len(), 1);
    assert_eq!(engine[0].contract, "IOrderAccess");
}

#[test]
fn add_app_architecture_composes_in_one_call() {
    let journal = Journal::default();
    let registry = registry(&journal);
    let shared = shared();
    let config = config(THREE_TIER);
    let composition = add_app_architecture(&registry, &shared, &config).expect("should compose");
    assert_eq!(composition.module_count(), 3);
}
