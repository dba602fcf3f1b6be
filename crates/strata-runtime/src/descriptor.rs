//! Type descriptors: what a library tells the registry about each type it
//! exports.
//!
//! Four kinds of type exist. Contracts are trait objects tagged with an
//! archetype. Implementations provide a contract through one or more
//! constructors. Behaviors are operation hooks built by constructor
//! injection. Settings types are deserialized from a module's settings block.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use strata_common::constants::SERVICE_OPTIONS_CONTRACT;
use strata_common::error::{Result, StrataError};
use strata_common::types::{simple_name, Archetype};

use crate::behavior::{BehaviorPipeline, OperationBehavior};
use crate::injector::{Arguments, Constructor, Parameter};
use crate::instance::{downcast, erase, Instance, TypeKey};
use crate::proxy::Contract;

type InterceptFn = fn(&Instance, Arc<BehaviorPipeline>) -> Option<Instance>;
type PopulateFn = fn(Value) -> std::result::Result<Instance, serde_json::Error>;

/// A contract type: a trait object that modules provide and depend on.
#[derive(Clone)]
pub struct ContractType {
    name: String,
    archetype: Option<Archetype>,
    key: TypeKey,
    intercept: InterceptFn,
}

impl ContractType {
    /// Describes contract `C`, tagged with `archetype`.
    #[must_use]
    pub fn of<C: Contract + ?Sized>(name: impl Into<String>, archetype: Archetype) -> Self {
        Self::new::<C>(name.into(), Some(archetype))
    }

    /// Describes contract `C` without an archetype tag.
    ///
    /// Untagged contracts are rejected by the archetype policy on either side
    /// of a dependency edge.
    #[must_use]
    pub fn untagged<C: Contract + ?Sized>(name: impl Into<String>) -> Self {
        Self::new::<C>(name.into(), None)
    }

    fn new<C: Contract + ?Sized>(name: String, archetype: Option<Archetype>) -> Self {
        Self {
            name,
            archetype,
            key: TypeKey::of::<C>(),
            intercept: intercept_erased::<C>,
        }
    }

    /// Contract type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Archetype tag, if any.
    #[must_use]
    pub const fn archetype(&self) -> Option<Archetype> {
        self.archetype
    }

    /// Pool key under which instances of this contract are stored.
    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    /// Wraps an erased instance of this contract in an interception proxy.
    ///
    /// Returns `None` if `instance` does not hold this contract type.
    #[must_use]
    pub fn intercept(&self, instance: &Instance, pipeline: Arc<BehaviorPipeline>) -> Option<Instance> {
        (self.intercept)(instance, pipeline)
    }
}

/// Archetype of `contract`, if it is tagged with one.
#[must_use]
pub const fn archetype_of(contract: &ContractType) -> Option<Archetype> {
    contract.archetype
}

fn intercept_erased<C: Contract + ?Sized>(
    instance: &Instance,
    pipeline: Arc<BehaviorPipeline>,
) -> Option<Instance> {
    let target = downcast::<C>(instance)?;
    Some(erase(C::intercept(target, pipeline)))
}

impl std::fmt::Debug for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractType")
            .field("name", &self.name)
            .field("archetype", &self.archetype)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A concrete type providing a contract.
#[derive(Clone)]
pub struct ImplementationType {
    name: String,
    contract: String,
    contract_key: TypeKey,
    constructors: Vec<Constructor<Instance>>,
}

impl ImplementationType {
    /// Starts describing implementation `name` of contract `C`, registered
    /// under the contract name `contract`.
    #[must_use]
    pub fn builder<C: ?Sized + Send + Sync + 'static>(
        name: impl Into<String>,
        contract: impl Into<String>,
    ) -> ImplementationBuilder<C> {
        ImplementationBuilder {
            name: name.into(),
            contract: contract.into(),
            constructors: Vec::new(),
            _contract: PhantomData,
        }
    }

    /// Implementation type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simple name of the implemented contract.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Pool key of the implemented contract.
    #[must_use]
    pub const fn contract_key(&self) -> TypeKey {
        self.contract_key
    }

    /// Registered constructors, in registration order.
    #[must_use]
    pub fn constructors(&self) -> &[Constructor<Instance>] {
        &self.constructors
    }

    /// Returns whether this type implements the contract named `contract`.
    #[must_use]
    pub fn implements(&self, contract: &str) -> bool {
        self.contract == simple_name(contract)
    }
}

impl std::fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplementationType")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Builder for [`ImplementationType`], typed by the contract it provides.
pub struct ImplementationBuilder<C: ?Sized> {
    name: String,
    contract: String,
    constructors: Vec<Constructor<Instance>>,
    _contract: PhantomData<fn() -> Arc<C>>,
}

impl<C: ?Sized + Send + Sync + 'static> ImplementationBuilder<C> {
    /// Adds a constructor taking `parameters` and producing the contract.
    #[must_use]
    pub fn constructor<F>(mut self, parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<Arc<C>> + Send + Sync + 'static,
    {
        self.constructors
            .push(Constructor::new(parameters, move |args| build(args).map(erase)));
        self
    }

    /// Finishes the description.
    #[must_use]
    pub fn build(self) -> ImplementationType {
        ImplementationType {
            name: self.name,
            contract: simple_name(&self.contract).to_string(),
            contract_key: TypeKey::of::<C>(),
            constructors: self.constructors,
        }
    }
}

/// An operation behavior type.
#[derive(Clone)]
pub struct BehaviorType {
    name: String,
    constructors: Vec<Constructor<Box<dyn OperationBehavior>>>,
}

impl BehaviorType {
    /// Starts describing behavior `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
        }
    }

    /// Adds a constructor taking `parameters` from the shared services.
    #[must_use]
    pub fn constructor<B, F>(mut self, parameters: Vec<Parameter>, build: F) -> Self
    where
        B: OperationBehavior + 'static,
        F: Fn(&mut Arguments) -> Result<B> + Send + Sync + 'static,
    {
        self.constructors.push(Constructor::new(parameters, move |args| {
            build(args).map(|behavior| Box::new(behavior) as Box<dyn OperationBehavior>)
        }));
        self
    }

    /// Behavior type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered constructors, in registration order.
    #[must_use]
    pub fn constructors(&self) -> &[Constructor<Box<dyn OperationBehavior>>] {
        &self.constructors
    }
}

impl std::fmt::Debug for BehaviorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorType")
            .field("name", &self.name)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// A module settings type, deserialized from a `ServiceOptions` block.
#[derive(Clone)]
pub struct OptionsType {
    name: String,
    key: TypeKey,
    populate: PopulateFn,
}

impl OptionsType {
    /// Describes settings type `T`.
    #[must_use]
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            key: TypeKey::of::<T>(),
            populate: populate_erased::<T>,
        }
    }

    /// Settings type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pool key under which the populated settings are stored.
    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    /// Deserializes `settings` into an erased instance of this type.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the settings do not fit the type.
    pub fn populate(&self, settings: Value) -> Result<Instance> {
        (self.populate)(settings).map_err(|e| StrataError::Construction {
            type_name: self.name.clone(),
            message: e.to_string(),
        })
    }
}

fn populate_erased<T>(settings: Value) -> std::result::Result<Instance, serde_json::Error>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    serde_json::from_value::<T>(settings).map(|options| erase(Arc::new(options)))
}

impl std::fmt::Debug for OptionsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsType")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Any type a library exports.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A contract.
    Contract(Arc<ContractType>),
    /// A contract implementation.
    Implementation(Arc<ImplementationType>),
    /// An operation behavior.
    Behavior(Arc<BehaviorType>),
    /// A module settings type.
    Options(Arc<OptionsType>),
}

impl TypeDescriptor {
    /// Type name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Contract(t) => t.name(),
            Self::Implementation(t) => t.name(),
            Self::Behavior(t) => t.name(),
            Self::Options(t) => t.name(),
        }
    }

    /// Kind of type, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Contract(_) => "contract",
            Self::Implementation(_) => "implementation",
            Self::Behavior(_) => "behavior",
            Self::Options(_) => "settings type",
        }
    }

    /// Returns whether this type implements the contract named `contract`.
    ///
    /// Settings types implement the `IServiceOptions` pseudo-contract.
    #[must_use]
    pub fn implements(&self, contract: &str) -> bool {
        match self {
            Self::Implementation(t) => t.implements(contract),
            Self::Options(_) => simple_name(contract) == SERVICE_OPTIONS_CONTRACT,
            Self::Contract(_) | Self::Behavior(_) => false,
        }
    }
}

impl From<ContractType> for TypeDescriptor {
    fn from(value: ContractType) -> Self {
        Self::Contract(Arc::new(value))
    }
}

impl From<ImplementationType> for TypeDescriptor {
    fn from(value: ImplementationType) -> Self {
        Self::Implementation(Arc::new(value))
    }
}

impl From<BehaviorType> for TypeDescriptor {
    fn from(value: BehaviorType) -> Self {
        Self::Behavior(Arc::new(value))
    }
}

impl From<OptionsType> for TypeDescriptor {
    fn from(value: OptionsType) -> Self {
        Self::Options(Arc::new(value))
    }
}
