//! Constructor injection.
//!
//! A type registers one or more [`Constructor`]s, each declaring the service
//! types it needs. [`construct`] tries them from the most parameters to the
//! fewest and runs the first one whose parameters can all be supplied from a
//! [`ServicePool`].

use std::collections::HashMap;
use std::sync::Arc;

use strata_common::error::{Result, StrataError};

use crate::instance::{downcast, erase, Instance, TypeKey};

/// One constructor parameter: the service type it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    key: TypeKey,
    optional: bool,
}

impl Parameter {
    /// A parameter that must be present for the constructor to be eligible.
    #[must_use]
    pub fn required<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            optional: false,
        }
    }

    /// A parameter passed as `None` when the pool does not hold it.
    #[must_use]
    pub fn optional<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            optional: true,
        }
    }

    /// Service type requested.
    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    /// Returns whether the parameter may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }
}

type BuildFn<O> = dyn Fn(&mut Arguments) -> Result<O> + Send + Sync;

/// A constructor: declared parameters plus the function consuming them.
pub struct Constructor<O> {
    parameters: Vec<Parameter>,
    build: Arc<BuildFn<O>>,
}

impl<O> Clone for Constructor<O> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            build: Arc::clone(&self.build),
        }
    }
}

impl<O> Constructor<O> {
    /// Creates a constructor that reads `parameters`, in order, from its
    /// [`Arguments`].
    pub fn new<F>(parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<O> + Send + Sync + 'static,
    {
        Self {
            parameters,
            build: Arc::new(build),
        }
    }

    /// Declared parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// Resolved arguments handed to a constructor, consumed in declaration order.
pub struct Arguments {
    target: String,
    values: std::vec::IntoIter<Option<Instance>>,
}

impl Arguments {
    fn new(target: &str, values: Vec<Option<Instance>>) -> Self {
        Self {
            target: target.to_string(),
            values: values.into_iter(),
        }
    }

    /// Takes the next argument, which must be present and of type `T`.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the argument list is exhausted, the
    /// value is missing, or it holds another type.
    pub fn required<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        self.optional::<T>()?
            .ok_or_else(|| self.failure(format!("missing required {}", TypeKey::of::<T>())))
    }

    /// Takes the next argument, which may be absent.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the argument list is exhausted or the
    /// value holds another type.
    pub fn optional<T: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Option<Arc<T>>> {
        match self.values.next() {
            Some(Some(instance)) => downcast::<T>(&instance)
                .map(Some)
                .ok_or_else(|| self.failure(format!("argument is not a {}", TypeKey::of::<T>()))),
            Some(None) => Ok(None),
            None => Err(self.failure("constructor read more arguments than it declared")),
        }
    }

    fn failure(&self, message: impl Into<String>) -> StrataError {
        StrataError::Construction {
            type_name: self.target.clone(),
            message: message.into(),
        }
    }
}

type FactoryFn = dyn Fn() -> Result<Instance> + Send + Sync;

/// One service available for injection.
#[derive(Clone)]
enum PoolEntry {
    /// A ready instance.
    Instance(Instance),
    /// A factory run on every lookup, typically a sub-provider's acquire.
    Factory(Arc<FactoryFn>),
}

/// Services available to constructors, keyed by service type.
#[derive(Clone, Default)]
pub struct ServicePool {
    entries: HashMap<TypeKey, PoolEntry>,
}

impl ServicePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a typed service. A later registration of the same type
    /// replaces the earlier one.
    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.insert_instance(TypeKey::of::<T>(), erase(value));
    }

    /// Registers an erased instance under `key`.
    pub fn insert_instance(&mut self, key: TypeKey, instance: Instance) {
        let _ = self.entries.insert(key, PoolEntry::Instance(instance));
    }

    /// Registers a factory invoked on every lookup of `key`.
    pub fn insert_factory<F>(&mut self, key: TypeKey, factory: F)
    where
        F: Fn() -> Result<Instance> + Send + Sync + 'static,
    {
        let _ = self.entries.insert(key, PoolEntry::Factory(Arc::new(factory)));
    }

    /// Returns whether a service is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up the service registered under `key`.
    ///
    /// # Errors
    ///
    /// Propagates the error of a failing factory.
    pub fn resolve(&self, key: &TypeKey) -> Result<Option<Instance>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(PoolEntry::Instance(instance)) => Ok(Some(Arc::clone(instance))),
            Some(PoolEntry::Factory(factory)) => factory().map(Some),
        }
    }

    /// Looks up a typed service.
    ///
    /// # Errors
    ///
    /// Propagates the error of a failing factory.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        Ok(self
            .resolve(&TypeKey::of::<T>())?
            .and_then(|instance| downcast::<T>(&instance)))
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no service is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ServicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

enum Candidate {
    Satisfied(Vec<Option<Instance>>),
    Unsatisfied(TypeKey),
}

/// Builds `target` with the richest constructor `pool` can satisfy.
///
/// Constructors are ordered by descending parameter count; ties keep
/// registration order. Optional parameters never disqualify a constructor.
///
/// # Errors
///
/// Returns a resolution error when no constructor can be satisfied, or the
/// error of the chosen constructor or of a failing pool factory.
pub fn construct<O>(target: &str, constructors: &[Constructor<O>], pool: &ServicePool) -> Result<O> {
    let mut ordered: Vec<&Constructor<O>> = constructors.iter().collect();
    ordered.sort_by(|a, b| b.parameters.len().cmp(&a.parameters.len()));

    let mut missing = Vec::new();
    for constructor in ordered {
        match collect_arguments(constructor, pool)? {
            Candidate::Satisfied(values) => {
                tracing::debug!(
                    target_type = target,
                    parameters = constructor.parameters.len(),
                    "constructor selected"
                );
                return (constructor.build)(&mut Arguments::new(target, values));
            }
            Candidate::Unsatisfied(key) => missing.push(key.name()),
        }
    }

    let detail = if missing.is_empty() {
        "no constructor registered".to_string()
    } else {
        format!("unsatisfied parameters: {}", missing.join(", "))
    };
    Err(StrataError::resolution(
        "constructor",
        format!("{target} ({detail})"),
    ))
}

fn collect_arguments<O>(constructor: &Constructor<O>, pool: &ServicePool) -> Result<Candidate> {
    if let Some(missing) = constructor
        .parameters
        .iter()
        .find(|p| !p.optional && !pool.contains(&p.key))
    {
        return Ok(Candidate::Unsatisfied(missing.key));
    }
    let mut values = Vec::with_capacity(constructor.parameters.len());
    for parameter in &constructor.parameters {
        values.push(pool.resolve(&parameter.key)?);
    }
    Ok(Candidate::Satisfied(values))
}
