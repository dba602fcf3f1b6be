//! Shared services supplied by the host before composition.
//!
//! The host builds these once (a log factory at minimum) and every module
//! provider and behavior constructor can draw from them.

use std::sync::Arc;

use strata_common::error::{Result, StrataError};

use crate::injector::ServicePool;
use crate::instance::{Instance, TypeKey};

/// Creates category-scoped loggers backed by `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogFactory {
    prefix: Option<String>,
}

impl LogFactory {
    /// Creates a factory whose loggers use the bare category.
    #[must_use]
    pub const fn new() -> Self {
        Self { prefix: None }
    }

    /// Creates a factory prefixing every category with `prefix`.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Returns a logger for `category`.
    #[must_use]
    pub fn create_logger(&self, category: impl Into<String>) -> Logger {
        let category = category.into();
        Logger {
            category: match &self.prefix {
                Some(prefix) => format!("{prefix}.{category}"),
                None => category,
            },
        }
    }
}

/// A logger tagging every event with its category.
#[derive(Debug, Clone)]
pub struct Logger {
    category: String,
}

impl Logger {
    /// Category attached to every event.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Logs at debug level.
    pub fn debug(&self, message: &str) {
        tracing::debug!(category = %self.category, "{message}");
    }

    /// Logs at info level.
    pub fn info(&self, message: &str) {
        tracing::info!(category = %self.category, "{message}");
    }

    /// Logs at warn level.
    pub fn warn(&self, message: &str) {
        tracing::warn!(category = %self.category, "{message}");
    }

    /// Logs at error level.
    pub fn error(&self, message: &str) {
        tracing::error!(category = %self.category, "{message}");
    }
}

/// Services registered by the host, looked up by type.
#[derive(Debug, Clone, Default)]
pub struct SharedServices {
    pool: ServicePool,
}

impl SharedServices {
    /// Creates an empty set of shared services.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates shared services holding only `factory`.
    #[must_use]
    pub fn with_log_factory(factory: LogFactory) -> Self {
        Self::new().with(Arc::new(factory))
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<T: ?Sized + Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.insert(service);
        self
    }

    /// Registers a service under its own type.
    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.pool.insert(service);
    }

    /// Returns the log factory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the host registered none.
    pub fn log_factory(&self) -> Result<Arc<LogFactory>> {
        self.pool
            .get::<LogFactory>()?
            .ok_or_else(|| StrataError::configuration("no log factory registered as a shared service"))
    }

    /// Looks up the shared service registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if no such service is registered.
    pub fn resolve(&self, key: &TypeKey) -> Result<Instance> {
        self.pool
            .resolve(key)?
            .ok_or_else(|| StrataError::resolution("shared service", key.name()))
    }

    /// Pool used to construct behaviors.
    #[must_use]
    pub const fn pool(&self) -> &ServicePool {
        &self.pool
    }
}
