//! Instance lifetimes.
//!
//! A singleton slot creates its instance on first use and hands the same
//! instance out afterwards; concurrent first uses are serialized so only one
//! instance is ever created. Transient and scoped slots create a fresh
//! instance every time.

use once_cell::sync::OnceCell;
use strata_common::error::Result;
use strata_common::types::Lifetime;

use crate::instance::Instance;

/// Holds the cached instance of one module, if its lifetime caches.
#[derive(Debug)]
pub struct InstanceSlot {
    lifetime: Lifetime,
    cached: OnceCell<Instance>,
}

impl InstanceSlot {
    /// Creates an empty slot for `lifetime`.
    #[must_use]
    pub const fn new(lifetime: Lifetime) -> Self {
        Self {
            lifetime,
            cached: OnceCell::new(),
        }
    }

    /// Lifetime the slot enforces.
    #[must_use]
    pub const fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Returns the cached instance, or runs `create`.
    ///
    /// A failed creation leaves a singleton slot empty, so the next call
    /// tries again.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `create`.
    pub fn get_or_create<F>(&self, create: F) -> Result<Instance>
    where
        F: FnOnce() -> Result<Instance>,
    {
        if self.lifetime.is_cached() {
            self.cached.get_or_try_init(create).cloned()
        } else {
            create()
        }
    }

    /// Returns whether a singleton instance has been created.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.cached.get().is_some()
    }
}
