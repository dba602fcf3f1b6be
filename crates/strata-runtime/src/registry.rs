//! Libraries and name-based type resolution.
//!
//! A [`Library`] is a named catalog of [`TypeDescriptor`]s. The
//! [`TypeRegistry`] holds libraries that are already loaded plus deferred
//! ones, which are materialized the first time a lookup names them.
//!
//! Resolution of a type name:
//!
//! 1. Search every loaded library for a type with that simple name.
//! 2. Otherwise load the hinted library and search it.
//! 3. If no library has the hinted name, retry with the file stem of the
//!    hint, matched case-insensitively.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use strata_common::constants::LIBRARY_FILE_EXTENSIONS;
use strata_common::error::{Result, StrataError};
use strata_common::types::simple_name;
use strata_compose::spec::ImplementationSpec;

use crate::descriptor::{
    BehaviorType, ContractType, ImplementationType, OptionsType, TypeDescriptor,
};

/// A named catalog of exported types.
#[derive(Debug, Clone, Default)]
pub struct Library {
    name: String,
    types: Vec<TypeDescriptor>,
}

impl Library {
    /// Creates an empty library.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Adds an exported type.
    #[must_use]
    pub fn export(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.types.push(descriptor.into());
        self
    }

    /// Library name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exported types, in registration order.
    #[must_use]
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Finds an exported type by simple name.
    #[must_use]
    pub fn find(&self, type_name: &str) -> Option<&TypeDescriptor> {
        let wanted = simple_name(type_name);
        self.types.iter().find(|t| t.name() == wanted)
    }

    /// Exported types implementing `contract`, in registration order.
    pub fn implementers<'a>(&'a self, contract: &'a str) -> impl Iterator<Item = &'a TypeDescriptor> {
        self.types.iter().filter(move |t| t.implements(contract))
    }
}

type Loader = Box<dyn Fn() -> Library + Send + Sync>;

struct LibrarySlot {
    name: String,
    loader: Option<Loader>,
    loaded: OnceCell<Arc<Library>>,
}

impl LibrarySlot {
    fn load(&self) -> Option<&Arc<Library>> {
        if let Some(library) = self.loaded.get() {
            return Some(library);
        }
        let loader = self.loader.as_ref()?;
        Some(self.loaded.get_or_init(|| {
            tracing::info!(library = %self.name, "loading library");
            Arc::new(loader())
        }))
    }
}

/// Registry of loaded and deferred libraries.
#[derive(Default)]
pub struct TypeRegistry {
    slots: Vec<LibrarySlot>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an already-loaded library.
    pub fn register(&mut self, library: Library) {
        let loaded = OnceCell::new();
        let name = library.name().to_string();
        let _ = loaded.set(Arc::new(library));
        self.slots.push(LibrarySlot {
            name,
            loader: None,
            loaded,
        });
    }

    /// Adds a library that is only built when a lookup names it.
    pub fn register_deferred<F>(&mut self, name: impl Into<String>, loader: F)
    where
        F: Fn() -> Library + Send + Sync + 'static,
    {
        self.slots.push(LibrarySlot {
            name: name.into(),
            loader: Some(Box::new(loader)),
            loaded: OnceCell::new(),
        });
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, library: Library) -> Self {
        self.register(library);
        self
    }

    /// Names of libraries currently loaded.
    #[must_use]
    pub fn loaded_libraries(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.loaded.get().is_some())
            .map(|slot| slot.name.as_str())
            .collect()
    }

    /// Loads the library named `name`, falling back to its file stem.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if no registered library matches.
    pub fn library(&self, name: &str) -> Result<Arc<Library>> {
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.name == name)
            .or_else(|| {
                let stem = library_stem(name);
                tracing::debug!(library = name, stem = %stem, "looking up library by file stem");
                self.slots
                    .iter()
                    .find(|slot| slot.name.eq_ignore_ascii_case(&stem))
            })
            .ok_or_else(|| StrataError::resolution("library", name))?;
        slot.load()
            .cloned()
            .ok_or_else(|| StrataError::resolution("library", name))
    }

    /// Resolves a type by name, loading the hinted library if needed.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if neither the loaded libraries nor the
    /// hinted library export the type.
    pub fn resolve(&self, type_name: &str, library_hint: Option<&str>) -> Result<TypeDescriptor> {
        let loaded = self.slots.iter().filter_map(|slot| slot.loaded.get());
        for library in loaded {
            if let Some(found) = library.find(type_name) {
                return Ok(found.clone());
            }
        }

        let Some(hint) = library_hint.filter(|h| !h.trim().is_empty()) else {
            return Err(StrataError::resolution("type", type_name));
        };
        self.library(hint)?
            .find(type_name)
            .cloned()
            .ok_or_else(|| StrataError::resolution("type", format!("{type_name} in {hint}")))
    }

    /// Resolves a contract type by name.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the name is unknown or is not a contract.
    pub fn resolve_contract(&self, name: &str, library_hint: Option<&str>) -> Result<Arc<ContractType>> {
        match self.resolve(name, library_hint)? {
            TypeDescriptor::Contract(contract) => Ok(contract),
            other => Err(wrong_kind("contract", &other)),
        }
    }

    /// Resolves a behavior type by name.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the name is unknown or is not a behavior.
    pub fn resolve_behavior(&self, name: &str, library_hint: Option<&str>) -> Result<Arc<BehaviorType>> {
        match self.resolve(name, library_hint)? {
            TypeDescriptor::Behavior(behavior) => Ok(behavior),
            other => Err(wrong_kind("behavior", &other)),
        }
    }

    /// Finds the first type in `library` implementing `contract`.
    ///
    /// When several types qualify, the first registered wins and a warning
    /// is logged.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the library is unknown or exports no
    /// implementation of the contract.
    pub fn resolve_contract_implementation(&self, contract: &str, library: &str) -> Result<TypeDescriptor> {
        let library = self.library(library)?;
        let mut candidates = library.implementers(contract);
        let first = candidates
            .next()
            .cloned()
            .ok_or_else(|| {
                StrataError::resolution("implementation", format!("{contract} in {}", library.name()))
            })?;
        let others = candidates.count();
        if others > 0 {
            tracing::warn!(
                contract,
                library = library.name(),
                chosen = first.name(),
                ignored = others,
                "several implementations found, using the first"
            );
        }
        Ok(first)
    }

    /// Resolves the implementation a module declares for `contract`.
    ///
    /// An explicit `Type` is resolved by name and must implement the
    /// contract. Otherwise the declared library is scanned; with no library
    /// declared, every loaded library is scanned in registration order.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if no matching implementation exists.
    pub fn resolve_implementation(
        &self,
        contract: &ContractType,
        spec: &ImplementationSpec,
    ) -> Result<Arc<ImplementationType>> {
        let hint = non_empty(&spec.library);
        let descriptor = match (&spec.type_name, hint) {
            (Some(type_name), _) => {
                let found = self.resolve(type_name, hint)?;
                if !found.implements(contract.name()) {
                    return Err(StrataError::resolution(
                        "implementation",
                        format!("{type_name} does not implement {}", contract.name()),
                    ));
                }
                found
            }
            (None, Some(library)) => self.resolve_contract_implementation(contract.name(), library)?,
            (None, None) => self
                .slots
                .iter()
                .filter_map(|slot| slot.loaded.get())
                .find_map(|library| library.implementers(contract.name()).next().cloned())
                .ok_or_else(|| StrataError::resolution("implementation", contract.name()))?,
        };
        match descriptor {
            TypeDescriptor::Implementation(implementation) => Ok(implementation),
            other => Err(wrong_kind("implementation", &other)),
        }
    }

    /// Finds the settings type exported by `library`.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the library exports none.
    pub fn resolve_options(&self, library: &str) -> Result<Arc<OptionsType>> {
        match self.resolve_contract_implementation(
            strata_common::constants::SERVICE_OPTIONS_CONTRACT,
            library,
        )? {
            TypeDescriptor::Options(options) => Ok(options),
            other => Err(wrong_kind("settings type", &other)),
        }
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("libraries", &self.slots.iter().map(|s| &s.name).collect::<Vec<_>>())
            .field("loaded", &self.loaded_libraries())
            .finish()
    }
}

/// Treats blank library names as absent.
#[must_use]
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn wrong_kind(expected: &'static str, found: &TypeDescriptor) -> StrataError {
    StrataError::resolution(
        expected,
        format!("{} ({})", found.name(), found.kind()),
    )
}

/// Reduces a library reference to its file stem: directories and a known
/// library extension are stripped.
fn library_stem(reference: &str) -> String {
    let file = reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference);
    let stem = file
        .rsplit_once('.')
        .filter(|(_, ext)| {
            LIBRARY_FILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .map_or(file, |(stem, _)| stem);
    stem.to_string()
}
