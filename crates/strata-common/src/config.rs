//! Ambient configuration for the Strata runtime.
//!
//! The ambient configuration is a single JSON document assembled from files,
//! environment variables, and local development settings. Values are
//! addressed with colon-separated paths (`Db:ConnectionString`); key lookup
//! is case-insensitive and numeric segments index into arrays.

use std::path::Path;

use serde_json::{Map, Value};

use crate::constants::{CONFIG_PATH_SEPARATOR, ENV_PATH_SEPARATOR};
use crate::error::{Result, StrataError};

/// Hierarchical key/value configuration shared by the host and the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientConfig {
    root: Value,
}

impl AmbientConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wraps an existing JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document root is not an object.
    pub fn from_value(root: Value) -> Result<Self> {
        if root.is_object() {
            Ok(Self { root })
        } else {
            Err(StrataError::configuration(
                "configuration root must be an object",
            ))
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or not an object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Parses a YAML configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or not a mapping.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::from_value(serde_yaml::from_str(text)?)
    }

    /// Loads a configuration file, choosing the format from its extension.
    ///
    /// `.yaml` and `.yml` files are parsed as YAML; anything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration file");
        let text = std::fs::read_to_string(path).map_err(|source| StrataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /// Deep-merges `other` into this configuration. Values in `other` win.
    pub fn merge(&mut self, other: Self) {
        merge_values(&mut self.root, other.root);
    }

    /// Overlays process environment variables that start with `prefix`.
    ///
    /// `APP_Db__ConnectionString` with prefix `APP_` becomes
    /// `Db:ConnectionString`. Values are stored as strings.
    #[must_use]
    pub fn with_env_overlay(mut self, prefix: &str) -> Self {
        self.apply_vars(std::env::vars(), prefix);
        self
    }

    /// Overlays `(name, value)` pairs using the environment variable naming rules.
    pub fn apply_vars<I>(&mut self, vars: I, prefix: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(stripped) = name.strip_prefix(prefix) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }
            let path = stripped.replace(ENV_PATH_SEPARATOR, &CONFIG_PATH_SEPARATOR.to_string());
            if let Err(error) = self.set(&path, Value::String(value)) {
                tracing::warn!(path = %path, %error, "environment value skipped");
            }
        }
    }

    /// Returns the scalar at `path` rendered as a string.
    ///
    /// Strings are returned verbatim, numbers and booleans are formatted.
    /// Objects, arrays, nulls, and missing paths yield `None`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<String> {
        match self.section(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns the raw value at `path`, if present.
    #[must_use]
    pub fn section(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in segments(path) {
            current = match current {
                Value::Object(map) => lookup(map, segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Sets the value at `path`, creating intermediate objects as needed.
    ///
    /// Scalars and arrays met along the path are replaced by sections.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `path` has no segments.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let parts: Vec<&str> = segments(path).collect();
        let Some((last, parents)) = parts.split_last() else {
            return Err(StrataError::configuration(format!(
                "cannot set empty configuration path '{path}'"
            )));
        };
        let mut current = &mut self.root;
        for segment in parents {
            current = child_object(current, segment)?;
        }
        let map = ensure_object(current)?;
        let key = existing_key(map, last).unwrap_or_else(|| (*last).to_string());
        let _ = map.insert(key, value.into());
        Ok(())
    }
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(CONFIG_PATH_SEPARATOR).filter(|s| !s.is_empty())
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn existing_key(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.keys().find(|k| k.eq_ignore_ascii_case(key)).cloned()
}

fn ensure_object(value: &mut Value) -> Result<&mut Map<String, Value>> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value
        .as_object_mut()
        .ok_or_else(|| StrataError::configuration("configuration section is not an object"))
}

fn child_object<'a>(value: &'a mut Value, segment: &str) -> Result<&'a mut Value> {
    let map = ensure_object(value)?;
    let key = existing_key(map, segment).unwrap_or_else(|| segment.to_string());
    Ok(map.entry(key).or_insert_with(|| Value::Object(Map::new())))
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                let existing = existing_key(target_map, &key).unwrap_or(key);
                match target_map.get_mut(&existing) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        let _ = target_map.insert(existing, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}
