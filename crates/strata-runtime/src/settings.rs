//! Module settings: external-reference resolution and lenient scalars.
//!
//! A settings block value written as `"EXT:Some:Path"` is replaced by the
//! ambient configuration value at `Some:Path` before the block is
//! deserialized. A reference that resolves to nothing is dropped, leaving the
//! field to its serde default.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use strata_common::config::AmbientConfig;
use strata_common::constants::EXTERNAL_SETTING_PREFIX;

/// Replaces every `EXT:` reference in `settings` with the configured value.
///
/// Nested objects and arrays are resolved recursively; an unresolved array
/// element is dropped like an unresolved key. `owner` names the module in
/// warnings about unresolved references.
#[must_use]
pub fn resolve_external(settings: &Map<String, Value>, config: &AmbientConfig, owner: &str) -> Map<String, Value> {
    let mut resolved = Map::with_capacity(settings.len());
    for (key, value) in settings {
        if let Some(value) = resolve_value(key, value, config, owner) {
            let _ = resolved.insert(key.clone(), value);
        }
    }
    resolved
}

fn resolve_value(key: &str, value: &Value, config: &AmbientConfig, owner: &str) -> Option<Value> {
    match value {
        Value::String(text) => {
            let Some(path) = text.strip_prefix(EXTERNAL_SETTING_PREFIX) else {
                return Some(value.clone());
            };
            match config.section(path) {
                Some(Value::Null) | None => {
                    tracing::warn!(
                        module = owner,
                        setting = key,
                        path,
                        "external setting not found, using default"
                    );
                    None
                }
                Some(found) => Some(found.clone()),
            }
        }
        Value::Object(nested) => Some(Value::Object(resolve_external(nested, config, owner))),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| resolve_value(key, item, config, owner))
                .collect(),
        )),
        _ => Some(value.clone()),
    }
}

/// Deserializes a value that may arrive either natively or as a string.
///
/// Environment variables and local settings files only carry strings, so
/// settings fields fed from them should accept `"42"` as well as `42`:
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Options {
///     #[serde(default, deserialize_with = "strata_runtime::settings::lenient")]
///     retries: u32,
/// }
/// ```
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither the native type
/// nor a string that parses into it.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Native(T),
        Text(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Native(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
