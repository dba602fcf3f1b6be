//! Local development settings.
//!
//! A local settings file holds one `KEY=VALUE` pair per line. Lines starting
//! with `#` are comments; blank lines are ignored. Keys use the environment
//! naming rules, so `Db__ConnectionString` sets `Db:ConnectionString`.

use std::path::Path;

use strata_common::config::AmbientConfig;
use strata_common::constants::{CONFIG_PATH_SEPARATOR, ENV_PATH_SEPARATOR, LOCAL_SETTINGS_COMMENT};
use strata_common::error::{Result, StrataError};

/// Reads `path` into `config`.
///
/// With `clobber` unset, keys already present in `config` keep their value.
/// A missing file only logs a warning. Read failures are logged and, when
/// `throw_on_error` is set, returned.
///
/// Returns the number of settings applied.
///
/// # Errors
///
/// Returns an I/O error if the file exists but cannot be read and
/// `throw_on_error` is set.
pub fn load_local_settings(
    path: &Path,
    clobber: bool,
    throw_on_error: bool,
    config: &mut AmbientConfig,
) -> Result<usize> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "local settings file not found");
        return Ok(0);
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) => {
            tracing::error!(path = %path.display(), error = %source, "could not read local settings");
            tracing::warn!("some configuration may be missing");
            if throw_on_error {
                return Err(StrataError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
            return Ok(0);
        }
    };

    let mut applied = 0;
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with(LOCAL_SETTINGS_COMMENT) {
            continue;
        }
        let parts: Vec<&str> = line.split('=').collect();
        let [key, value] = parts.as_slice() else {
            tracing::warn!(path = %path.display(), line, "malformed local setting");
            continue;
        };
        let setting = key
            .trim()
            .replace(ENV_PATH_SEPARATOR, &CONFIG_PATH_SEPARATOR.to_string());
        if !clobber && config.section(&setting).is_some() {
            tracing::info!(setting = %setting, "setting already present, not overwriting");
            continue;
        }
        if let Err(error) = config.set(&setting, *value) {
            tracing::warn!(path = %path.display(), line, %error, "local setting skipped");
            continue;
        }
        applied += 1;
    }
    tracing::debug!(path = %path.display(), applied, "local settings loaded");
    Ok(applied)
}
