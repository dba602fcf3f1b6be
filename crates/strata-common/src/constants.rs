//! Configuration keys and well-known names.

/// Root configuration section holding the module manifest.
pub const ARCHITECTURE_SECTION: &str = "Architecture";

/// Key of the module array inside [`ARCHITECTURE_SECTION`].
pub const MODULES_KEY: &str = "Modules";

/// Key of the global behavior array inside [`ARCHITECTURE_SECTION`].
pub const GLOBAL_BEHAVIORS_KEY: &str = "GlobalBehaviors";

/// Prefix marking a settings value as a path into the ambient configuration.
pub const EXTERNAL_SETTING_PREFIX: &str = "EXT:";

/// Separator between segments of a configuration path.
pub const CONFIG_PATH_SEPARATOR: char = ':';

/// Separator used by environment variables in place of [`CONFIG_PATH_SEPARATOR`].
pub const ENV_PATH_SEPARATOR: &str = "__";

/// Pseudo-contract implemented by module settings types.
pub const SERVICE_OPTIONS_CONTRACT: &str = "IServiceOptions";

/// Library holding the bundled utility behaviors.
pub const UTILITIES_LIBRARY: &str = "Strata.Utilities";

/// File extensions stripped when looking up a library by file name.
pub const LIBRARY_FILE_EXTENSIONS: [&str; 4] = ["dll", "so", "dylib", "rlib"];

/// Default configuration file read by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";

/// Comment marker in local settings files.
pub const LOCAL_SETTINGS_COMMENT: &str = "#";

