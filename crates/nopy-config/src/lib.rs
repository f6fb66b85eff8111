//! Configuration shared by the nopy crates
//!
//! - `platform`: environment variable names, path-list separators and the
//!   case rules for environment variable names on the current platform
//! - `settings`: the optional per-user settings file

pub mod platform;
pub mod settings;

pub use platform::{
    fold_env_case, join_search_path, EnvMap, ENV_CASE_INSENSITIVE, MANIFEST_FILE,
    PATH_LIST_SEPARATOR, PYTHON_MODULES_DIR,
};
pub use settings::{Settings, SettingsError};
