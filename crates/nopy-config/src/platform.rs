//! Platform conventions for building a project-local Python environment
//!
//! This module provides:
//! - the names of the environment variables nopy reads and writes
//! - the path-list separator used by `PATH` and `PYTHONPATH`
//! - case folding of environment variable names where the OS ignores case
//!
//! Environments are plain string maps so they can be built, inspected and
//! compared without touching the process environment.

use std::collections::BTreeMap;

/// An environment passed explicitly to a child process
pub type EnvMap = BTreeMap<String, String>;

/// File that marks the root of a package
pub const MANIFEST_FILE: &str = "package.json";

/// Directory under the package root that receives the Python user base
pub const PYTHON_MODULES_DIR: &str = "python_modules";

pub const PYTHONUSERBASE: &str = "PYTHONUSERBASE";
pub const PYTHONPATH: &str = "PYTHONPATH";
pub const PYTHONNOUSERSITE: &str = "PYTHONNOUSERSITE";
pub const PATH: &str = "PATH";

/// Carries the resolved interpreter to nested nopy invocations
pub const NOPY_PYTHON_EXEC_PATH: &str = "NOPY_PYTHON_EXEC_PATH";

/// Separator between entries of `PATH`-like variables
/// ";" on Windows, ":" elsewhere
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Whether environment variable names are case-insensitive on this platform
pub const ENV_CASE_INSENSITIVE: bool = cfg!(windows);

/// Join search-path entries with `separator`, dropping empty entries.
pub fn join_search_path<I, S>(entries: I, separator: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for entry in entries {
        let entry = entry.as_ref();
        if entry.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(separator);
        }
        joined.push_str(entry);
    }
    joined
}

/// Upper-case every variable name when `case_insensitive` is set.
///
/// Names that collide after folding keep the value of the name that sorts
/// last (`Path` over `PATH`). With `case_insensitive` unset the map is
/// returned untouched.
pub fn fold_env_case(env: EnvMap, case_insensitive: bool) -> EnvMap {
    if !case_insensitive {
        return env;
    }

    env.into_iter()
        .map(|(key, value)| (key.to_uppercase(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_search_path_posix() {
        let joined = join_search_path(["/pkg/src", "/pkg/lib"], ':');
        assert_eq!(joined, "/pkg/src:/pkg/lib");
    }

    #[test]
    fn test_join_search_path_windows() {
        let joined = join_search_path([r"C:\pkg\src", r"C:\pkg\lib"], ';');
        assert_eq!(joined, r"C:\pkg\src;C:\pkg\lib");
    }

    #[test]
    fn test_join_search_path_skips_empty_entries() {
        let joined = join_search_path(["", "/a", "", "/b", ""], ':');
        assert_eq!(joined, "/a:/b");
        assert_eq!(join_search_path(Vec::<String>::new(), ':'), "");
    }

    #[test]
    fn test_fold_env_case_only_when_insensitive() {
        let mut env = EnvMap::new();
        env.insert("Path".to_string(), "C:\\bin".to_string());
        env.insert("home".to_string(), "C:\\Users\\al".to_string());

        let untouched = fold_env_case(env.clone(), false);
        assert_eq!(untouched, env);

        let folded = fold_env_case(env, true);
        assert_eq!(folded.get("PATH").map(String::as_str), Some("C:\\bin"));
        assert_eq!(folded.get("HOME").map(String::as_str), Some("C:\\Users\\al"));
        assert!(!folded.contains_key("Path"));
    }

    #[test]
    fn test_platform_constants() {
        #[cfg(not(windows))]
        {
            assert_eq!(PATH_LIST_SEPARATOR, ':');
            assert!(!ENV_CASE_INSENSITIVE);
        }
        #[cfg(windows)]
        {
            assert_eq!(PATH_LIST_SEPARATOR, ';');
            assert!(ENV_CASE_INSENSITIVE);
        }
    }
}
