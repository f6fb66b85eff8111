//! Environment synthesis for a package
//!
//! Turns a base environment into one where Python's user site points at the
//! package's `python_modules` directory, `PYTHONPATH` holds the manifest's
//! search path and `PATH` starts with the interpreter's user scripts dir.

use crate::errors::PythonError;
use crate::python_discovery::PythonInfo;
use nopy_config::platform::{NOPY_PYTHON_EXEC_PATH, PATH, PYTHONNOUSERSITE, PYTHONPATH, PYTHONUSERBASE};
use nopy_config::{fold_env_case, join_search_path, EnvMap, ENV_CASE_INSENSITIVE, PATH_LIST_SEPARATOR};
use nopy_logger as logger;
use nopy_manifest::Package;
use std::path::{Path, PathBuf};

/// A synthesized environment and the interpreter it was built for
#[derive(Debug, Clone)]
pub struct PythonEnv {
    pub vars: EnvMap,
    pub info: PythonInfo,
}

impl PythonEnv {
    pub fn exec_path(&self) -> &Path {
        &self.info.exec_path
    }
}

/// Join resolved search-path entries with `separator`.
pub fn compose_python_path(paths: &[PathBuf], separator: char) -> String {
    join_search_path(paths.iter().map(|p| p.to_string_lossy()), separator)
}

/// The interpreter-independent part of [`python_env`].
///
/// Removes `PYTHONNOUSERSITE`, points `PYTHONUSERBASE` at
/// `<package>/python_modules` and sets `PYTHONPATH` from the manifest.
/// Every other variable of `base` is kept as is.
pub fn base_python_env(package: &Package, base: EnvMap) -> Result<EnvMap, PythonError> {
    let mut env = fold_env_case(base, ENV_CASE_INSENSITIVE);

    env.remove(PYTHONNOUSERSITE);
    env.insert(
        PYTHONUSERBASE.to_string(),
        package.python_modules_dir().to_string_lossy().into_owned(),
    );

    let python_path = package.python_path()?;
    env.insert(
        PYTHONPATH.to_string(),
        compose_python_path(&python_path, PATH_LIST_SEPARATOR),
    );

    Ok(env)
}

/// Build the environment Python runs with for `package`.
///
/// On top of [`base_python_env`] this resolves the interpreter from the
/// manifest's `execPath` candidates, prepends its user scripts directory (and
/// the base interpreter's directory inside a virtual environment) to `PATH`,
/// and records the interpreter in `NOPY_PYTHON_EXEC_PATH`.
pub fn python_env(package: &Package, base: EnvMap) -> Result<PythonEnv, PythonError> {
    let mut env = base_python_env(package, base)?;

    let config = package.python_config()?;
    let info = PythonInfo::discover(&config.exec_path, &env, package.dir())?;
    logger::debug(&format!(
        "Using Python {} for {} (user base {}, user site {})",
        info.exec_path.display(),
        package.dir().display(),
        describe(info.user_base.as_deref()),
        describe(info.user_site.as_deref()),
    ));

    let inherited = env.get(PATH).cloned().unwrap_or_default();
    let search_path = join_search_path(
        info.pre_paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .chain(std::iter::once(inherited)),
        PATH_LIST_SEPARATOR,
    );
    env.insert(PATH.to_string(), search_path);
    env.insert(
        NOPY_PYTHON_EXEC_PATH.to_string(),
        info.exec_path.to_string_lossy().into_owned(),
    );

    Ok(PythonEnv { vars: env, info })
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "unknown".to_string(), |p| p.display().to_string())
}
