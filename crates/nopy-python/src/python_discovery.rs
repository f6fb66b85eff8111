//! Python interpreter discovery
//!
//! Resolves the interpreter named by the manifest's `execPath` candidates and
//! asks it, through its own `site` module, where user scripts live. The
//! answer decides which directories go in front of `PATH`.

use crate::errors::PythonError;
use nopy_config::platform::PATH;
use nopy_config::EnvMap;
use nopy_logger as logger;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Script run by the interpreter to report its user-site layout as JSON.
const SITE_QUERY: &str = r#"
import json
import os
import site
import sys

# virtualenv's site module only provides the USER_SITE and USER_BASE attributes.
if hasattr(site, "getusersitepackages"):
    user_site = site.getusersitepackages()
else:
    user_site = site.USER_SITE

if hasattr(site, "getuserbase"):
    user_base = site.getuserbase()
else:
    user_base = site.USER_BASE

if sys.platform == "win32":
    if sys.hexversion < 0x03050000:
        scripts_path = os.path.join(user_base, "Scripts")
    else:
        scripts_path = os.path.normpath(os.path.join(user_site, "..", "Scripts"))
else:
    scripts_path = os.path.join(user_base, "bin")

pre_paths = [scripts_path]

real_prefix = getattr(sys, "real_prefix", None)
if real_prefix is None and getattr(sys, "base_prefix", sys.prefix) != sys.prefix:
    real_prefix = sys.base_prefix
if real_prefix is not None:
    exe_dir = os.path.dirname(os.path.relpath(sys.executable, sys.prefix))
    pre_paths.append(os.path.normpath(os.path.join(real_prefix, exe_dir)))

json.dump(
    dict(userSite=user_site, userBase=user_base, scriptsPath=scripts_path, prePaths=pre_paths),
    sys.stdout,
)
"#;

/// Layout reported by the interpreter's site module
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteReport {
    user_site: Option<String>,
    user_base: Option<String>,
    scripts_path: String,
    pre_paths: Vec<String>,
}

/// A resolved interpreter and the directories its environment needs on `PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonInfo {
    /// Absolute path of the interpreter executable
    pub exec_path: PathBuf,
    /// User site-packages directory under the package's user base
    pub user_site: Option<PathBuf>,
    /// User base directory (`PYTHONUSERBASE` as seen by the interpreter)
    pub user_base: Option<PathBuf>,
    /// Where `pip install --user` puts console scripts
    pub scripts_dir: PathBuf,
    /// Directories to put in front of the inherited `PATH`, in order
    pub pre_paths: Vec<PathBuf>,
}

impl PythonInfo {
    /// Try each candidate in order and query the first one found on `PATH`.
    ///
    /// `env` is the environment the interpreter will run with; its `PATH` is
    /// used for the lookup and relative candidates resolve against `cwd`.
    pub fn discover(candidates: &[String], env: &EnvMap, cwd: &Path) -> Result<Self, PythonError> {
        for candidate in candidates {
            let Some(executable) = locate_executable(candidate, env, cwd) else {
                logger::debug(&format!("Python candidate not found: {}", candidate));
                continue;
            };

            match Self::probe(&executable, env) {
                Err(PythonError::Spawn { source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    logger::debug(&format!(
                        "Python candidate vanished before it could run: {}",
                        executable.display()
                    ));
                }
                result => return result,
            }
        }

        Err(PythonError::InterpreterNotFound {
            candidates: candidates.to_vec(),
        })
    }

    /// Run the site query with `executable` under `env`.
    fn probe(executable: &Path, env: &EnvMap) -> Result<Self, PythonError> {
        logger::debug(&format!("Probing Python at: {}", executable.display()));

        let output = Command::new(executable)
            .args(["-c", SITE_QUERY])
            .env_clear()
            .envs(env)
            .output()
            .map_err(|source| PythonError::Spawn {
                program: executable.to_path_buf(),
                source,
            })?;
        logger::capture_output(&format!("{} -c <site query>", executable.display()), &output);

        if !output.status.success() {
            return Err(PythonError::EnvironmentDiscovery {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Self::from_report(executable, &String::from_utf8_lossy(&output.stdout))
    }

    /// Build the info from the JSON printed by the site query.
    pub fn from_report(executable: &Path, stdout: &str) -> Result<Self, PythonError> {
        let report: SiteReport =
            serde_json::from_str(stdout.trim()).map_err(PythonError::DiscoveryOutput)?;

        Ok(PythonInfo {
            exec_path: executable.to_path_buf(),
            user_site: report.user_site.map(PathBuf::from),
            user_base: report.user_base.map(PathBuf::from),
            scripts_dir: PathBuf::from(report.scripts_path),
            pre_paths: report.pre_paths.into_iter().map(PathBuf::from).collect(),
        })
    }
}

/// Resolve `candidate` the way a shell would, using the `PATH` from `env`.
fn locate_executable(candidate: &str, env: &EnvMap, cwd: &Path) -> Option<PathBuf> {
    which::which_in(candidate, env.get(PATH), cwd).ok()
}
