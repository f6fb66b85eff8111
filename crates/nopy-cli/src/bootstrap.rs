//! Make pip available to a package before `npip install`
//!
//! Nothing happens once `python_modules` exists. Otherwise the interpreter is
//! asked for pip, then `ensurepip` is tried, and as a last resort
//! `get-pip.py` is downloaded and run against the user site.

use anyhow::{Context, Result};
use nopy_config::{EnvMap, Settings};
use nopy_logger as logger;
use nopy_manifest::Package;
use nopy_python::{spawn_python, Interop, PythonError, SpawnConfig, SpawnOptions, StdioMode};
use std::fs;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("npip/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub fn ensure_pip(package: &Package, env: &EnvMap, settings: &Settings) -> Result<()> {
    if package.python_modules_dir().exists() {
        return Ok(());
    }

    logger::notice("No python_modules directory; installing pip locally if needed.");

    match run_python(package, env, &["-m", "pip", "-V"]) {
        Ok(()) => return Ok(()),
        Err(e) => logger::debug(&format!("pip is not available yet: {}", e)),
    }

    match run_python(package, env, &["-m", "ensurepip", "--user"]) {
        Ok(()) => {
            logger::success("Successfully completed pip check.");
            return Ok(());
        }
        Err(e) => logger::debug(&format!("ensurepip failed: {}", e)),
    }

    run_get_pip(package, env, &settings.get_pip_url)?;
    logger::success("Successfully completed pip check.");
    Ok(())
}

/// Run the package's Python with inherited stdio; a non-zero exit is an error.
fn run_python<S: AsRef<str>>(package: &Package, env: &EnvMap, args: &[S]) -> Result<(), PythonError> {
    let options = SpawnOptions {
        interop: Interop::Status,
        package: Some(package),
        spawn: SpawnConfig {
            env: env.clone(),
            stdio: Some(StdioMode::Inherit),
            cwd: None,
        },
        throw_non_zero_status: true,
        ..SpawnOptions::default()
    };
    spawn_python(args, options).map(|_| ())
}

fn run_get_pip(package: &Package, env: &EnvMap, url: &str) -> Result<()> {
    let temp_dir = tempfile::Builder::new()
        .prefix("npip-")
        .tempdir()
        .context("failed to create a temporary directory for get-pip.py")?;
    let script = temp_dir.path().join("get-pip.py");

    download(url, &script)?;

    let script_arg = script.display().to_string();
    run_python(package, env, &[script_arg.as_str(), "--user", "--quiet"])
        .with_context(|| format!("get-pip.py from {} failed", url))
}

fn download(url: &str, dest: &Path) -> Result<()> {
    logger::spinner_start(&format!("Downloading {}", url));
    match fetch(url, dest) {
        Ok(()) => {
            logger::spinner_success(&format!("Downloaded {}", url));
            Ok(())
        }
        Err(e) => {
            logger::spinner_error(&format!("Failed to download {}", url));
            Err(e)
        }
    }
}

fn fetch(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build http client")?;

    let bytes = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("failed to download {}", url))?
        .bytes()
        .with_context(|| format!("failed to read response from {}", url))?;

    fs::write(dest, &bytes).with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}
