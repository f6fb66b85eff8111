//! `nopy`: run Python for the package owning the script or working directory

use crate::common::outcome_code;
use anyhow::Result;
use nopy_config::EnvMap;
use nopy_python::{spawn_python, Interop, SpawnConfig, SpawnOptions, StdioMode};

/// Run Python with `args` exactly as given and return its exit code.
pub fn run(args: &[String], env: EnvMap) -> Result<i32> {
    let options = SpawnOptions {
        interop: Interop::Status,
        throw_non_zero_status: false,
        spawn: SpawnConfig {
            env,
            stdio: Some(StdioMode::Inherit),
            cwd: None,
        },
        ..SpawnOptions::default()
    };

    let outcome = spawn_python(args, options)?;
    Ok(outcome_code(&outcome))
}
