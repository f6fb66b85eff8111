//! `nopenv`: run any executable inside the package's Python environment

use crate::common::outcome_code;
use anyhow::{bail, Result};
use clap::Parser;
use nopy_config::EnvMap;
use nopy_manifest::find_package_in;
use nopy_python::{spawn_python, Interop, SpawnConfig, SpawnOptions, StdioMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nopenv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Run a command inside the Python environment of the current package",
    long_about = "Runs EXECUTABLE with PYTHONUSERBASE, PYTHONPATH and PATH set up for the \
                  package.json found from the working directory, so console scripts \
                  installed with npip resolve."
)]
pub struct NopenvArgs {
    /// Executable to run, followed by its arguments
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "EXECUTABLE"
    )]
    pub command: Vec<String>,
}

pub fn run(cli: &NopenvArgs, env: EnvMap) -> Result<i32> {
    let Some((executable, args)) = cli.command.split_first() else {
        bail!("nopenv needs an executable to run");
    };

    let cwd = std::env::current_dir()?;
    let package = find_package_in(None, &cwd)?;

    let options = SpawnOptions {
        interop: Interop::Status,
        package: Some(&package),
        exec_path: Some(PathBuf::from(executable)),
        spawn: SpawnConfig {
            env,
            stdio: Some(StdioMode::Inherit),
            cwd: None,
        },
        throw_non_zero_status: false,
    };

    let outcome = spawn_python(args, options)?;
    Ok(outcome_code(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_after_executable_are_kept() {
        let Ok(cli) = NopenvArgs::try_parse_from(["nopenv", "pytest", "-x", "--help"]) else {
            panic!("arguments should parse");
        };
        assert_eq!(cli.command, vec!["pytest", "-x", "--help"]);
    }

    #[test]
    fn test_executable_required() {
        assert!(NopenvArgs::try_parse_from(["nopenv"]).is_err());
    }
}
