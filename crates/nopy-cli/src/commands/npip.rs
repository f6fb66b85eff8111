//! `npip`: run pip for the current package, installing into `python_modules`

use crate::bootstrap;
use crate::common::outcome_code;
use anyhow::Result;
use nopy_config::{EnvMap, Settings};
use nopy_logger as logger;
use nopy_manifest::{find_package_in, PythonConfig};
use nopy_python::{spawn_python, Interop, SpawnConfig, SpawnOptions, StdioMode};

pub const NO_DEPENDENCIES: &str = "npip has no dependencies listed in package.json to install.";

/// pip commands that must target the user site
const USER_SITE_COMMANDS: &[&str] = &["install", "freeze", "list"];

/// `name + version` for every declared dependency.
///
/// `devDependencies` override `dependencies` of the same name; the order is
/// the order of first appearance.
pub fn dependency_specifiers(config: &PythonConfig) -> Vec<String> {
    let mut merged = config.dependencies.clone();
    merged.extend(
        config
            .dev_dependencies
            .iter()
            .map(|(name, version)| (name.clone(), version.clone())),
    );
    merged
        .into_iter()
        .map(|(name, version)| format!("{}{}", name, version))
        .collect()
}

/// Full interpreter arguments for `npip args...`.
///
/// Returns `None` for a bare `install` when the manifest declares nothing to
/// install.
pub fn pip_args(args: &[String], config: &PythonConfig) -> Option<Vec<String>> {
    let mut pip = args.to_vec();
    let command = args.first().map(String::as_str);

    if command == Some("install") && args.len() == 1 {
        let specifiers = dependency_specifiers(config);
        if specifiers.is_empty() {
            return None;
        }
        pip.extend(specifiers);
    }

    if command.is_some_and(|c| USER_SITE_COMMANDS.contains(&c)) {
        pip.insert(1, "--user".to_string());
    }

    let mut full = vec!["-m".to_string(), "pip".to_string()];
    full.extend(pip);
    Some(full)
}

pub fn run(args: &[String], env: EnvMap, settings: &Settings) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    let package = find_package_in(None, &cwd)?;
    let config = package.python_config()?;

    if args.first().map(String::as_str) == Some("install") {
        bootstrap::ensure_pip(&package, &env, settings)?;
    }

    let Some(pip) = pip_args(args, config) else {
        logger::notice(NO_DEPENDENCIES);
        return Ok(0);
    };
    tracing::debug!("running pip with {:?}", pip);

    let options = SpawnOptions {
        interop: Interop::Status,
        package: Some(&package),
        spawn: SpawnConfig {
            env,
            stdio: Some(StdioMode::Inherit),
            cwd: None,
        },
        throw_non_zero_status: false,
        ..SpawnOptions::default()
    };

    let outcome = spawn_python(&pip, options)?;
    Ok(outcome_code(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config_with(deps: &[(&str, &str)], dev_deps: &[(&str, &str)]) -> PythonConfig {
        let mut config = PythonConfig::default();
        for (name, version) in deps {
            config
                .dependencies
                .insert(name.to_string(), version.to_string());
        }
        for (name, version) in dev_deps {
            config
                .dev_dependencies
                .insert(name.to_string(), version.to_string());
        }
        config
    }

    #[test]
    fn test_bare_install_appends_dependencies() {
        let config = config_with(&[("requests", "==2.31.0")], &[("pytest", ">=7")]);
        let pip = pip_args(&strings(&["install"]), &config);
        assert_eq!(
            pip,
            Some(strings(&[
                "-m",
                "pip",
                "install",
                "--user",
                "requests==2.31.0",
                "pytest>=7"
            ]))
        );
    }

    #[test]
    fn test_dev_dependency_wins_on_same_name() {
        let config = config_with(
            &[("six", "==1.15"), ("attrs", "")],
            &[("six", "==1.16")],
        );
        assert_eq!(dependency_specifiers(&config), strings(&["six==1.16", "attrs"]));
    }

    #[test]
    fn test_bare_install_without_dependencies() {
        let config = PythonConfig::default();
        assert_eq!(pip_args(&strings(&["install"]), &config), None);
    }

    #[test]
    fn test_explicit_install_keeps_arguments() {
        let config = config_with(&[("requests", "")], &[]);
        let pip = pip_args(&strings(&["install", "flask"]), &config);
        assert_eq!(
            pip,
            Some(strings(&["-m", "pip", "install", "--user", "flask"]))
        );
    }

    #[test]
    fn test_user_flag_for_listing_commands() {
        let config = PythonConfig::default();
        assert_eq!(
            pip_args(&strings(&["freeze"]), &config),
            Some(strings(&["-m", "pip", "freeze", "--user"]))
        );
        assert_eq!(
            pip_args(&strings(&["list", "-o"]), &config),
            Some(strings(&["-m", "pip", "list", "--user", "-o"]))
        );
    }

    #[test]
    fn test_other_commands_pass_through() {
        let config = PythonConfig::default();
        assert_eq!(
            pip_args(&strings(&["uninstall", "-y", "six"]), &config),
            Some(strings(&["-m", "pip", "uninstall", "-y", "six"]))
        );
        assert_eq!(pip_args(&[], &config), Some(strings(&["-m", "pip"])));
    }
}
