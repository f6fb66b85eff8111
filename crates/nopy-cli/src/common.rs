//! Startup and exit handling shared by the binaries

use nopy_config::{EnvMap, Settings};
use nopy_logger as logger;
use nopy_python::SpawnOutcome;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the `tracing` filter directive
pub const LOG_FILTER_ENV: &str = "NOPY_LOG";

/// Install logging and load the user settings.
///
/// A broken settings file is reported and replaced by defaults; it never
/// stops the command.
pub fn init() -> Settings {
    init_tracing();

    let settings = Settings::load().unwrap_or_else(|e| {
        logger::warn(&format!("Ignoring settings: {}", e));
        Settings::default().with_env_overrides(|key| std::env::var(key).ok())
    });

    if let Err(e) = logger::init_with_verbosity(settings.verbosity, settings.log_file.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    if let Some(path) = logger::get_log_path() {
        logger::debug(&format!("Logging to {}", path.display()));
    }

    settings
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// The current process environment, the base for every spawned interpreter.
pub fn process_env() -> EnvMap {
    std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Command-line arguments after the program name, untouched by any parser.
pub fn forwarded_args() -> Vec<String> {
    std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

/// Exit code to report for a finished spawn.
pub fn outcome_code(outcome: &SpawnOutcome) -> i32 {
    outcome.code().unwrap_or(0)
}

/// Exit the process with the command's code, or 1 after printing its error.
pub fn exit_with(result: anyhow::Result<i32>) -> ! {
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            logger::error(&format!("{:#}", e));
            std::process::exit(1)
        }
    }
}
