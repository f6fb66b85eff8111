use nopy_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while preparing or running a Python process
#[derive(Error, Debug)]
pub enum PythonError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("{}", describe_candidates(.candidates))]
    InterpreterNotFound { candidates: Vec<String> },

    #[error("Python site module exited with code {code}.\n{stderr}")]
    EnvironmentDiscovery { code: i32, stderr: String },

    #[error("Unexpected output from Python site module: {0}")]
    DiscoveryOutput(#[source] serde_json::Error),

    #[error("Exited with code {code}.{}", stderr_suffix(.stderr))]
    NonZeroExit { code: i32, stderr: Option<String> },

    #[error("Unexpected interop mode {0}")]
    UnsupportedInteropMode(String),

    #[error("Failed to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn describe_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "No python executable.".to_string()
    } else {
        format!("No python executable found (tried: {})", candidates.join(", "))
    }
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) => format!("\n{}", text),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_zero_exit_display() {
        let err = PythonError::NonZeroExit {
            code: 7,
            stderr: None,
        };
        assert_eq!(err.to_string(), "Exited with code 7.");

        let err = PythonError::NonZeroExit {
            code: 7,
            stderr: Some("hello from stderr\n".to_string()),
        };
        assert_eq!(err.to_string(), "Exited with code 7.\nhello from stderr\n");
    }

    #[test]
    fn test_interpreter_not_found_display() {
        let err = PythonError::InterpreterNotFound {
            candidates: vec!["python3.99".to_string(), "python".to_string()],
        };
        assert!(err.to_string().contains("python3.99, python"));

        let err = PythonError::InterpreterNotFound { candidates: vec![] };
        assert_eq!(err.to_string(), "No python executable.");
    }
}
