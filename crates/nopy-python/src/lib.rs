//! Run Python inside a package's environment
//!
//! This crate provides:
//! 1. Script argument detection for Python command lines
//! 2. Environment synthesis from a package's manifest and interpreter
//! 3. Spawning the interpreter in one of three interop modes
//!
//! Packages install into `<package>/python_modules` through Python's user
//! site mechanism, so no virtual environment is created.

pub mod args;
pub mod environment;
pub mod errors;
pub mod python_discovery;
pub mod spawn;

pub use args::find_source_arg;
pub use environment::{base_python_env, compose_python_path, python_env, PythonEnv};
pub use errors::PythonError;
pub use python_discovery::PythonInfo;
pub use spawn::{
    spawn_python, BufferedOutput, Interop, SpawnConfig, SpawnOptions, SpawnOutcome, StdioMode,
};
