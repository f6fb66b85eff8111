//! Spawn Python inside a package environment
//!
//! `spawn_python` resolves the owning package, synthesizes its environment and
//! starts the interpreter. What comes back depends on the [`Interop`] mode:
//! the live child, its buffered output, or just its exit status.

use crate::args::find_source_arg;
use crate::environment::python_env;
use crate::errors::PythonError;
use nopy_config::EnvMap;
use nopy_logger as logger;
use nopy_manifest::{find_package_in, Package};
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::thread;

/// How the caller consumes the spawned interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interop {
    /// Return the running child; the caller owns it from then on
    Child,
    /// Wait for exit and collect stdout and stderr as text
    Buffer,
    /// Wait for exit and report the exit code only
    #[default]
    Status,
}

impl FromStr for Interop {
    type Err = PythonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "child" => Ok(Interop::Child),
            "buffer" => Ok(Interop::Buffer),
            "status" => Ok(Interop::Status),
            other => Err(PythonError::UnsupportedInteropMode(other.to_string())),
        }
    }
}

impl fmt::Display for Interop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interop::Child => "child",
            Interop::Buffer => "buffer",
            Interop::Status => "status",
        };
        f.write_str(name)
    }
}

/// Standard stream wiring for the child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    Inherit,
    Piped,
    Null,
}

impl StdioMode {
    fn stdio(self) -> Stdio {
        match self {
            StdioMode::Inherit => Stdio::inherit(),
            StdioMode::Piped => Stdio::piped(),
            StdioMode::Null => Stdio::null(),
        }
    }
}

/// Options handed through to process creation
#[derive(Debug, Clone, Default)]
pub struct SpawnConfig {
    /// Base environment the package environment is derived from.
    /// Nothing is inherited from the current process unless it is in here.
    pub env: EnvMap,
    /// Stream wiring; `None` picks the mode's default (piped for `Child`,
    /// inherited for `Status`). `Buffer` always pipes stdout and stderr.
    pub stdio: Option<StdioMode>,
    /// Working directory of the child, also used to resolve relative paths
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SpawnOptions<'a> {
    pub interop: Interop,
    /// Use this package instead of locating one from the arguments
    pub package: Option<&'a Package>,
    /// Run this executable instead of the discovered interpreter
    pub exec_path: Option<PathBuf>,
    pub spawn: SpawnConfig,
    /// Turn a non-zero exit into [`PythonError::NonZeroExit`]
    pub throw_non_zero_status: bool,
}

impl Default for SpawnOptions<'_> {
    fn default() -> Self {
        Self {
            interop: Interop::default(),
            package: None,
            exec_path: None,
            spawn: SpawnConfig::default(),
            throw_non_zero_status: true,
        }
    }
}

/// Output collected in [`Interop::Buffer`] mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Result of [`spawn_python`], one variant per [`Interop`] mode
#[derive(Debug)]
pub enum SpawnOutcome {
    Child(Child),
    Buffered(BufferedOutput),
    Status(i32),
}

impl SpawnOutcome {
    /// Exit code, unless the child is still owned by the caller
    pub fn code(&self) -> Option<i32> {
        match self {
            SpawnOutcome::Child(_) => None,
            SpawnOutcome::Buffered(output) => Some(output.code),
            SpawnOutcome::Status(code) => Some(*code),
        }
    }

    pub fn into_child(self) -> Option<Child> {
        match self {
            SpawnOutcome::Child(child) => Some(child),
            _ => None,
        }
    }

    pub fn into_buffered(self) -> Option<BufferedOutput> {
        match self {
            SpawnOutcome::Buffered(output) => Some(output),
            _ => None,
        }
    }
}

/// Run Python with `args` inside the environment of the owning package.
///
/// The package is `options.package` when given. Otherwise it is the package
/// owning the script argument (see [`find_source_arg`]) or, when there is no
/// script, the working directory. Failing to start the process is always an
/// error, whatever the interop mode.
pub fn spawn_python<S: AsRef<str>>(
    args: &[S],
    options: SpawnOptions<'_>,
) -> Result<SpawnOutcome, PythonError> {
    let SpawnOptions {
        interop,
        package,
        exec_path,
        spawn,
        throw_non_zero_status,
    } = options;

    let cwd = match &spawn.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let located;
    let package = match package {
        Some(package) => package,
        None => {
            located = locate_package(args, &cwd)?;
            &located
        }
    };

    let env = python_env(package, spawn.env)?;
    let program = exec_path.unwrap_or_else(|| env.exec_path().to_path_buf());
    logger::step(&format!(
        "Spawning {} ({} mode) in {}",
        program.display(),
        interop,
        package.dir().display()
    ));

    let mut command = Command::new(&program);
    for arg in args {
        let arg: &str = arg.as_ref();
        command.arg(arg);
    }
    command.env_clear().envs(&env.vars);
    if let Some(dir) = &spawn.cwd {
        command.current_dir(dir);
    }

    match interop {
        Interop::Child => {
            let stdio = spawn.stdio.unwrap_or(StdioMode::Piped);
            command
                .stdin(stdio.stdio())
                .stdout(stdio.stdio())
                .stderr(stdio.stdio());
            let child = start(&mut command, &program)?;
            Ok(SpawnOutcome::Child(child))
        }
        Interop::Buffer => {
            let stdin = match spawn.stdio {
                Some(StdioMode::Inherit) => StdioMode::Inherit,
                _ => StdioMode::Null,
            };
            command
                .stdin(stdin.stdio())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
            let child = start(&mut command, &program)?;
            let output = collect_output(child, &program)?;
            if throw_non_zero_status && output.code != 0 {
                return Err(PythonError::NonZeroExit {
                    code: output.code,
                    stderr: Some(output.stderr),
                });
            }
            Ok(SpawnOutcome::Buffered(output))
        }
        Interop::Status => {
            let stdio = spawn.stdio.unwrap_or(StdioMode::Inherit);
            command
                .stdin(stdio.stdio())
                .stdout(stdio.stdio())
                .stderr(stdio.stdio());
            let mut child = start(&mut command, &program)?;
            let status = match stdio {
                StdioMode::Piped => wait_discarding_output(child, &program)?,
                StdioMode::Inherit | StdioMode::Null => child.wait()?,
            };
            let code = exit_code(status);
            if throw_non_zero_status && code != 0 {
                return Err(PythonError::NonZeroExit { code, stderr: None });
            }
            Ok(SpawnOutcome::Status(code))
        }
    }
}

/// Package owning the script in `args`, or owning `cwd` when there is none.
fn locate_package<S: AsRef<str>>(args: &[S], cwd: &Path) -> Result<Package, PythonError> {
    let source = find_source_arg(args).map(|index| Path::new(args[index].as_ref()));
    Ok(find_package_in(source, cwd)?)
}

fn start(command: &mut Command, program: &Path) -> Result<Child, PythonError> {
    command.spawn().map_err(|source| PythonError::Spawn {
        program: program.to_path_buf(),
        source,
    })
}

/// A child killed by a signal has no code; report it as -1.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Drain both pipes on their own threads, then reap the child.
fn collect_output(child: Child, program: &Path) -> Result<BufferedOutput, PythonError> {
    let (status, stdout, stderr) = drain_pipes(child, program, read_lossy)?;
    Ok(BufferedOutput {
        code: exit_code(status),
        stdout,
        stderr,
    })
}

/// Reap a child whose stdout and stderr are pipes nobody reads, discarding
/// what it writes so it cannot block on a full pipe.
fn wait_discarding_output(child: Child, program: &Path) -> Result<ExitStatus, PythonError> {
    let (status, (), ()) = drain_pipes(child, program, discard)?;
    Ok(status)
}

/// Close stdin, run `consume` over stdout and stderr concurrently and wait
/// for the child. The child is reaped before the readers are joined.
fn drain_pipes<T: Send + 'static>(
    mut child: Child,
    program: &Path,
    consume: fn(&mut dyn Read) -> io::Result<T>,
) -> Result<(ExitStatus, T, T), PythonError> {
    drop(child.stdin.take());
    let mut stdout = child.stdout.take().ok_or_else(|| {
        io::Error::other(format!("stdout missing for {}", program.display()))
    })?;
    let mut stderr = child.stderr.take().ok_or_else(|| {
        io::Error::other(format!("stderr missing for {}", program.display()))
    })?;

    let stdout_handle = thread::spawn(move || consume(&mut stdout));
    let stderr_handle = thread::spawn(move || consume(&mut stderr));

    let status = child.wait()?;
    let stdout = stdout_handle
        .join()
        .map_err(|_| io::Error::other("stdout reader thread panicked"))??;
    let stderr = stderr_handle
        .join()
        .map_err(|_| io::Error::other("stderr reader thread panicked"))??;

    Ok((status, stdout, stderr))
}

fn read_lossy(reader: &mut dyn Read) -> io::Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn discard(reader: &mut dyn Read) -> io::Result<()> {
    io::copy(reader, &mut io::sink()).map(|_| ())
}
