//! Per-user settings for the nopy command-line tools
//!
//! Settings live in a TOML file, `~/.config/nopy/nopy.toml` by default
//! (`%APPDATA%\nopy\nopy.toml` on Windows). `NOPY_CONFIG` points at a
//! different file. A missing file means defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GET_PIP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// 0 = warnings only, 1 = debug, 2 = trace
    pub verbosity: u8,
    /// Append log lines to this file as well as the console
    pub log_file: Option<PathBuf>,
    /// Where `npip install` fetches `get-pip.py` when pip is missing
    pub get_pip_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbosity: 0,
            log_file: None,
            get_pip_url: DEFAULT_GET_PIP_URL.to_string(),
        }
    }
}

/// Error type for settings loading
#[derive(Debug)]
pub enum SettingsError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            SettingsError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Read { source, .. } => Some(source),
            SettingsError::Parse { source, .. } => Some(source),
        }
    }
}

impl Settings {
    /// Location of the settings file, honoring `NOPY_CONFIG`.
    pub fn path() -> Option<PathBuf> {
        if let Ok(env_path) = std::env::var("NOPY_CONFIG") {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir().map(|home| home.join(".config"));

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir();

        dir.map(|dir| dir.join("nopy").join("nopy.toml"))
    }

    /// Load settings from the default location, then apply `NOPY_*` overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = match Self::path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        Ok(settings.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `NOPY_VERBOSE` and `NOPY_LOG_FILE` as looked up by `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup("NOPY_VERBOSE").and_then(|v| v.trim().parse::<u8>().ok()) {
            self.verbosity = level;
        }
        if let Some(file) = lookup("NOPY_LOG_FILE").filter(|v| !v.trim().is_empty()) {
            self.log_file = Some(PathBuf::from(file.trim()));
        }
        self
    }
}
