use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating or reading a package manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not find directory containing package.json")]
    PackageNotFound { start: PathBuf },
}
