use once_cell::sync::OnceCell;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use nopy_config::{MANIFEST_FILE, PYTHON_MODULES_DIR};

use crate::errors::ManifestError;
use crate::manifest::{Manifest, PythonConfig};

/// A resolved package root: the directory holding `package.json`.
///
/// The manifest is read on first use and cached for the lifetime of the
/// handle; later edits to the file are not observed.
#[derive(Debug)]
pub struct Package {
    dir: PathBuf,
    manifest: OnceCell<Manifest>,
}

impl Package {
    /// Create a handle for `dir`, made absolute against the current directory.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        let absolute = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()?.join(dir)
        };
        Ok(Self::from_absolute(normalize_lexically(&absolute)))
    }

    pub(crate) fn from_absolute(dir: PathBuf) -> Self {
        Self {
            dir,
            manifest: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// `<dir>/python_modules`, the Python user base for this package
    pub fn python_modules_dir(&self) -> PathBuf {
        self.dir.join(PYTHON_MODULES_DIR)
    }

    /// Read and parse `package.json` once; later calls return the cached value.
    pub fn read_manifest(&self) -> Result<&Manifest, ManifestError> {
        self.manifest.get_or_try_init(|| {
            let path = self.manifest_path();
            debug!("Reading manifest: {:?}", path);
            let text = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })?;
            Manifest::parse(&text, &path)
        })
    }

    pub fn python_config(&self) -> Result<&PythonConfig, ManifestError> {
        Ok(&self.read_manifest()?.python)
    }

    /// The manifest's `python.path` entries resolved against the package dir.
    pub fn python_path(&self) -> Result<Vec<PathBuf>, ManifestError> {
        Ok(self
            .python_config()?
            .path
            .iter()
            .map(|entry| normalize_lexically(&self.dir.join(entry)))
            .collect())
    }
}

/// Normalize `.` and `..` components without touching the filesystem.
///
/// `..` at the root is dropped, so `/..` becomes `/`.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component),
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            Component::Normal(part) => normalized.push(part),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}
