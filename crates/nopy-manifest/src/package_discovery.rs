//! Locate the package that owns a path
//!
//! Walks from a starting path up to the filesystem root and picks the closest
//! directory that contains a regular `package.json` file.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use nopy_config::MANIFEST_FILE;

use crate::errors::ManifestError;
use crate::package::Package;

/// Find the package owning `start`, or the current directory when `start` is `None`.
pub fn find_package(start: Option<&Path>) -> Result<Package, ManifestError> {
    let cwd = std::env::current_dir().map_err(|source| ManifestError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    find_package_in(start, &cwd)
}

/// Same as [`find_package`] with an explicit working directory.
///
/// A relative `start` is taken relative to `cwd`. A `start` that does not exist
/// (for instance a module name given where a script path was expected) falls
/// back to `cwd`.
pub fn find_package_in(start: Option<&Path>, cwd: &Path) -> Result<Package, ManifestError> {
    let origin = scan_origin(start, cwd);
    debug!("Searching for {} from {:?}", MANIFEST_FILE, origin);

    let ancestors: Vec<&Path> = origin.ancestors().collect();

    // Probes are independent; position_first keeps the closest match.
    let found = ancestors
        .par_iter()
        .position_first(|dir| dir.join(MANIFEST_FILE).is_file());

    match found {
        Some(index) => {
            let dir = ancestors[index].to_path_buf();
            debug!("Found package root: {:?}", dir);
            Ok(Package::from_absolute(dir))
        }
        None => Err(ManifestError::PackageNotFound { start: origin }),
    }
}

fn scan_origin(start: Option<&Path>, cwd: &Path) -> PathBuf {
    let canonical_cwd = || fs::canonicalize(cwd).unwrap_or_else(|_| cwd.to_path_buf());

    let Some(start) = start else {
        return canonical_cwd();
    };

    let candidate = if start.is_absolute() {
        start.to_path_buf()
    } else {
        cwd.join(start)
    };

    match fs::canonicalize(&candidate) {
        Ok(resolved) => resolved,
        Err(e) => {
            debug!(
                "Start path {:?} not usable ({}), searching from working directory",
                candidate, e
            );
            canonical_cwd()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// root/package.json, root/src/test/test.py, root/nested/package.json
    fn create_tree() -> Option<(TempDir, PathBuf)> {
        let temp_dir = TempDir::new().ok()?;
        let root = fs::canonicalize(temp_dir.path()).ok()?;
        fs::write(root.join(MANIFEST_FILE), r#"{"name": "outer"}"#).ok()?;
        fs::create_dir_all(root.join("src").join("test")).ok()?;
        fs::write(root.join("src").join("test").join("test.py"), "").ok()?;
        fs::create_dir_all(root.join("nested").join("lib")).ok()?;
        fs::write(root.join("nested").join(MANIFEST_FILE), r#"{"name": "inner"}"#).ok()?;
        Some((temp_dir, root))
    }

    fn found_dir(start: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
        find_package_in(start, cwd).ok().map(|p| p.dir().to_path_buf())
    }

    #[test]
    fn test_finds_package_for_cwd() {
        let Some((_temp, root)) = create_tree() else {
            return;
        };
        assert_eq!(found_dir(None, &root), Some(root.clone()));
        assert_eq!(found_dir(None, &root.join("src")), Some(root.clone()));
    }

    #[test]
    fn test_finds_package_for_file_and_dirs() {
        let Some((_temp, root)) = create_tree() else {
            return;
        };
        let script = Path::new("src/test/test.py");
        assert_eq!(found_dir(Some(script), &root), Some(root.clone()));
        assert_eq!(found_dir(Some(Path::new("src/test/")), &root), Some(root.clone()));
        assert_eq!(found_dir(Some(Path::new("src")), &root), Some(root.clone()));
        assert_eq!(found_dir(Some(Path::new(".")), &root), Some(root.clone()));
    }

    #[test]
    fn test_closest_package_wins() {
        let Some((_temp, root)) = create_tree() else {
            return;
        };
        let nested = root.join("nested");
        assert_eq!(found_dir(Some(nested.join("lib").as_path()), &root), Some(nested));
    }

    #[test]
    fn test_missing_start_falls_back_to_cwd() {
        let Some((_temp, root)) = create_tree() else {
            return;
        };
        let missing = Path::new("src/test/does-not-exist.py");
        assert_eq!(found_dir(Some(missing), &root.join("nested")), Some(root.join("nested")));
        assert_eq!(found_dir(Some(Path::new("pytest")), &root), Some(root.clone()));
    }

    #[test]
    fn test_manifest_directory_is_not_a_package() {
        let Some((_temp, root)) = create_tree() else {
            return;
        };
        let decoy = root.join("decoy");
        if fs::create_dir_all(decoy.join(MANIFEST_FILE)).is_err() {
            return;
        }
        assert_eq!(found_dir(Some(decoy.as_path()), &root), Some(root.clone()));
    }

    #[test]
    fn test_no_package_up_to_root() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        // Only meaningful when nothing above the temp dir has a manifest.
        if temp_dir
            .path()
            .ancestors()
            .any(|dir| dir.join(MANIFEST_FILE).is_file())
        {
            return;
        }

        let result = find_package_in(None, temp_dir.path());
        assert!(matches!(result, Err(ManifestError::PackageNotFound { .. })));
        assert!(result.is_err_and(|e| e
            .to_string()
            .contains("Could not find directory containing package.json")));
    }
}
