//! Package manifest handling for nopy
//!
//! A package is the closest ancestor directory holding a `package.json`. This
//! crate finds that directory, reads the manifest once per package handle and
//! exposes its `python` section with defaults applied.

pub mod errors;
pub mod manifest;
pub mod package;
pub mod package_discovery;

pub use errors::ManifestError;
pub use manifest::{Manifest, PythonConfig, DEFAULT_EXEC_PATH, DEFAULT_PATH};
pub use package::{normalize_lexically, Package};
pub use package_discovery::{find_package, find_package_in};
