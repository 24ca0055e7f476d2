use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ResolutionError;
use crate::paths::normalise_subdirectory;

/// Metadata file every installed package may carry.
pub const PACKAGE_MANIFEST_FILE: &str = "package.json";

const DEFAULT_ENTRY_FILE: &str = "index.js";

/// Subset of `package.json` needed to locate the package entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
  /// Declared package name.
  #[serde(default)]
  pub name: Option<String>,
  /// Declared version.
  #[serde(default)]
  pub version: Option<String>,
  /// Entry file relative to the package root.
  #[serde(default)]
  pub main: Option<String>,
}

/// A package located on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
  /// Identifier the package was requested by.
  pub identifier: String,
  /// Package root directory.
  pub root: PathBuf,
  /// Parsed `package.json`, or defaults when the package ships none.
  pub manifest: PackageManifest,
}

impl ResolvedPackage {
  /// Load package metadata from `root`.
  pub fn load(identifier: &str, root: &Path) -> Result<Self, ResolutionError> {
    let manifest_path = root.join(PACKAGE_MANIFEST_FILE);
    let manifest = match fs::read_to_string(&manifest_path) {
      Ok(content) => serde_json::from_str(&content).map_err(|source| {
        ResolutionError::InvalidPackageManifest {
          path: manifest_path.clone(),
          source,
        }
      })?,
      Err(err) if err.kind() == ErrorKind::NotFound => PackageManifest::default(),
      Err(source) => {
        return Err(ResolutionError::UnreadablePackageManifest {
          path: manifest_path,
          source,
        });
      }
    };

    Ok(Self {
      identifier: identifier.to_string(),
      root: root.to_path_buf(),
      manifest,
    })
  }

  /// Entry file used to inspect the module's exports.
  ///
  /// Mirrors the loader convention: `main` may omit the `.js` extension or point at a
  /// directory containing `index.js`.
  pub fn entry_file(&self) -> PathBuf {
    let main = self
      .manifest
      .main
      .as_deref()
      .map(|value| value.trim().trim_start_matches("./"))
      .filter(|value| !value.is_empty());

    let Some(main) = main else {
      return self.root.join(DEFAULT_ENTRY_FILE);
    };

    let direct = self.root.join(main);
    if direct.is_file() {
      return direct;
    }
    let with_extension = self.root.join(format!("{main}.js"));
    if with_extension.is_file() {
      return with_extension;
    }
    let index = direct.join(DEFAULT_ENTRY_FILE);
    if index.is_file() {
      return index;
    }
    direct
  }

  /// Directory files are relocated from.
  ///
  /// `subdirectory` must stay inside the package root; `None`, blank or `.` select the
  /// root itself.
  pub fn source_directory(&self, subdirectory: Option<&str>) -> Result<PathBuf, ResolutionError> {
    let Some(raw) = subdirectory
      .map(str::trim)
      .filter(|value| !value.is_empty() && *value != "." && *value != "./")
    else {
      return Ok(self.root.clone());
    };

    let relative =
      normalise_subdirectory(raw).ok_or_else(|| ResolutionError::InvalidSourceSubdirectory {
        root: self.root.clone(),
        subdirectory: raw.to_string(),
      })?;
    let directory = self.root.join(relative);
    if directory.is_dir() {
      Ok(directory)
    } else {
      Err(ResolutionError::MissingSourceDirectory { path: directory })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn packages_without_manifest_use_index_entry() {
    let dir = tempdir().unwrap();
    let package = ResolvedPackage::load("markdown", dir.path()).unwrap();

    assert_eq!(package.manifest, PackageManifest::default());
    assert_eq!(package.entry_file(), dir.path().join("index.js"));
  }

  #[test]
  fn resolves_main_without_extension() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/markdown.js"), "").unwrap();
    fs::write(
      dir.path().join(PACKAGE_MANIFEST_FILE),
      r#"{"name": "markdown", "version": "0.5.0", "main": "./lib/markdown"}"#,
    )
    .unwrap();

    let package = ResolvedPackage::load("markdown", dir.path()).unwrap();
    assert_eq!(package.manifest.version.as_deref(), Some("0.5.0"));
    assert_eq!(package.entry_file(), dir.path().join("lib/markdown.js"));
  }

  #[test]
  fn resolves_main_directory_index() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/index.js"), "").unwrap();
    fs::write(dir.path().join(PACKAGE_MANIFEST_FILE), r#"{"main": "lib"}"#).unwrap();

    let package = ResolvedPackage::load("markdown", dir.path()).unwrap();
    assert_eq!(package.entry_file(), dir.path().join("lib/index.js"));
  }

  #[test]
  fn rejects_malformed_manifest() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(PACKAGE_MANIFEST_FILE), "{").unwrap();

    let err = ResolvedPackage::load("markdown", dir.path()).unwrap_err();
    assert!(matches!(err, ResolutionError::InvalidPackageManifest { .. }));
  }

  #[test]
  fn missing_source_subdirectory_is_a_resolution_error() {
    let dir = tempdir().unwrap();
    let package = ResolvedPackage::load("markdown", dir.path()).unwrap();

    assert_eq!(package.source_directory(None).unwrap(), dir.path());
    assert!(matches!(
      package.source_directory(Some("dist")),
      Err(ResolutionError::MissingSourceDirectory { .. })
    ));
  }

  #[test]
  fn source_subdirectory_cannot_leave_the_package() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("node_modules/markdown");
    fs::create_dir_all(root.join("dist")).unwrap();
    fs::write(dir.path().join("secret.js"), "outside").unwrap();
    let package = ResolvedPackage::load("markdown", &root).unwrap();

    assert_eq!(package.source_directory(Some("./dist/")).unwrap(), root.join("dist"));
    assert_eq!(package.source_directory(Some(".")).unwrap(), root);
    for escaping in ["../..", "dist/../../..", "/etc"] {
      assert!(matches!(
        package.source_directory(Some(escaping)),
        Err(ResolutionError::InvalidSourceSubdirectory { .. })
      ));
    }
  }

  #[cfg(unix)]
  #[test]
  fn unreadable_manifest_is_not_reported_as_an_entry() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(PACKAGE_MANIFEST_FILE)).unwrap();

    let err = ResolvedPackage::load("markdown", dir.path()).unwrap_err();
    assert!(matches!(err, ResolutionError::UnreadablePackageManifest { .. }));
    assert!(err.to_string().contains(PACKAGE_MANIFEST_FILE));
  }
}
