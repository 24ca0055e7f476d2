//! Locating installed packages on disk.
//!
//! The surrounding build system owns package installation; this module only answers
//! "where does package X live". [`PackageResolver`] is the seam for plugging in a
//! different lookup strategy, and [`NodeModulesResolver`] implements the conventional
//! `node_modules` walk used by JavaScript toolchains.

mod candidates;
mod package;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use candidates::{PACKAGE_INSTALL_DIR, generate_lookup_candidates};
pub use package::{PACKAGE_MANIFEST_FILE, PackageManifest, ResolvedPackage};

use crate::error::ResolutionError;

/// Maps package identifiers to on-disk directories.
pub trait PackageResolver {
  /// Return the root directory of an installed package.
  fn resolve_package_path(&self, package_identifier: &str) -> Result<PathBuf, ResolutionError>;

  /// Resolve the package and load its metadata.
  fn resolve(&self, package_identifier: &str) -> Result<ResolvedPackage, ResolutionError> {
    let root = self.resolve_package_path(package_identifier)?;
    ResolvedPackage::load(package_identifier, &root)
  }
}

/// Resolver walking `node_modules` directories upward from a starting directory.
#[derive(Debug, Clone)]
pub struct NodeModulesResolver {
  start: PathBuf,
  extra_roots: Vec<PathBuf>,
  overrides: BTreeMap<String, PathBuf>,
}

impl NodeModulesResolver {
  /// Create a resolver searching from `start` and its ancestors.
  pub fn new(start: impl Into<PathBuf>) -> Self {
    Self {
      start: start.into(),
      extra_roots: Vec::new(),
      overrides: BTreeMap::new(),
    }
  }

  /// Probe an additional install root after the ancestor walk.
  pub fn with_extra_root(mut self, root: impl Into<PathBuf>) -> Self {
    self.extra_roots.push(root.into());
    self
  }

  /// Pin packages to explicit directories, bypassing the lookup.
  pub fn with_overrides(mut self, overrides: BTreeMap<String, PathBuf>) -> Self {
    self.overrides.extend(overrides);
    self
  }

  /// Directory the ancestor walk starts from.
  pub fn start(&self) -> &Path {
    &self.start
  }
}

impl PackageResolver for NodeModulesResolver {
  fn resolve_package_path(&self, package_identifier: &str) -> Result<PathBuf, ResolutionError> {
    if let Some(path) = self.overrides.get(package_identifier) {
      if path.is_dir() {
        tracing::debug!("`{}` pinned to {}", package_identifier, path.display());
        return Ok(path.clone());
      }
      return Err(ResolutionError::NotInstalled {
        package: package_identifier.to_string(),
        searched: vec![path.clone()],
      });
    }

    let candidates = generate_lookup_candidates(&self.start, &self.extra_roots, package_identifier);
    for candidate in &candidates {
      tracing::debug!("probing {}", candidate.display());
      if candidate.is_dir() {
        return Ok(candidate.clone());
      }
    }

    Err(ResolutionError::NotInstalled {
      package: package_identifier.to_string(),
      searched: candidates,
    })
  }
}

impl<R: PackageResolver + ?Sized> PackageResolver for &R {
  fn resolve_package_path(&self, package_identifier: &str) -> Result<PathBuf, ResolutionError> {
    (**self).resolve_package_path(package_identifier)
  }
}
