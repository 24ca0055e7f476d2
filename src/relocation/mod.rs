//! Copying a filtered subset of a package into the output tree.
//!
//! Each dependency owns exactly one destination subdirectory. Relocation fully replaces
//! that subdirectory's contents and never touches anything else in the output tree, which
//! keeps unrelated build output intact and makes repeated runs idempotent.

mod filters;
mod tree;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use filters::{FileFilter, collect_matching_files};
pub use tree::{install_file, prune_tree};

use crate::error::{RegistrationError, RelocationError, VendorError};
use crate::models::{DependencySpec, RelocationManifestEntry};
use crate::paths::normalise_subdirectory;
use crate::project::LinkMode;
use crate::resolver::{PackageResolver, ResolvedPackage};

/// Resolve the dependency's package and relocate its selected files into `output_tree`.
pub fn relocate<R: PackageResolver + ?Sized>(
  resolver: &R,
  spec: &DependencySpec,
  output_tree: &Path,
  link_mode: LinkMode,
) -> Result<RelocationManifestEntry, VendorError> {
  let package = resolver
    .resolve(&spec.package_identifier)
    .map_err(|err| VendorError::resolution(&spec.logical_name, err))?;
  relocate_package(spec, &package, output_tree, link_mode)
}

/// Relocate an already resolved package.
pub fn relocate_package(
  spec: &DependencySpec,
  package: &ResolvedPackage,
  output_tree: &Path,
  link_mode: LinkMode,
) -> Result<RelocationManifestEntry, VendorError> {
  let name = spec.logical_name.as_str();

  let source_directory = package
    .source_directory(spec.source_subdirectory.as_deref())
    .map_err(|err| VendorError::resolution(name, err))?;

  let dest_subdirectory = normalise_subdirectory(&spec.dest_subdirectory).ok_or_else(|| {
    RegistrationError::InvalidDestination {
      logical_name: name.to_string(),
      destination: spec.dest_subdirectory.clone(),
    }
  })?;

  let filter = FileFilter::new(&spec.file_filter).map_err(|source| {
    VendorError::relocation(name, RelocationError::InvalidFilter {
      filter: spec.file_filter.clone(),
      source,
    })
  })?;

  let copied_files = collect_matching_files(&source_directory, &filter).map_err(|source| {
    VendorError::relocation(name, RelocationError::Scan {
      path: source_directory.clone(),
      source,
    })
  })?;

  if copied_files.is_empty() {
    return Err(VendorError::relocation(name, RelocationError::NoMatchingFiles {
      filter: filter.as_str().to_string(),
      source_directory,
    }));
  }

  let destination_directory = output_tree.join(&dest_subdirectory);
  let unwritable = |path: &Path| {
    let path = path.to_path_buf();
    move |source: std::io::Error| {
      VendorError::relocation(name, RelocationError::Unwritable { path, source })
    }
  };

  fs::create_dir_all(&destination_directory).map_err(unwritable(&destination_directory))?;

  let keep: BTreeSet<PathBuf> = copied_files.iter().cloned().collect();
  let stale =
    prune_tree(&destination_directory, &keep).map_err(unwritable(&destination_directory))?;
  for relative in &stale {
    tracing::debug!("removed stale {}", destination_directory.join(relative).display());
  }

  for relative in &copied_files {
    let source = source_directory.join(relative);
    let destination = destination_directory.join(relative);
    tracing::debug!("{} -> {}", source.display(), destination.display());
    install_file(&source, &destination, link_mode).map_err(unwritable(&destination))?;
  }

  tracing::info!(
    "relocated {} file(s) for `{}` into {}",
    copied_files.len(),
    name,
    destination_directory.display()
  );

  Ok(RelocationManifestEntry {
    logical_name: name.to_string(),
    source_directory,
    destination_directory,
    dest_subdirectory,
    copied_files,
  })
}
