//! Filesystem layout of the vendored output and the per-build context.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How relocated files are materialised in the output tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
  /// Copy file contents.
  #[default]
  Copy,
  /// Hard link to the package file, falling back to a copy across devices.
  Hardlink,
}

/// Owned description of where generated artifacts live, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorLayout {
  /// Output tree receiving relocated packages.
  pub output_dir: String,
  /// Directory inside the output tree holding generated adapters.
  pub adapter_dir: String,
  /// File name of the bundle manifest written into the output tree.
  pub manifest_file: String,
  /// Materialisation strategy for relocated files.
  pub link_mode: LinkMode,
}

impl Default for VendorLayout {
  fn default() -> Self {
    Self {
      output_dir: "vendor".into(),
      adapter_dir: "shims".into(),
      manifest_file: "vendor-manifest.json".into(),
      link_mode: LinkMode::Copy,
    }
  }
}

impl VendorLayout {
  /// Forward-slash prefix for bundle-relative paths.
  pub fn output_prefix(&self) -> String {
    self
      .output_dir
      .replace('\\', "/")
      .trim_matches('/')
      .to_string()
  }

  /// Adapter directory relative to the output tree.
  pub fn adapter_subdirectory(&self) -> String {
    self
      .adapter_dir
      .replace('\\', "/")
      .trim_matches('/')
      .to_string()
  }
}

/// Paths and layout for a single build pass.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
  /// Root of the application project.
  pub project_root: &'a Path,
  /// Artifact layout.
  pub layout: &'a VendorLayout,
}

impl<'a> BuildContext<'a> {
  /// Create a context for the given project.
  pub fn new(project_root: &'a Path, layout: &'a VendorLayout) -> Self {
    Self {
      project_root,
      layout,
    }
  }

  /// Absolute output tree.
  pub fn output_root(&self) -> PathBuf {
    self.project_root.join(&self.layout.output_dir)
  }

  /// Absolute adapter directory.
  pub fn adapter_root(&self) -> PathBuf {
    self.output_root().join(self.layout.adapter_subdirectory())
  }

  /// Absolute path of the bundle manifest.
  pub fn manifest_path(&self) -> PathBuf {
    self.output_root().join(&self.layout.manifest_file)
  }
}
