//! Data structures produced while relocating and registering vendored packages.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::bundle_path;

/// File filter applied when a spec does not declare one.
pub const DEFAULT_FILE_FILTER: &str = "*.js";

fn default_file_filter() -> String {
  DEFAULT_FILE_FILTER.to_string()
}

/// Declaration of one package to expose as an importable module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySpec {
  /// Module name the package is importable under. Unique within a build.
  pub logical_name: String,
  /// Package identifier used to locate the package on disk.
  pub package_identifier: String,
  /// Glob applied to paths relative to the source directory.
  #[serde(default = "default_file_filter")]
  pub file_filter: String,
  /// Subdirectory of the output tree receiving the copied files.
  pub dest_subdirectory: String,
  /// Optional directory inside the package to relocate from, e.g. `dist`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_subdirectory: Option<String>,
  /// Symbol reference used as the default export.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_export: Option<String>,
  /// Explicit export keys. Skips inspection of the package entry when present.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exports: Option<Vec<String>>,
}

impl DependencySpec {
  /// Create a spec with the default file filter.
  pub fn new(
    logical_name: impl Into<String>,
    package_identifier: impl Into<String>,
    dest_subdirectory: impl Into<String>,
  ) -> Self {
    Self {
      logical_name: logical_name.into(),
      package_identifier: package_identifier.into(),
      file_filter: default_file_filter(),
      dest_subdirectory: dest_subdirectory.into(),
      source_subdirectory: None,
      default_export: None,
      exports: None,
    }
  }

  /// Replace the file filter.
  pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
    self.file_filter = filter.into();
    self
  }

  /// Relocate from a subdirectory of the package instead of its root.
  pub fn with_source_subdirectory(mut self, subdirectory: impl Into<String>) -> Self {
    self.source_subdirectory = Some(subdirectory.into());
    self
  }

  /// Reference used as the default export in the generated adapter.
  ///
  /// Packages that install themselves as a global are addressed through `self`, which
  /// works in both window and worker scopes.
  pub fn default_export_ref(&self) -> String {
    match &self.default_export {
      Some(reference) if !reference.trim().is_empty() => reference.trim().to_string(),
      _ => format!(
        "self[{}]",
        serde_json::to_string(&self.package_identifier)
          .unwrap_or_else(|_| format!("\"{}\"", self.package_identifier))
      ),
    }
  }
}

/// Result of relocating one dependency into the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationManifestEntry {
  /// Logical name of the dependency that produced this entry.
  pub logical_name: String,
  /// Directory the files were copied from.
  pub source_directory: PathBuf,
  /// Directory the files were copied into.
  pub destination_directory: PathBuf,
  /// Destination relative to the output tree, as declared by the dependency.
  pub dest_subdirectory: String,
  /// Copied files, relative to both source and destination, sorted.
  pub copied_files: Vec<PathBuf>,
}

impl RelocationManifestEntry {
  /// Absolute destination paths of the copied files.
  pub fn destination_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
    self
      .copied_files
      .iter()
      .map(|relative| self.destination_directory.join(relative))
  }

  /// Source paths of the copied files.
  pub fn source_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
    self
      .copied_files
      .iter()
      .map(|relative| self.source_directory.join(relative))
  }

  /// Bundle-relative paths of the copied files under the given output prefix.
  pub fn bundle_paths(&self, output_prefix: &str) -> Vec<String> {
    self
      .copied_files
      .iter()
      .map(|relative| bundle_path(output_prefix, &self.dest_subdirectory, relative))
      .collect()
  }
}

/// Enumerable keys of a resolved module value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleValue {
  /// Keys in sorted order.
  pub keys: BTreeSet<String>,
}

impl ModuleValue {
  /// Build a module value from any list of keys.
  pub fn from_keys<I, S>(keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      keys: keys.into_iter().map(Into::into).collect(),
    }
  }
}

/// Generated module loader registration for one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSnippet {
  /// Module name registered with the loader.
  pub module_name: String,
  /// Named exports re-exported from the default export.
  pub exported_symbols: BTreeSet<String>,
  /// Reference used as the default export.
  pub default_export: String,
  /// Rendered JavaScript source.
  pub source: String,
}

/// Declaration consumed by the external bundler for one dependency.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRegistration {
  /// Module name importable by application code.
  pub module_name: String,
  /// Relocated files to include verbatim, bundle-relative.
  pub vendor_files: Vec<String>,
  /// Adapter file to include after the vendor files, bundle-relative.
  pub adapter_file: String,
  /// Names wired to the module loader, `default` first.
  pub exports: Vec<String>,
}
