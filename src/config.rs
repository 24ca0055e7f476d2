//! Project configuration loader describing the vendored dependencies and output layout.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::DependencySpec;
use crate::project::{LinkMode, VendorLayout};

/// Configuration file names searched for, in order.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
  ["vendor.config.json", "vendor.config.yaml", "vendor.config.yml"];

/// Discoverable project configuration describing dependencies and output paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
  /// Output tree, relative to the project root.
  pub output_dir: String,
  /// Adapter directory inside the output tree.
  pub adapter_dir: String,
  /// Bundle manifest file name inside the output tree.
  pub manifest_file: String,
  /// How relocated files are materialised.
  pub link_mode: LinkMode,
  /// Directory package resolution starts from, relative to the project root.
  pub resolve_from: String,
  /// Explicit package locations that bypass `node_modules` lookup.
  pub package_paths: BTreeMap<String, String>,
  /// Dependencies to relocate and register.
  pub dependencies: Vec<DependencySpec>,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    let layout = VendorLayout::default();
    Self {
      output_dir: layout.output_dir,
      adapter_dir: layout.adapter_dir,
      manifest_file: layout.manifest_file,
      link_mode: layout.link_mode,
      resolve_from: ".".into(),
      package_paths: BTreeMap::new(),
      dependencies: Vec::new(),
    }
  }
}

impl ProjectConfig {
  /// Load configuration from the first candidate file present in `project_root`.
  ///
  /// A project without any configuration file gets the defaults. A file that exists but
  /// fails to parse is an error.
  pub fn discover(project_root: &Path) -> Result<Self, ConfigError> {
    for name in CONFIG_FILE_CANDIDATES {
      let candidate = project_root.join(name);
      if candidate.is_file() {
        tracing::debug!("loading configuration from {}", candidate.display());
        return Self::from_path(&candidate);
      }
    }
    Ok(Self::default())
  }

  /// Read configuration from a specific JSON or YAML file, chosen by extension.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      })
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      })
    }
  }

  /// Borrowing conversion into a layout, cloning the underlying strings.
  pub fn to_layout(&self) -> VendorLayout {
    VendorLayout {
      output_dir: self.output_dir.clone(),
      adapter_dir: self.adapter_dir.clone(),
      manifest_file: self.manifest_file.clone(),
      link_mode: self.link_mode,
    }
  }

  /// Directory package resolution starts from.
  pub fn resolve_from_path(&self, project_root: &Path) -> PathBuf {
    project_root.join(&self.resolve_from)
  }

  /// Package overrides resolved against the project root.
  pub fn package_path_overrides(&self, project_root: &Path) -> BTreeMap<String, PathBuf> {
    self
      .package_paths
      .iter()
      .map(|(package, path)| (package.clone(), project_root.join(path)))
      .collect()
  }
}
