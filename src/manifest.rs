//! Reading and writing the bundle manifest consumed by the external bundler.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::BundleRegistration;
use crate::project::VendorLayout;

/// Serialisable summary of every registration produced by one build.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
  /// Output tree, relative to the project root.
  pub output_root: String,
  /// Adapter directory, relative to the output tree.
  pub adapter_directory: String,
  /// Registrations in declaration order.
  #[serde(default)]
  pub registrations: Vec<BundleRegistration>,
}

impl BundleManifest {
  /// Assemble a manifest for the given layout.
  pub fn new(layout: &VendorLayout, registrations: Vec<BundleRegistration>) -> Self {
    Self {
      output_root: layout.output_prefix(),
      adapter_directory: layout.adapter_subdirectory(),
      registrations,
    }
  }

  /// Look up the registration for a module name.
  pub fn registration(&self, module_name: &str) -> Option<&BundleRegistration> {
    self
      .registrations
      .iter()
      .find(|registration| registration.module_name == module_name)
  }

  /// Every bundle-relative file the bundler must include, vendor files before adapters.
  pub fn bundle_files(&self) -> Vec<&str> {
    let vendor = self
      .registrations
      .iter()
      .flat_map(|registration| registration.vendor_files.iter().map(String::as_str));
    let adapters = self
      .registrations
      .iter()
      .map(|registration| registration.adapter_file.as_str());
    vendor.chain(adapters).collect()
  }
}

/// Load a bundle manifest from disk.
pub fn load_manifest(path: &Path) -> Result<BundleManifest> {
  let content = fs::read_to_string(path)
    .with_context(|| format!("manifest not found at {}", path.display()))?;
  let manifest: BundleManifest =
    serde_json::from_str(&content).context("failed to parse bundle manifest JSON")?;
  Ok(manifest)
}

/// Write a bundle manifest as pretty JSON, creating parent directories.
pub fn write_manifest(path: &Path, manifest: &BundleManifest) -> Result<()> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let json = serde_json::to_string_pretty(manifest)?;
  fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
