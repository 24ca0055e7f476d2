//! Validating declarations and describing what the bundler must include.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::error::RegistrationError;
use crate::models::{AdapterSnippet, BundleRegistration, DependencySpec, RelocationManifestEntry};
use crate::paths::{bundle_path, normalise_subdirectory, subdirectories_overlap};
use crate::project::VendorLayout;

/// Check a set of specs for conflicts before anything is written.
///
/// The layout must name real subdirectories. Module names must be unique and map to
/// distinct adapter files, and every destination must stay inside the output tree without
/// overlapping another spec's destination or the adapter directory.
pub fn declare<'s, I>(specs: I, layout: &VendorLayout) -> Result<(), RegistrationError>
where
  I: IntoIterator<Item = &'s DependencySpec>,
{
  let adapter_dir = validate_layout(layout)?;
  let mut names = BTreeSet::new();
  let mut adapter_files: BTreeMap<PathBuf, &str> = BTreeMap::new();
  let mut destinations: Vec<(&str, String)> = Vec::new();

  for spec in specs {
    let name = spec.logical_name.as_str();
    if !names.insert(name) {
      return Err(RegistrationError::DuplicateModuleName {
        logical_name: name.to_string(),
      });
    }

    let adapter_file = adapter_file_name(name);
    if let Some(first) = adapter_files.get(&adapter_file) {
      return Err(RegistrationError::AdapterCollision {
        first: first.to_string(),
        second: name.to_string(),
        adapter_file: adapter_file.to_string_lossy().replace('\\', "/"),
      });
    }
    adapter_files.insert(adapter_file, name);

    let destination = normalise_subdirectory(&spec.dest_subdirectory).ok_or_else(|| {
      RegistrationError::InvalidDestination {
        logical_name: name.to_string(),
        destination: spec.dest_subdirectory.clone(),
      }
    })?;

    if subdirectories_overlap(&adapter_dir, &destination) {
      return Err(RegistrationError::ReservedDestination {
        logical_name: name.to_string(),
        destination,
      });
    }

    if let Some((first, _)) = destinations
      .iter()
      .find(|(_, existing)| subdirectories_overlap(existing, &destination))
    {
      return Err(RegistrationError::OverlappingDestination {
        first: first.to_string(),
        second: name.to_string(),
        destination,
      });
    }

    destinations.push((name, destination));
  }

  Ok(())
}

/// Check that the output tree and adapter directory are proper subdirectories.
///
/// Returns the normalised adapter directory. An empty or `.` adapter directory would make
/// adapter pruning sweep the whole output tree.
pub fn validate_layout(layout: &VendorLayout) -> Result<String, RegistrationError> {
  normalise_subdirectory(&layout.output_dir).ok_or_else(|| RegistrationError::InvalidLayout {
    setting: "outputDir",
    value: layout.output_dir.clone(),
  })?;
  normalise_subdirectory(&layout.adapter_dir).ok_or_else(|| RegistrationError::InvalidLayout {
    setting: "adapterDir",
    value: layout.adapter_dir.clone(),
  })
}

/// Adapter file location for a module, relative to the adapter directory.
pub fn adapter_file_name(module_name: &str) -> PathBuf {
  let mut segments: Vec<String> = module_name
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
    .map(str::to_string)
    .collect();
  match segments.last_mut() {
    Some(last) => last.push_str(".js"),
    None => segments.push("index.js".to_string()),
  }
  segments.iter().collect()
}

/// Declare the relocated files and adapter of one dependency to the bundler.
pub fn register_for_bundling(
  layout: &VendorLayout,
  manifest_entry: &RelocationManifestEntry,
  adapter: &AdapterSnippet,
) -> BundleRegistration {
  let prefix = layout.output_prefix();
  let adapter_file = bundle_path(
    &prefix,
    &layout.adapter_subdirectory(),
    &adapter_file_name(&adapter.module_name),
  );

  let exports = std::iter::once("default".to_string())
    .chain(adapter.exported_symbols.iter().cloned())
    .collect();

  BundleRegistration {
    module_name: adapter.module_name.clone(),
    vendor_files: manifest_entry.bundle_paths(&prefix),
    adapter_file,
    exports,
  }
}

/// Bundle-relative adapter path, without building a full registration.
pub fn adapter_bundle_path(layout: &VendorLayout, module_name: &str) -> String {
  bundle_path(
    &layout.output_prefix(),
    &layout.adapter_subdirectory(),
    &adapter_file_name(module_name),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapter::generate_adapter;
  use crate::models::ModuleValue;

  #[test]
  fn rejects_duplicate_module_names() {
    let specs = [
      DependencySpec::new("markdown", "markdown", "markdown"),
      DependencySpec::new("markdown", "markdown-it", "markdown-it"),
    ];
    let err = declare(&specs, &VendorLayout::default()).unwrap_err();
    assert!(matches!(
      err,
      RegistrationError::DuplicateModuleName { logical_name } if logical_name == "markdown"
    ));
  }

  #[test]
  fn rejects_overlapping_destinations() {
    let specs = [
      DependencySpec::new("lodash", "lodash", "libs"),
      DependencySpec::new("moment", "moment", "libs/moment"),
    ];
    let err = declare(&specs, &VendorLayout::default()).unwrap_err();
    assert!(matches!(
      err,
      RegistrationError::OverlappingDestination { first, second, .. }
        if first == "lodash" && second == "moment"
    ));
  }

  #[test]
  fn rejects_adapter_and_escaping_destinations() {
    let layout = VendorLayout::default();
    let reserved = [DependencySpec::new("x", "x", "shims/x")];
    assert!(matches!(
      declare(&reserved, &layout),
      Err(RegistrationError::ReservedDestination { .. })
    ));

    let escaping = [DependencySpec::new("x", "x", "../x")];
    assert!(matches!(
      declare(&escaping, &layout),
      Err(RegistrationError::InvalidDestination { .. })
    ));
  }

  #[test]
  fn rejects_names_sharing_an_adapter_file() {
    let specs = [
      DependencySpec::new("lib", "lib", "lib"),
      DependencySpec::new("./lib", "lib", "lib-copy"),
    ];
    let err = declare(&specs, &VendorLayout::default()).unwrap_err();
    assert!(matches!(
      err,
      RegistrationError::AdapterCollision { first, second, adapter_file }
        if first == "lib" && second == "./lib" && adapter_file == "lib.js"
    ));

    let trailing = [DependencySpec::new("a", "a", "a"), DependencySpec::new("a/", "a", "b")];
    assert!(matches!(
      declare(&trailing, &VendorLayout::default()),
      Err(RegistrationError::AdapterCollision { .. })
    ));
  }

  #[test]
  fn rejects_layouts_without_real_subdirectories() {
    let specs = [DependencySpec::new("markdown", "markdown", "markdown")];
    for adapter_dir in ["", ".", "./", "../shims", "/shims"] {
      let layout = VendorLayout {
        adapter_dir: adapter_dir.into(),
        ..VendorLayout::default()
      };
      assert!(matches!(
        declare(&specs, &layout),
        Err(RegistrationError::InvalidLayout { setting: "adapterDir", .. })
      ));
    }

    let layout = VendorLayout {
      output_dir: "..".into(),
      ..VendorLayout::default()
    };
    assert!(matches!(
      declare(&specs, &layout),
      Err(RegistrationError::InvalidLayout { setting: "outputDir", .. })
    ));
  }

  #[test]
  fn accepts_disjoint_specs() {
    let specs = [
      DependencySpec::new("markdown", "markdown", "markdown"),
      DependencySpec::new("moment", "moment", "moment"),
    ];
    declare(&specs, &VendorLayout::default()).unwrap();
  }

  #[test]
  fn registration_lists_vendor_files_adapter_and_exports() {
    let layout = VendorLayout::default();
    let entry = RelocationManifestEntry {
      logical_name: "markdown".into(),
      source_directory: PathBuf::from("/app/node_modules/markdown"),
      destination_directory: PathBuf::from("/app/vendor/markdown"),
      dest_subdirectory: "markdown".into(),
      copied_files: vec![PathBuf::from("markdown.js")],
    };
    let adapter = generate_adapter(
      "markdown",
      "markdown",
      r#"self["markdown"]"#,
      &ModuleValue::from_keys(["render", "toHTML"]),
    );

    let registration = register_for_bundling(&layout, &entry, &adapter);
    assert_eq!(registration.module_name, "markdown");
    assert_eq!(registration.vendor_files, vec!["vendor/markdown/markdown.js".to_string()]);
    assert_eq!(registration.adapter_file, "vendor/shims/markdown.js");
    assert_eq!(registration.exports, vec!["default", "render", "toHTML"]);
  }

  #[test]
  fn nested_module_names_get_nested_adapters() {
    let layout = VendorLayout::default();
    assert_eq!(adapter_bundle_path(&layout, "lodash/fp"), "vendor/shims/lodash/fp.js");
    assert_eq!(adapter_file_name("@scope/widget"), PathBuf::from("@scope/widget.js"));
    assert_eq!(adapter_file_name("jquery.min"), PathBuf::from("jquery.min.js"));
  }
}
