//! Build orchestrator relocating declared packages and registering them for bundling.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use crate::adapter::{DeclaredExports, ModuleInspector, SourceScanInspector, generate_adapter};
use crate::error::VendorError;
use crate::manifest::{BundleManifest, write_manifest};
use crate::models::{
  AdapterSnippet, BundleRegistration, DependencySpec, ModuleValue, RelocationManifestEntry,
};
use crate::project::BuildContext;
use crate::registration::{adapter_file_name, declare, register_for_bundling, validate_layout};
use crate::relocation::{prune_tree, relocate_package};
use crate::resolver::{PACKAGE_MANIFEST_FILE, PackageResolver, ResolvedPackage};
use crate::selection::DependencyInclusion;

/// Everything one build pass produced.
#[derive(Debug)]
pub struct VendorArtifacts {
  /// Relocation results in declaration order.
  pub entries: Vec<RelocationManifestEntry>,
  /// Generated adapters in declaration order.
  pub adapters: Vec<AdapterSnippet>,
  /// Bundler declarations in declaration order.
  pub registrations: Vec<BundleRegistration>,
  /// Bundle manifest summarising the registrations.
  pub bundle_manifest: BundleManifest,
  /// Paths whose changes should trigger another build.
  pub watch_paths: Vec<PathBuf>,
}

impl VendorArtifacts {
  /// Bundle manifest serialised as prettified JSON.
  pub fn bundle_manifest_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&self.bundle_manifest)
  }

  /// Write adapters and the bundle manifest below the context's output tree.
  ///
  /// Adapters left over from dependencies that are no longer built are removed.
  pub fn write(&self, context: &BuildContext<'_>) -> anyhow::Result<()> {
    validate_layout(context.layout)?;
    let adapter_root = context.adapter_root();
    fs::create_dir_all(&adapter_root)
      .with_context(|| format!("failed to create {}", adapter_root.display()))?;

    let keep: BTreeSet<PathBuf> = self
      .adapters
      .iter()
      .map(|adapter| adapter_file_name(&adapter.module_name))
      .collect();
    let stale = prune_tree(&adapter_root, &keep)
      .with_context(|| format!("failed to prune {}", adapter_root.display()))?;
    for path in &stale {
      tracing::info!("removed stale adapter {}", path.display());
    }

    for adapter in &self.adapters {
      let path = adapter_root.join(adapter_file_name(&adapter.module_name));
      if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {}", parent.display()))?;
      }
      fs::write(&path, &adapter.source)
        .with_context(|| format!("failed to write {}", path.display()))?;
    }

    write_manifest(&context.manifest_path(), &self.bundle_manifest)
  }
}

/// High-level helper running one relocation and registration pass.
pub struct VendorBuilder<'a, R, I = SourceScanInspector> {
  context: BuildContext<'a>,
  resolver: R,
  inspector: I,
}

impl<'a, R: PackageResolver> VendorBuilder<'a, R> {
  /// Create a builder inspecting package entry files for exports.
  pub fn new(context: BuildContext<'a>, resolver: R) -> Self {
    Self {
      context,
      resolver,
      inspector: SourceScanInspector,
    }
  }
}

impl<'a, R: PackageResolver, I: ModuleInspector> VendorBuilder<'a, R, I> {
  /// Swap the strategy used to discover a package's exports.
  pub fn with_inspector<J: ModuleInspector>(self, inspector: J) -> VendorBuilder<'a, R, J> {
    VendorBuilder {
      context: self.context,
      resolver: self.resolver,
      inspector,
    }
  }

  /// Validate declarations and resolve every selected package without writing anything.
  pub fn check<S: DependencyInclusion>(
    &self,
    specs: &[DependencySpec],
    selection: &S,
  ) -> Result<Vec<ResolvedPackage>, VendorError> {
    let selected = selection.select(specs);
    declare(selected.iter().copied(), self.context.layout)?;

    selected
      .into_iter()
      .map(|spec| self.resolve(spec))
      .collect()
  }

  /// Relocate, inspect and register every selected dependency.
  ///
  /// All declarations are validated before the first file is copied.
  pub fn build<S: DependencyInclusion>(
    &self,
    specs: &[DependencySpec],
    selection: &S,
  ) -> Result<VendorArtifacts, VendorError> {
    let selected = selection.select(specs);
    declare(selected.iter().copied(), self.context.layout)?;

    let output_root = self.context.output_root();
    let mut entries = Vec::with_capacity(selected.len());
    let mut adapters = Vec::with_capacity(selected.len());
    let mut registrations = Vec::with_capacity(selected.len());
    let mut watch_paths = Vec::new();

    for spec in selected {
      let package = self.resolve(spec)?;
      let entry = relocate_package(spec, &package, &output_root, self.context.layout.link_mode)?;
      let module = self.module_value(spec, &package)?;
      let adapter = generate_adapter(
        &spec.logical_name,
        &spec.package_identifier,
        &spec.default_export_ref(),
        &module,
      );
      let registration = register_for_bundling(self.context.layout, &entry, &adapter);

      tracing::info!(
        "registered `{}` with {} named export(s)",
        registration.module_name,
        adapter.exported_symbols.len()
      );

      append_watch_paths(&package, &mut watch_paths);
      entries.push(entry);
      adapters.push(adapter);
      registrations.push(registration);
    }

    let bundle_manifest = BundleManifest::new(self.context.layout, registrations.clone());

    Ok(VendorArtifacts {
      entries,
      adapters,
      registrations,
      bundle_manifest,
      watch_paths,
    })
  }

  fn resolve(&self, spec: &DependencySpec) -> Result<ResolvedPackage, VendorError> {
    self
      .resolver
      .resolve(&spec.package_identifier)
      .map_err(|err| VendorError::resolution(&spec.logical_name, err))
  }

  fn module_value(
    &self,
    spec: &DependencySpec,
    package: &ResolvedPackage,
  ) -> Result<ModuleValue, VendorError> {
    let result = match &spec.exports {
      Some(keys) => DeclaredExports(ModuleValue::from_keys(keys.iter().cloned())).inspect(package),
      None => self.inspector.inspect(package),
    };
    result.map_err(|err| VendorError::resolution(&spec.logical_name, err))
  }
}

fn append_watch_paths(package: &ResolvedPackage, watch_paths: &mut Vec<PathBuf>) {
  watch_paths.push(package.root.clone());
  let manifest = package.root.join(PACKAGE_MANIFEST_FILE);
  if manifest.exists() {
    watch_paths.push(manifest);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::RegistrationError;
  use crate::project::VendorLayout;
  use crate::resolver::NodeModulesResolver;
  use crate::selection::{DependencySelection, IncludeAll};
  use std::path::Path;
  use tempfile::tempdir;

  fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
  }

  fn project() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    write(
      dir.path(),
      "node_modules/markdown/markdown.js",
      "exports.render = render;\nexports.toHTML = toHTML;\nexports.markdown = self;",
    );
    write(
      dir.path(),
      "node_modules/markdown/package.json",
      r#"{"name": "markdown", "main": "markdown.js"}"#,
    );
    write(dir.path(), "node_modules/moment/moment.js", "module.exports = { utc, locale };");
    write(dir.path(), "node_modules/moment/package.json", r#"{"main": "./moment"}"#);
    dir
  }

  #[test]
  fn builds_registrations_for_every_spec() {
    let dir = project();
    let layout = VendorLayout::default();
    let context = BuildContext::new(dir.path(), &layout);
    let builder = VendorBuilder::new(context.clone(), NodeModulesResolver::new(dir.path()));
    let specs = vec![
      DependencySpec::new("markdown", "markdown", "markdown"),
      DependencySpec::new("moment", "moment", "moment"),
    ];

    let artifacts = builder.build(&specs, &IncludeAll).unwrap();
    assert_eq!(artifacts.registrations.len(), 2);
    assert_eq!(artifacts.registrations[0].exports, vec!["default", "render", "toHTML"]);
    assert_eq!(artifacts.registrations[1].exports, vec!["default", "locale", "utc"]);
    assert!(artifacts
      .watch_paths
      .contains(&dir.path().join("node_modules/markdown/package.json")));

    artifacts.write(&context).unwrap();
    assert!(dir.path().join("vendor/shims/markdown.js").is_file());
    assert!(dir.path().join("vendor/vendor-manifest.json").is_file());
  }

  #[test]
  fn collisions_fail_before_copying() {
    let dir = project();
    let layout = VendorLayout::default();
    let builder = VendorBuilder::new(
      BuildContext::new(dir.path(), &layout),
      NodeModulesResolver::new(dir.path()),
    );
    let specs = vec![
      DependencySpec::new("markdown", "markdown", "markdown"),
      DependencySpec::new("markdown", "moment", "moment"),
    ];

    let err = builder.build(&specs, &IncludeAll).unwrap_err();
    assert!(matches!(
      err,
      VendorError::Registration(RegistrationError::DuplicateModuleName { .. })
    ));
    assert!(!dir.path().join("vendor").exists());
  }

  #[test]
  fn blank_adapter_directory_never_touches_the_output_tree() {
    let dir = project();
    write(dir.path(), "vendor/app.js", "unrelated");
    let good = VendorLayout::default();
    let context = BuildContext::new(dir.path(), &good);
    let specs = vec![DependencySpec::new("markdown", "markdown", "markdown")];
    let artifacts = VendorBuilder::new(context.clone(), NodeModulesResolver::new(dir.path()))
      .build(&specs, &IncludeAll)
      .unwrap();

    let blank = VendorLayout {
      adapter_dir: String::new(),
      ..VendorLayout::default()
    };
    let blank_context = BuildContext::new(dir.path(), &blank);
    let err = VendorBuilder::new(blank_context.clone(), NodeModulesResolver::new(dir.path()))
      .build(&specs, &IncludeAll)
      .unwrap_err();
    assert!(matches!(
      err,
      VendorError::Registration(RegistrationError::InvalidLayout { .. })
    ));

    assert!(artifacts.write(&blank_context).is_err());
    assert!(dir.path().join("vendor/app.js").is_file());
    assert!(dir.path().join("vendor/markdown/markdown.js").is_file());
  }

  #[test]
  fn explicit_exports_skip_inspection() {
    let dir = project();
    let layout = VendorLayout::default();
    let builder = VendorBuilder::new(
      BuildContext::new(dir.path(), &layout),
      NodeModulesResolver::new(dir.path()),
    );
    let mut spec = DependencySpec::new("moment", "moment", "moment");
    spec.exports = Some(vec!["duration".into()]);

    let artifacts = builder.build(&[spec], &IncludeAll).unwrap();
    assert_eq!(artifacts.registrations[0].exports, vec!["default", "duration"]);
  }

  #[test]
  fn custom_inspector_is_used() {
    let dir = project();
    let layout = VendorLayout::default();
    let builder = VendorBuilder::new(
      BuildContext::new(dir.path(), &layout),
      NodeModulesResolver::new(dir.path()),
    )
    .with_inspector(DeclaredExports(ModuleValue::from_keys(["a"])));

    let artifacts = builder
      .build(&[DependencySpec::new("moment", "moment", "moment")], &IncludeAll)
      .unwrap();
    assert_eq!(artifacts.registrations[0].exports, vec!["default", "a"]);
  }

  #[test]
  fn deselected_adapters_are_pruned() {
    let dir = project();
    let layout = VendorLayout::default();
    let context = BuildContext::new(dir.path(), &layout);
    let builder = VendorBuilder::new(context.clone(), NodeModulesResolver::new(dir.path()));
    let specs = vec![
      DependencySpec::new("markdown", "markdown", "markdown"),
      DependencySpec::new("moment", "moment", "moment"),
    ];

    builder.build(&specs, &IncludeAll).unwrap().write(&context).unwrap();
    assert!(dir.path().join("vendor/shims/moment.js").exists());

    let only_markdown = DependencySelection::from_lists(vec!["markdown".into()], Vec::new());
    let artifacts = builder.build(&specs, &only_markdown).unwrap();
    artifacts.write(&context).unwrap();

    assert!(dir.path().join("vendor/shims/markdown.js").exists());
    assert!(!dir.path().join("vendor/shims/moment.js").exists());
    assert_eq!(artifacts.bundle_manifest.registrations.len(), 1);
  }

  #[test]
  fn check_resolves_without_writing() {
    let dir = project();
    let layout = VendorLayout::default();
    let builder = VendorBuilder::new(
      BuildContext::new(dir.path(), &layout),
      NodeModulesResolver::new(dir.path()),
    );

    let packages = builder
      .check(&[DependencySpec::new("markdown", "markdown", "markdown")], &IncludeAll)
      .unwrap();
    assert_eq!(packages[0].manifest.name.as_deref(), Some("markdown"));
    assert!(!dir.path().join("vendor").exists());

    let err = builder
      .check(&[DependencySpec::new("pad", "left-pad", "pad")], &IncludeAll)
      .unwrap_err();
    assert_eq!(err.logical_name(), Some("pad"));
  }
}
