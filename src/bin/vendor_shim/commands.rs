//! Command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use vendor_shim_bundler::manifest::load_manifest;
use vendor_shim_bundler::selection::DEFAULT_SELECTION_FILE;
use vendor_shim_bundler::{
  BuildContext, DependencySelection, NodeModulesResolver, ProjectConfig, VendorBuilder,
  VendorLayout,
};

use crate::cli::{BuildArgs, SelectArgs, ShowArgs};

/// Project root, configuration and layout shared by every command.
pub struct Session {
  project_root: PathBuf,
  config: ProjectConfig,
  layout: VendorLayout,
}

impl Session {
  pub fn load(project: &Path, config_path: Option<&Path>) -> Result<Self> {
    let project_root = project
      .canonicalize()
      .with_context(|| format!("project directory {} not found", project.display()))?;

    let config = match config_path {
      Some(path) => ProjectConfig::from_path(path)?,
      None => ProjectConfig::discover(&project_root)?,
    };
    let layout = config.to_layout();

    Ok(Self {
      project_root,
      config,
      layout,
    })
  }

  fn context(&self) -> BuildContext<'_> {
    BuildContext::new(&self.project_root, &self.layout)
  }

  fn resolver(&self) -> NodeModulesResolver {
    NodeModulesResolver::new(self.config.resolve_from_path(&self.project_root))
      .with_overrides(self.config.package_path_overrides(&self.project_root))
  }

  fn selection(&self, args: &SelectArgs) -> Result<(DependencySelection, DependencySelection)> {
    let local =
      DependencySelection::load_from_path(self.project_root.join(DEFAULT_SELECTION_FILE))?;
    let flags = DependencySelection::from_lists(args.only.clone(), args.skip.clone());
    Ok((local, flags))
  }
}

pub fn build(session: &Session, args: BuildArgs) -> Result<()> {
  if session.config.dependencies.is_empty() {
    tracing::warn!("no dependencies declared in {}", session.project_root.display());
  }

  let selection = session.selection(&args.select)?;
  let context = session.context();
  let builder = VendorBuilder::new(context.clone(), session.resolver());
  let artifacts = builder.build(&session.config.dependencies, &selection)?;
  artifacts.write(&context)?;

  for (entry, registration) in artifacts.entries.iter().zip(&artifacts.registrations) {
    println!(
      "{} -> {} ({} file(s), exports: {})",
      registration.module_name,
      registration.adapter_file,
      entry.copied_files.len(),
      registration.exports.join(", ")
    );
  }
  println!("Wrote {}", context.manifest_path().display());

  if args.print_manifest {
    println!("{}", artifacts.bundle_manifest_json()?);
  }
  Ok(())
}

pub fn check(session: &Session, args: SelectArgs) -> Result<()> {
  let selection = session.selection(&args)?;
  let builder = VendorBuilder::new(session.context(), session.resolver());
  let packages = builder.check(&session.config.dependencies, &selection)?;

  for package in &packages {
    let version = package.manifest.version.as_deref().unwrap_or("unversioned");
    println!(
      "ok {}@{} {}",
      package.identifier,
      version,
      package.root.display()
    );
  }
  println!("resolved {} dependencies", packages.len());
  Ok(())
}

pub fn show(session: &Session, args: ShowArgs) -> Result<()> {
  let path = session.context().manifest_path();
  let manifest = load_manifest(&path)?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&manifest)?);
    return Ok(());
  }

  for registration in &manifest.registrations {
    println!("{}", registration.module_name);
    for file in &registration.vendor_files {
      println!("  vendor  {file}");
    }
    println!("  adapter {}", registration.adapter_file);
    println!("  exports {}", registration.exports.join(", "));
  }
  Ok(())
}
