#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod manifest;
pub mod models;
pub mod paths;
pub mod project;
pub mod registration;
pub mod relocation;
pub mod resolver;
pub mod selection;

pub use adapter::{ModuleInspector, SourceScanInspector, generate_adapter};
pub use builder::{VendorArtifacts, VendorBuilder};
pub use config::ProjectConfig;
pub use error::{RegistrationError, RelocationError, ResolutionError, VendorError};
pub use models::{
  AdapterSnippet, BundleRegistration, DependencySpec, ModuleValue, RelocationManifestEntry,
};
pub use project::{BuildContext, LinkMode, VendorLayout};
pub use registration::{declare, register_for_bundling};
pub use relocation::relocate;
pub use resolver::{NodeModulesResolver, PackageResolver};
pub use selection::{DependencyInclusion, DependencySelection, IncludeAll};
