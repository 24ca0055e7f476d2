//! Error types surfaced while relocating and registering vendored packages.
//!
//! Every failure is fatal for the build pass. Resolution and relocation failures are
//! wrapped in [`VendorError`] together with the logical name of the dependency that
//! triggered them so the invoking build can point at the offending declaration.

use std::path::PathBuf;

use thiserror::Error;

/// The package (or part of it) could not be located on disk.
#[derive(Debug, Error)]
pub enum ResolutionError {
  /// No installed copy of the package was found.
  #[error("package `{package}` is not installed (searched {})", display_searched(.searched))]
  NotInstalled {
    /// Package identifier that was looked up.
    package: String,
    /// Directories probed while resolving.
    searched: Vec<PathBuf>,
  },
  /// The package directory exists but its `package.json` is malformed.
  #[error("failed to parse {}", .path.display())]
  InvalidPackageManifest {
    /// Path to the offending `package.json`.
    path: PathBuf,
    /// Parse failure.
    #[source]
    source: serde_json::Error,
  },
  /// The package directory exists but its `package.json` could not be read.
  #[error("failed to read {}", .path.display())]
  UnreadablePackageManifest {
    /// Path to the `package.json`.
    path: PathBuf,
    /// I/O failure.
    #[source]
    source: std::io::Error,
  },
  /// The configured source subdirectory escapes the package root.
  #[error("source subdirectory `{subdirectory}` must stay inside {}", .root.display())]
  InvalidSourceSubdirectory {
    /// Package root.
    root: PathBuf,
    /// Offending subdirectory.
    subdirectory: String,
  },
  /// The configured source subdirectory does not exist inside the package.
  #[error("source directory {} does not exist", .path.display())]
  MissingSourceDirectory {
    /// Expected directory.
    path: PathBuf,
  },
  /// The package entry file could not be read for export inspection.
  #[error("failed to read package entry {}", .path.display())]
  UnreadableEntry {
    /// Entry file path.
    path: PathBuf,
    /// I/O failure.
    #[source]
    source: std::io::Error,
  },
}

/// Copying the filtered package files into the output tree failed.
#[derive(Debug, Error)]
pub enum RelocationError {
  /// The filter selected nothing, which almost always means a misconfigured dependency.
  #[error("file filter `{filter}` matched no files under {}", .source_directory.display())]
  NoMatchingFiles {
    /// Filter pattern as declared.
    filter: String,
    /// Directory that was scanned.
    source_directory: PathBuf,
  },
  /// The filter is not a valid glob pattern.
  #[error("invalid file filter `{filter}`")]
  InvalidFilter {
    /// Filter pattern as declared.
    filter: String,
    /// Pattern parse failure.
    #[source]
    source: glob::PatternError,
  },
  /// Scanning the package directory failed.
  #[error("failed to scan {}", .path.display())]
  Scan {
    /// Path being walked.
    path: PathBuf,
    /// Walk failure.
    #[source]
    source: walkdir::Error,
  },
  /// The destination could not be written.
  #[error("destination {} is not writable", .path.display())]
  Unwritable {
    /// Destination path.
    path: PathBuf,
    /// I/O failure.
    #[source]
    source: std::io::Error,
  },
}

/// Invalid declarations detected before any file is touched.
#[derive(Debug, Error)]
pub enum RegistrationError {
  /// Two specs expose the same module name.
  #[error("module name `{logical_name}` is declared more than once")]
  DuplicateModuleName {
    /// Colliding logical name.
    logical_name: String,
  },
  /// A destination subdirectory escapes the output tree or is empty.
  #[error("`{logical_name}` has an invalid destination subdirectory `{destination}`")]
  InvalidDestination {
    /// Spec being validated.
    logical_name: String,
    /// Offending destination.
    destination: String,
  },
  /// A destination subdirectory is reserved for generated adapters.
  #[error("`{logical_name}` cannot relocate into the adapter directory `{destination}`")]
  ReservedDestination {
    /// Spec being validated.
    logical_name: String,
    /// Offending destination.
    destination: String,
  },
  /// Two logical names map onto the same adapter file.
  #[error("`{first}` and `{second}` would both write the adapter `{adapter_file}`")]
  AdapterCollision {
    /// Spec declared first.
    first: String,
    /// Spec declared second.
    second: String,
    /// Shared adapter path, relative to the adapter directory.
    adapter_file: String,
  },
  /// The output or adapter directory is empty, `.` or leaves its parent.
  #[error("`{setting}` must name a subdirectory, got `{value}`")]
  InvalidLayout {
    /// Layout setting being validated.
    setting: &'static str,
    /// Offending value.
    value: String,
  },
  /// Two specs write into the same (or nested) destination subdirectories.
  #[error("`{first}` and `{second}` share the destination subdirectory `{destination}`")]
  OverlappingDestination {
    /// Spec declared first.
    first: String,
    /// Spec declared second.
    second: String,
    /// Shared destination.
    destination: String,
  },
}

/// Failures while loading project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The configuration file exists but could not be read.
  #[error("failed to read {}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// JSON configuration failed to parse.
  #[error("failed to parse {}", .path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// YAML configuration failed to parse.
  #[error("failed to parse {}", .path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
}

/// Top-level error returned by the build operations.
#[derive(Debug, Error)]
pub enum VendorError {
  /// A dependency could not be resolved.
  #[error("failed to resolve `{logical_name}`")]
  Resolution {
    /// Logical name of the failing spec.
    logical_name: String,
    /// Underlying resolution failure.
    #[source]
    source: ResolutionError,
  },
  /// A dependency could not be relocated.
  #[error("failed to relocate `{logical_name}`")]
  Relocation {
    /// Logical name of the failing spec.
    logical_name: String,
    /// Underlying relocation failure.
    #[source]
    source: RelocationError,
  },
  /// The declared specs are inconsistent.
  #[error(transparent)]
  Registration(#[from] RegistrationError),
}

impl VendorError {
  /// Wrap a resolution failure for the given spec.
  pub fn resolution(logical_name: &str, source: ResolutionError) -> Self {
    Self::Resolution {
      logical_name: logical_name.to_string(),
      source,
    }
  }

  /// Wrap a relocation failure for the given spec.
  pub fn relocation(logical_name: &str, source: RelocationError) -> Self {
    Self::Relocation {
      logical_name: logical_name.to_string(),
      source,
    }
  }

  /// Logical name of the dependency that caused the failure, when there is exactly one.
  pub fn logical_name(&self) -> Option<&str> {
    match self {
      Self::Resolution { logical_name, .. } | Self::Relocation { logical_name, .. } => {
        Some(logical_name.as_str())
      }
      Self::Registration(RegistrationError::DuplicateModuleName { logical_name })
      | Self::Registration(RegistrationError::InvalidDestination { logical_name, .. })
      | Self::Registration(RegistrationError::ReservedDestination { logical_name, .. }) => {
        Some(logical_name.as_str())
      }
      Self::Registration(RegistrationError::AdapterCollision { second, .. }) => {
        Some(second.as_str())
      }
      Self::Registration(RegistrationError::OverlappingDestination { .. })
      | Self::Registration(RegistrationError::InvalidLayout { .. }) => None,
    }
  }
}

fn display_searched(searched: &[PathBuf]) -> String {
  if searched.is_empty() {
    return "nothing".to_string();
  }
  searched
    .iter()
    .map(|path| path.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}
