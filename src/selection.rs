//! Helpers used to filter which declared dependencies take part in a build.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::DependencySpec;

/// Trait describing selection filters for declared dependencies.
pub trait DependencyInclusion {
  /// Returns `true` when the dependency with this logical name should be processed.
  fn is_included(&self, logical_name: &str) -> bool;

  /// Keep the specs accepted by this filter, preserving declaration order.
  fn select<'s>(&self, specs: &'s [DependencySpec]) -> Vec<&'s DependencySpec> {
    specs
      .iter()
      .filter(|spec| self.is_included(&spec.logical_name))
      .collect()
  }
}

/// Selection that accepts every dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl DependencyInclusion for IncludeAll {
  fn is_included(&self, _logical_name: &str) -> bool {
    true
  }
}

impl<A: DependencyInclusion, B: DependencyInclusion> DependencyInclusion for (A, B) {
  fn is_included(&self, logical_name: &str) -> bool {
    self.0.is_included(logical_name) && self.1.is_included(logical_name)
  }
}

/// Default local selection file searched for in the project root.
pub const DEFAULT_SELECTION_FILE: &str = "vendor.local.json";

#[derive(Debug, Default, Deserialize)]
struct DependencySelectionFile {
  #[serde(default)]
  include: Vec<String>,
  #[serde(default)]
  exclude: Vec<String>,
}

/// Include/exclude rules over logical module names.
#[derive(Debug, Clone, Default)]
pub struct DependencySelection {
  include: Option<BTreeSet<String>>,
  exclude: BTreeSet<String>,
}

/// Errors that can occur while loading the selection file.
#[derive(Debug, Error)]
pub enum SelectionError {
  /// Failed to read the selection file from disk.
  #[error("failed to read {}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse the JSON selection file.
  #[error("failed to parse {}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
}

impl DependencySelection {
  /// Build a selection from explicit include and exclude lists.
  pub fn from_lists(
    include: impl IntoIterator<Item = String>,
    exclude: impl IntoIterator<Item = String>,
  ) -> Self {
    let include = normalise_list(include);
    let exclude = normalise_list(exclude);
    Self {
      include: (!include.is_empty()).then_some(include),
      exclude,
    }
  }

  /// Load rules from the selection file if present. A missing file selects everything.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(SelectionError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let file: DependencySelectionFile =
      serde_json::from_str(&contents).map_err(|err| SelectionError::Parse {
        path: path.to_path_buf(),
        source: err,
      })?;
    Ok(Self::from_lists(file.include, file.exclude))
  }

  /// Returns true when no filtering rules are active.
  pub fn is_unfiltered(&self) -> bool {
    self.include.is_none() && self.exclude.is_empty()
  }
}

impl DependencyInclusion for DependencySelection {
  fn is_included(&self, logical_name: &str) -> bool {
    if self
      .exclude
      .iter()
      .any(|rule| scope_matches(rule, logical_name))
    {
      return false;
    }

    match &self.include {
      Some(include) => include.iter().any(|rule| scope_matches(rule, logical_name)),
      None => true,
    }
  }
}

/// Convert a list of raw names into a sorted, de-duplicated set.
fn normalise_list(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().trim_matches('/').to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

fn scope_matches(rule: &str, candidate: &str) -> bool {
  if candidate == rule {
    return true;
  }

  candidate
    .strip_prefix(rule)
    .is_some_and(|suffix| suffix.starts_with('/'))
}
