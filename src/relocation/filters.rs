use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use walkdir::{DirEntry, WalkDir};

use crate::resolver::PACKAGE_INSTALL_DIR;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Filename pattern selecting which package files are relocated.
///
/// Patterns are matched against the path relative to the source directory and `*` never
/// crosses a separator, so `*.js` only selects top-level files while `**/*.js` reaches
/// into subdirectories.
#[derive(Debug, Clone)]
pub struct FileFilter {
  raw: String,
  pattern: Pattern,
}

impl FileFilter {
  /// Compile a filter pattern.
  pub fn new(raw: &str) -> Result<Self, PatternError> {
    let raw = raw.trim().trim_start_matches("./");
    Ok(Self {
      raw: raw.to_string(),
      pattern: Pattern::new(raw)?,
    })
  }

  /// The pattern as written.
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// Whether a source-relative path is selected.
  pub fn matches(&self, relative: &Path) -> bool {
    self.pattern.matches_path_with(relative, MATCH_OPTIONS)
  }
}

/// Walk `source` and return every selected file, relative to `source`, sorted.
///
/// Dot-prefixed entries and nested install directories are never candidates.
pub fn collect_matching_files(
  source: &Path,
  filter: &FileFilter,
) -> Result<Vec<PathBuf>, walkdir::Error> {
  let mut matches = Vec::new();
  let walker = WalkDir::new(source)
    .min_depth(1)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| entry.depth() == 0 || is_candidate(entry));

  for entry in walker {
    let entry = entry?;
    if !is_regular_file(&entry) {
      continue;
    }
    let Ok(relative) = entry.path().strip_prefix(source) else {
      continue;
    };
    if filter.matches(relative) {
      matches.push(relative.to_path_buf());
    }
  }

  matches.sort();
  Ok(matches)
}

fn is_candidate(entry: &DirEntry) -> bool {
  let name = entry.file_name().to_string_lossy();
  if name.starts_with('.') {
    return false;
  }
  !(entry.file_type().is_dir() && name == PACKAGE_INSTALL_DIR)
}

fn is_regular_file(entry: &DirEntry) -> bool {
  if entry.file_type().is_file() {
    return true;
  }
  entry.path_is_symlink() && fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
}
