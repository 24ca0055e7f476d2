use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directory name packages are installed under.
pub const PACKAGE_INSTALL_DIR: &str = "node_modules";

/// Generate the directories probed when resolving a package identifier.
///
/// The search starts at `start` and walks every ancestor, looking for
/// `<dir>/node_modules/<package>`. Additional roots (global install locations, workspace
/// roots) are probed afterwards. The result is deterministic and free of duplicates.
pub fn generate_lookup_candidates(
  start: &Path,
  extra_roots: &[PathBuf],
  package_identifier: &str,
) -> Vec<PathBuf> {
  let relative = package_relative_path(package_identifier);
  if relative.as_os_str().is_empty() {
    return Vec::new();
  }

  let mut builder = CandidateBuilder::new(&relative);
  builder.add_ancestor_candidates(start);
  builder.add_extra_roots(extra_roots);
  builder.finish()
}

/// Convert a package identifier (`name` or `@scope/name`) into a relative directory.
fn package_relative_path(package_identifier: &str) -> PathBuf {
  package_identifier
    .trim()
    .trim_matches('/')
    .split('/')
    .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
    .collect()
}

struct CandidateBuilder<'a> {
  relative: &'a Path,
  seen: BTreeSet<PathBuf>,
  result: Vec<PathBuf>,
}

impl<'a> CandidateBuilder<'a> {
  fn new(relative: &'a Path) -> Self {
    Self {
      relative,
      seen: BTreeSet::new(),
      result: Vec::new(),
    }
  }

  fn add_ancestor_candidates(&mut self, start: &Path) {
    for ancestor in start.ancestors() {
      if ancestor.file_name().is_some_and(|name| name == PACKAGE_INSTALL_DIR) {
        continue;
      }
      self.push(ancestor.join(PACKAGE_INSTALL_DIR).join(self.relative));
    }
  }

  fn add_extra_roots(&mut self, roots: &[PathBuf]) {
    for root in roots {
      self.push(root.join(self.relative));
    }
  }

  fn finish(self) -> Vec<PathBuf> {
    self.result
  }

  fn push(&mut self, candidate: PathBuf) {
    if self.seen.insert(candidate.clone()) {
      self.result.push(candidate);
    }
  }
}
