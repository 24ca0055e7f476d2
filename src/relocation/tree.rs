//! Merging relocated files into an existing output tree.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use same_file::is_same_file;
use walkdir::WalkDir;

use crate::project::LinkMode;

/// Remove every entry below `root` that is not listed in `keep`, then drop directories
/// left empty. `root` itself always survives.
///
/// Returns the removed files and links, relative to `root`, in walk order.
pub fn prune_tree(root: &Path, keep: &BTreeSet<PathBuf>) -> io::Result<Vec<PathBuf>> {
  if !root.is_dir() {
    return Ok(Vec::new());
  }

  let mut removed = Vec::new();
  let walker = WalkDir::new(root)
    .min_depth(1)
    .contents_first(true)
    .sort_by_file_name();

  for entry in walker {
    let entry = entry.map_err(io::Error::from)?;
    let Ok(relative) = entry.path().strip_prefix(root) else {
      continue;
    };

    if entry.file_type().is_dir() {
      // Contents come first, so anything still inside is kept.
      if fs::read_dir(entry.path())?.next().is_none() {
        fs::remove_dir(entry.path())?;
      }
    } else if !keep.contains(relative) {
      fs::remove_file(entry.path())?;
      removed.push(relative.to_path_buf());
    }
  }

  Ok(removed)
}

/// Materialise `source` at `destination`, replacing whatever occupies that path.
///
/// Symlinks at the destination are removed rather than followed. A regular file that
/// already is the source (an earlier hard link) is left untouched.
pub fn install_file(source: &Path, destination: &Path, mode: LinkMode) -> io::Result<()> {
  match fs::symlink_metadata(destination) {
    Ok(meta) if meta.is_dir() => fs::remove_dir_all(destination)?,
    Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(destination)?,
    Ok(_) => {
      if is_same_file(source, destination)? {
        return Ok(());
      }
      fs::remove_file(destination)?;
    }
    Err(err) if err.kind() == ErrorKind::NotFound => {
      if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
      }
    }
    Err(err) => return Err(err),
  }

  if mode == LinkMode::Hardlink && fs::hard_link(source, destination).is_ok() {
    return Ok(());
  }
  fs::copy(source, destination).map(drop)
}
