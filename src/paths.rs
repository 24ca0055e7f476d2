//! Bundle-relative path helpers shared by relocation and registration.

use std::path::{Component, Path};

/// Produce the bundle-relative path for a relocated file.
///
/// The generated path always uses forward slashes so that the resulting manifest works on
/// every platform, regardless of the native directory separator that was used when the
/// files were discovered on disk.
pub fn bundle_path(output_prefix: &str, dest_subdirectory: &str, relative: &Path) -> String {
  let relative = relative.to_string_lossy().replace('\\', "/");
  [output_prefix, dest_subdirectory, relative.as_str()]
    .iter()
    .map(|segment| segment.replace('\\', "/"))
    .map(|segment| segment.trim_matches('/').to_string())
    .filter(|segment| !segment.is_empty())
    .collect::<Vec<_>>()
    .join("/")
}

/// Normalise a destination subdirectory so it stays inside the output tree.
///
/// Returns `None` for empty, absolute or parent-escaping values.
pub fn normalise_subdirectory(value: &str) -> Option<String> {
  let value = value.replace('\\', "/");
  let path = Path::new(&value);
  let mut segments = Vec::new();
  for component in path.components() {
    match component {
      Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
      Component::CurDir => {}
      Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
    }
  }
  (!segments.is_empty()).then(|| segments.join("/"))
}

/// Whether two normalised subdirectories are equal or one contains the other.
pub fn subdirectories_overlap(left: &str, right: &str) -> bool {
  let nested = |outer: &str, inner: &str| {
    inner
      .strip_prefix(outer)
      .is_some_and(|suffix| suffix.is_empty() || suffix.starts_with('/'))
  };
  nested(left, right) || nested(right, left)
}
