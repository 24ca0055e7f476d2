use std::collections::BTreeSet;
use std::fs;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ResolutionError;
use crate::models::ModuleValue;
use crate::resolver::ResolvedPackage;

/// Produces the enumerable keys of a resolved package's module value.
pub trait ModuleInspector {
  /// Inspect the package and report its top-level keys.
  fn inspect(&self, package: &ResolvedPackage) -> Result<ModuleValue, ResolutionError>;
}

/// Inspector that reads the package entry file and collects statically declared exports.
///
/// Recognised forms:
/// `exports.x = ...`, `module.exports.x = ...`, `module.exports = { a, b: c, d() {} }`,
/// `export function|const|let|var|class x` and `export { a, b as c }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceScanInspector;

impl ModuleInspector for SourceScanInspector {
  fn inspect(&self, package: &ResolvedPackage) -> Result<ModuleValue, ResolutionError> {
    let entry = package.entry_file();
    let source = fs::read_to_string(&entry).map_err(|source| ResolutionError::UnreadableEntry {
      path: entry.clone(),
      source,
    })?;
    let keys = scan_exported_keys(&source);
    if keys.is_empty() {
      tracing::warn!(
        "no exports detected in {}; only the default export will be registered",
        entry.display()
      );
    }
    Ok(ModuleValue { keys })
  }
}

/// Inspector returning a fixed key list.
#[derive(Debug, Clone, Default)]
pub struct DeclaredExports(pub ModuleValue);

impl ModuleInspector for DeclaredExports {
  fn inspect(&self, _package: &ResolvedPackage) -> Result<ModuleValue, ResolutionError> {
    Ok(self.0.clone())
  }
}

struct ExportPatterns {
  property_assignment: Regex,
  object_assignment: Regex,
  declaration: Regex,
  export_list: Regex,
  identifier: Regex,
}

fn export_patterns() -> &'static ExportPatterns {
  static PATTERNS: OnceLock<ExportPatterns> = OnceLock::new();
  PATTERNS.get_or_init(|| ExportPatterns {
    property_assignment: Regex::new(
      r"(?m)^\s*(?:module\s*\.\s*)?exports\s*\.\s*([A-Za-z_$][\w$]*)\s*=[^=]",
    )
    .expect("invalid property assignment regex"),
    object_assignment: Regex::new(r"module\s*\.\s*exports\s*=\s*\{")
      .expect("invalid object assignment regex"),
    declaration: Regex::new(
      r"(?m)^\s*export\s+(?:async\s+)?(?:function\s*\*?|const|let|var|class)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("invalid declaration regex"),
    export_list: Regex::new(r"(?s)(?:^|[;\s])export\s*\{([^}]*)\}")
      .expect("invalid export list regex"),
    identifier: Regex::new(r"^[A-Za-z_$][\w$]*$").expect("invalid identifier regex"),
  })
}

/// Collect the statically visible export names from JavaScript source.
pub fn scan_exported_keys(source: &str) -> BTreeSet<String> {
  let patterns = export_patterns();
  let mut keys = BTreeSet::new();

  for caps in patterns.property_assignment.captures_iter(source) {
    keys.insert(caps[1].to_string());
  }
  for caps in patterns.declaration.captures_iter(source) {
    keys.insert(caps[1].to_string());
  }
  for opening in patterns.object_assignment.find_iter(source) {
    for member in object_literal_members(&source[opening.end()..]) {
      if let Some(key) = object_member_key(member, &patterns.identifier) {
        keys.insert(key);
      }
    }
  }
  for caps in patterns.export_list.captures_iter(source) {
    for member in split_members(&caps[1]) {
      let exported = member
        .rsplit_once(" as ")
        .map_or(member, |(_, alias)| alias)
        .trim();
      if exported != "default" && patterns.identifier.is_match(exported) {
        keys.insert(exported.to_string());
      }
    }
  }

  keys
}

fn split_members(body: &str) -> impl Iterator<Item = &str> {
  body.split(',').map(str::trim).filter(|member| !member.is_empty())
}

/// Members of the object literal whose opening brace sits just before `rest`.
///
/// Only commas at the literal's own depth separate members; nested brackets and string
/// literals are skipped. Scanning stops at the matching close brace. An unterminated
/// literal yields the members completed so far.
fn object_literal_members(rest: &str) -> Vec<&str> {
  let mut members = Vec::new();
  let mut depth = 0usize;
  let mut quote: Option<char> = None;
  let mut escaped = false;
  let mut start = 0;

  for (index, c) in rest.char_indices() {
    if let Some(open) = quote {
      if escaped {
        escaped = false;
      } else if c == '\\' {
        escaped = true;
      } else if c == open {
        quote = None;
      }
      continue;
    }

    match c {
      '"' | '\'' | '`' => quote = Some(c),
      '{' | '[' | '(' => depth += 1,
      '}' | ']' | ')' if depth > 0 => depth -= 1,
      '}' => {
        members.push(&rest[start..index]);
        break;
      }
      ',' if depth == 0 => {
        members.push(&rest[start..index]);
        start = index + 1;
      }
      _ => {}
    }
  }

  members
    .into_iter()
    .map(str::trim)
    .filter(|member| !member.is_empty())
    .collect()
}

/// Key of a shorthand, `key: value` or method member of an object literal.
fn object_member_key(member: &str, identifier: &Regex) -> Option<String> {
  let member = ["async ", "get ", "set ", "*"]
    .iter()
    .find_map(|prefix| member.strip_prefix(prefix))
    .unwrap_or(member)
    .trim_start();
  let head = member
    .split(|c: char| c == ':' || c == '(')
    .next()
    .unwrap_or(member)
    .trim()
    .trim_matches(|c: char| c == '"' || c == '\'');
  identifier.is_match(head).then(|| head.to_string())
}
