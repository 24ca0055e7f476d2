use std::collections::BTreeSet;

use crate::models::{AdapterSnippet, ModuleValue};

/// Build the loader registration for `module_name`.
///
/// Every enumerable key of `module` becomes a named export read off `default_export_ref`,
/// except the package's own identifier and `default`, which always maps to the reference
/// itself. Keys are emitted in sorted order so identical inputs give identical output.
pub fn generate_adapter(
  module_name: &str,
  package_identifier: &str,
  default_export_ref: &str,
  module: &ModuleValue,
) -> AdapterSnippet {
  let exported_symbols: BTreeSet<String> = module
    .keys
    .iter()
    .filter(|key| key.as_str() != package_identifier && key.as_str() != "default")
    .cloned()
    .collect();

  let source = render_adapter_source(module_name, default_export_ref, &exported_symbols);

  AdapterSnippet {
    module_name: module_name.to_string(),
    exported_symbols,
    default_export: default_export_ref.to_string(),
    source,
  }
}

fn render_adapter_source(
  module_name: &str,
  default_export_ref: &str,
  exported_symbols: &BTreeSet<String>,
) -> String {
  let mut members = vec![format!("      'default': {default_export_ref},")];
  for symbol in exported_symbols {
    let literal = js_string(symbol);
    members.push(format!(
      "      {literal}: {default_export_ref}[{literal}],"
    ));
  }
  members.push("      __esModule: true,".to_string());

  format!(
    r#"// Generated at build time by vendor-shim. Do not edit.
(function() {{
  function vendorModule() {{
    'use strict';

    return {{
{members}
    }};
  }}

  define({name}, [], vendorModule);
}})();
"#,
    members = members.join("\n"),
    name = js_string(module_name),
  )
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}
