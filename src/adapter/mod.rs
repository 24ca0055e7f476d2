//! Adapter generation: discovering a package's exports and rendering the loader shim.

mod inspect;
mod render;

pub use inspect::{DeclaredExports, ModuleInspector, SourceScanInspector, scan_exported_keys};
pub use render::generate_adapter;
