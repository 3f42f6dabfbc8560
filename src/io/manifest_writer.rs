//! Canonical manifest serialization: the Manifest is the sole audit
//! artifact (spec §4.1, §6), so writing it out is the only I/O concern
//! this crate owns beyond the collaborator boundary.

use std::path::Path;

use crate::core::errors::{PipelineError, Result};
use crate::core::pipeline::Manifest;

/// Serializes `manifest` to pretty-printed, canonically key-ordered JSON
/// and writes it to `path`. Key order follows [`serde_json::Value`]'s
/// default `BTreeMap`-backed `Map`, the same canonicalization used for
/// content hashing.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    let value = serde_json::to_value(manifest)?;
    let bytes = serde_json::to_vec_pretty(&value)?;
    std::fs::write(path, bytes).map_err(|e| PipelineError::io(format!("writing {}", path.display()), e))
}

/// Renders `manifest` to a canonical JSON string without touching disk,
/// for callers that want to ship it over a different transport.
pub fn render_manifest(manifest: &Manifest) -> Result<String> {
    let value = serde_json::to_value(manifest)?;
    serde_json::to_string_pretty(&value).map_err(PipelineError::from)
}
