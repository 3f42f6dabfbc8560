//! I/O surface: writing the Manifest audit artifact. The Manifest is the
//! only artifact this crate persists (spec §6); everything upstream of
//! it (document content, scored evidence) is owned by the collaborator
//! implementations.

pub mod manifest_writer;

pub use manifest_writer::{render_manifest, write_manifest};
