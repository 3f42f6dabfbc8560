//! The eight-gate evaluation pipeline (spec §4): a shared Contract
//! Envelope wrapping each numbered gate, the append-only Manifest audit
//! trail, the shared rubric, and the orchestrator that sequences them.

pub mod envelope;
pub mod gates;
pub mod manifest;
pub mod orchestrator;
pub mod rubric;

pub use manifest::{Manifest, OverallStatus, PhaseRecord, ValidationOutcome};
pub use orchestrator::{run, RunInputs};
