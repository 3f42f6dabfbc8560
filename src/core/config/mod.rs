//! Configuration types for polidoc-pipeline.
//!
//! Callers build a [`RawConfig`] (plain, `serde`-deserializable, loadable
//! through the `config` crate from YAML/JSON/TOML) and pass it to phase 0.
//! Phase 0 is the only place a `RawConfig` turns into a validated,
//! read-only [`Config`] — the rest of the pipeline never sees the raw form.

pub mod aggregation_settings;
pub mod questionnaire;
pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use aggregation_settings::{AggregationSettings, ExpectedCounts, RubricThresholds};
pub use questionnaire::{Questionnaire, WeightTable};

use self::validation::validate_positive_u64;
use crate::core::errors::{PipelineError, Result};

/// The phase indices the orchestrator is permitted to run, in order.
/// Fixed by spec: phase 2 is permanently reserved and must never appear.
pub const CANONICAL_ACTIVE_PHASES: [usize; 7] = [0, 1, 3, 4, 5, 6, 7];

/// Per-phase timeout and a soft memory ceiling (spec §5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Wall-clock budget for a single phase, in milliseconds.
    pub phase_timeout_ms: u64,
    /// Advisory memory ceiling in megabytes; exceeding it is logged, not
    /// fatal, unless a future caller opts into treating it as fatal.
    pub memory_limit_mb: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            phase_timeout_ms: 30_000,
            memory_limit_mb: 2_048,
        }
    }
}

/// The caller-supplied, not-yet-validated configuration. Deserializable
/// from whatever format the `config` crate's layered loader resolves
/// (file, environment, defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// Path to the source document phase 1's ingester will read.
    pub document_path: PathBuf,
    /// Path to the questionnaire file phase 0's loader will read.
    pub questionnaire_path: PathBuf,
    /// Declared questionnaire hash, 64 lowercase hex characters.
    pub questionnaire_hash: String,
    /// Calibration profile identifier; resolution is an external
    /// collaborator concern, phase 0 only confirms it is non-empty.
    pub calibration_profile: String,
    /// Executor reference identifier; same treatment as the calibration
    /// profile.
    pub executor_reference: String,
    /// Per-phase timeout and memory ceiling.
    #[serde(default)]
    pub resource_limits: ResourceLimits,
    /// Whether a coverage shortfall at phase 4 aborts the run (`true`) or
    /// degrades to an invalid `DimensionScore` (`false`).
    #[serde(default)]
    pub abort_on_insufficient: bool,
    /// The phases this run will execute. Must equal
    /// [`CANONICAL_ACTIVE_PHASES`] exactly; anything else, including the
    /// presence of phase 2, is a fatal configuration error.
    pub active_phases: Vec<usize>,
}

/// The validated, read-only configuration phase 0 produces. Every other
/// phase receives only this type, never [`RawConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the source document.
    pub document_path: PathBuf,
    /// Path to the questionnaire file (retained for manifest provenance).
    pub questionnaire_path: PathBuf,
    /// The declared questionnaire hash, already verified against the
    /// loaded questionnaire's computed hash.
    pub questionnaire_hash: String,
    /// Calibration profile identifier.
    pub calibration_profile: String,
    /// Executor reference identifier.
    pub executor_reference: String,
    /// Per-phase timeout and memory ceiling.
    pub resource_limits: ResourceLimits,
    /// Coverage-shortfall abort policy.
    pub abort_on_insufficient: bool,
    /// The loaded, hash-verified questionnaire.
    pub questionnaire: Questionnaire,
    /// Settings derived from the questionnaire.
    pub aggregation_settings: AggregationSettings,
}

impl RawConfig {
    /// Confirms the required string fields are non-empty and the document
    /// and questionnaire paths exist and are readable. Does not touch the
    /// questionnaire's contents or hash; that happens in phase 0 after the
    /// loader runs.
    pub fn validate_shape(&self) -> Result<()> {
        if self.questionnaire_hash.len() != 64
            || !self.questionnaire_hash.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(PipelineError::config_field(
                "questionnaire_hash must be 64 hex characters",
                "questionnaire_hash",
            ));
        }
        if self.calibration_profile.trim().is_empty() {
            return Err(PipelineError::config_field(
                "calibration_profile must not be empty",
                "calibration_profile",
            ));
        }
        if self.executor_reference.trim().is_empty() {
            return Err(PipelineError::config_field(
                "executor_reference must not be empty",
                "executor_reference",
            ));
        }
        if !self.document_path.exists() {
            return Err(PipelineError::config_field(
                format!("document path does not exist: {}", self.document_path.display()),
                "document_path",
            ));
        }
        if !self.questionnaire_path.exists() {
            return Err(PipelineError::config_field(
                format!(
                    "questionnaire path does not exist: {}",
                    self.questionnaire_path.display()
                ),
                "questionnaire_path",
            ));
        }
        validate_positive_u64(self.resource_limits.phase_timeout_ms, "resource_limits.phase_timeout_ms")?;
        validate_positive_u64(self.resource_limits.memory_limit_mb, "resource_limits.memory_limit_mb")?;
        Ok(())
    }

    /// Confirms `active_phases` is exactly `{0,1,3,4,5,6,7}`. Phase 2's
    /// presence gets a dedicated message naming it, per spec §4.3.
    pub fn validate_active_phases(&self) -> Result<()> {
        if self.active_phases.contains(&2) {
            return Err(PipelineError::config(
                "phase 2 is permanently reserved and forbidden in the active-phase set",
            ));
        }
        let mut sorted = self.active_phases.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted != CANONICAL_ACTIVE_PHASES {
            return Err(PipelineError::config(format!(
                "active_phases must equal exactly {CANONICAL_ACTIVE_PHASES:?}, got {sorted:?}"
            )));
        }
        Ok(())
    }
}

/// Loads a [`RawConfig`] from a file path via the `config` crate's layered
/// source resolution (format inferred from extension).
pub fn load_raw_config(path: &std::path::Path) -> Result<RawConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;
    settings
        .try_deserialize()
        .map_err(PipelineError::from)
}
