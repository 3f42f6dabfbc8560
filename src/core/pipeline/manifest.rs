//! The Manifest: the sole audit artifact. Built incrementally by the
//! orchestrator, emitted whether the run succeeds or aborts (spec §4.1,
//! §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the overall run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    /// Every active phase completed successfully.
    Success,
    /// Some phase's envelope failed; the pipeline halted there.
    Aborted,
}

/// The result of one validation pass (input or output contract check).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValidationOutcome {
    /// Whether every check passed.
    pub passed: bool,
    /// Structured list of failure messages; empty when `passed`.
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    /// A passing outcome with no errors.
    pub fn ok() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
        }
    }

    /// A failing outcome carrying the given error messages.
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            passed: false,
            errors,
        }
    }
}

/// One phase's audit entry: timing, validation outcomes, invariants
/// checked, and the terminal error if the phase failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Index of the phase this record describes.
    pub phase_index: usize,
    /// Human-readable phase name, for log/manifest readability.
    pub phase_name: String,
    /// UTC start timestamp.
    pub started_at: DateTime<Utc>,
    /// UTC completion timestamp.
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration, in milliseconds, measured on a monotonic clock.
    pub duration_ms: u64,
    /// Result of the input contract check.
    pub input_validation_result: ValidationOutcome,
    /// Result of the output contract check.
    pub output_validation_result: ValidationOutcome,
    /// Names of the invariants checked after execution.
    pub invariants_checked: Vec<String>,
    /// The terminal error message, if this phase failed.
    pub error_message: Option<String>,
    /// Free-form artifact descriptors (counts, diagnostics) the phase
    /// wants recorded for audit purposes.
    pub artifacts: Vec<String>,
}

impl PhaseRecord {
    /// Whether this phase completed without error.
    pub fn succeeded(&self) -> bool {
        self.error_message.is_none()
            && self.input_validation_result.passed
            && self.output_validation_result.passed
    }
}

/// The append-only audit record of a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Hash of the validated configuration.
    pub config_hash: String,
    /// Hash of the loaded questionnaire.
    pub questionnaire_hash: String,
    /// One record per executed phase, in execution order.
    pub phase_records: Vec<PhaseRecord>,
    /// Overall outcome of the run.
    pub overall_status: OverallStatus,
    /// Reference to the terminal error, if the run aborted: `"phase:index"`.
    pub terminal_error: Option<String>,
}

impl Manifest {
    /// Starts a new manifest for a run, defaulting to `Success` until a
    /// phase reports otherwise.
    pub fn new(config_hash: String, questionnaire_hash: String) -> Self {
        Self {
            config_hash,
            questionnaire_hash,
            phase_records: Vec::new(),
            overall_status: OverallStatus::Success,
            terminal_error: None,
        }
    }

    /// Appends a phase record, marking the manifest aborted if the phase
    /// failed. Once aborted, the status never reverts to `Success`.
    pub fn record(&mut self, record: PhaseRecord) {
        if !record.succeeded() {
            self.overall_status = OverallStatus::Aborted;
            self.terminal_error = Some(format!(
                "phase:{}",
                record.phase_index
            ));
        }
        self.phase_records.push(record);
    }

    /// The phase index of the terminal failure, if any, for process
    /// exit-code encoding (spec §6).
    pub fn terminal_phase_index(&self) -> Option<usize> {
        self.phase_records
            .iter()
            .find(|r| !r.succeeded())
            .map(|r| r.phase_index)
    }
}
