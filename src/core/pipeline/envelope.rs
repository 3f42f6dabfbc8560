//! The Contract Envelope (spec §4.1): the uniform
//! `validate_input -> execute -> validate_output -> invariants -> record`
//! wrapper every gate runs through. Formalized as one generic function
//! instead of seven ad hoc call sites, each gate module supplies only its
//! validators, its transformation, and its invariant list.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::core::errors::{PipelineError, Result};

use super::manifest::{PhaseRecord, ValidationOutcome};

/// A named, pure predicate over a gate's output, run after `execute`
/// succeeds and `validate_output` passes.
pub struct Invariant<O> {
    /// Name recorded in the manifest's `invariants_checked` list.
    pub name: &'static str,
    /// The predicate itself.
    pub check: fn(&O) -> bool,
}

/// Runs one gate through the full envelope: input validation, execution
/// under a timeout, output validation, and invariant checks, producing
/// both the gate's output (on success) and its [`PhaseRecord`].
///
/// The envelope itself never recovers from a failure: any validation,
/// execution, or invariant error short-circuits with `None` and a failed
/// record. Timeout accounting wraps `execute` with
/// [`tokio::time::timeout`]; for the synchronous aggregation gates
/// (phases 0, 3, 5, 6, 7) `execute` is a ready future, so the timeout
/// still bounds total wall-clock time even though it cannot preempt pure
/// CPU work mid-computation.
pub async fn run_gate<I, O, Fut>(
    phase_index: usize,
    phase_name: &str,
    input: I,
    validate_input: impl FnOnce(&I) -> Vec<String>,
    execute: impl FnOnce(I) -> Fut,
    validate_output: impl FnOnce(&O) -> Vec<String>,
    invariants: &[Invariant<O>],
    timeout: Duration,
) -> (Option<O>, PhaseRecord)
where
    Fut: Future<Output = Result<O>>,
{
    let started_at = Utc::now();
    let clock = Instant::now();
    info!(phase = phase_index, name = phase_name, "gate starting");

    let input_errors = validate_input(&input);
    if !input_errors.is_empty() {
        warn!(phase = phase_index, errors = ?input_errors, "input validation failed");
        return finish(
            phase_index,
            phase_name,
            started_at,
            clock,
            ValidationOutcome::failed(input_errors),
            ValidationOutcome::ok(),
            Vec::new(),
            Some("input validation failed".to_string()),
            None,
        );
    }

    let executed = match tokio::time::timeout(timeout, execute(input)).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            error!(phase = phase_index, error = %err, "gate execution failed");
            return finish(
                phase_index,
                phase_name,
                started_at,
                clock,
                ValidationOutcome::ok(),
                ValidationOutcome::ok(),
                Vec::new(),
                Some(err.to_string()),
                None,
            );
        }
        Err(_) => {
            let elapsed_ms = clock.elapsed().as_millis() as u64;
            let err = PipelineError::timeout(phase_index, elapsed_ms, timeout.as_millis() as u64);
            error!(phase = phase_index, "gate timed out after {elapsed_ms}ms");
            return finish(
                phase_index,
                phase_name,
                started_at,
                clock,
                ValidationOutcome::ok(),
                ValidationOutcome::ok(),
                Vec::new(),
                Some(err.to_string()),
                None,
            );
        }
    };

    let output_errors = validate_output(&executed);
    if !output_errors.is_empty() {
        warn!(phase = phase_index, errors = ?output_errors, "output validation failed");
        return finish(
            phase_index,
            phase_name,
            started_at,
            clock,
            ValidationOutcome::ok(),
            ValidationOutcome::failed(output_errors),
            Vec::new(),
            Some("output validation failed".to_string()),
            None,
        );
    }

    let mut checked_names = Vec::with_capacity(invariants.len());
    for invariant in invariants {
        checked_names.push(invariant.name.to_string());
        if !(invariant.check)(&executed) {
            let message = format!("invariant '{}' violated", invariant.name);
            error!(phase = phase_index, invariant = invariant.name, "invariant violated");
            return finish(
                phase_index,
                phase_name,
                started_at,
                clock,
                ValidationOutcome::ok(),
                ValidationOutcome::ok(),
                checked_names,
                Some(message),
                None,
            );
        }
    }

    info!(phase = phase_index, name = phase_name, "gate completed");
    finish(
        phase_index,
        phase_name,
        started_at,
        clock,
        ValidationOutcome::ok(),
        ValidationOutcome::ok(),
        checked_names,
        None,
        Some(executed),
    )
}

#[allow(clippy::too_many_arguments)]
fn finish<O>(
    phase_index: usize,
    phase_name: &str,
    started_at: chrono::DateTime<Utc>,
    clock: Instant,
    input_validation_result: ValidationOutcome,
    output_validation_result: ValidationOutcome,
    invariants_checked: Vec<String>,
    error_message: Option<String>,
    output: Option<O>,
) -> (Option<O>, PhaseRecord) {
    let record = PhaseRecord {
        phase_index,
        phase_name: phase_name.to_string(),
        started_at,
        finished_at: Utc::now(),
        duration_ms: clock.elapsed().as_millis() as u64,
        input_validation_result,
        output_validation_result,
        invariants_checked,
        error_message,
        artifacts: Vec::new(),
    };
    (output, record)
}
