//! Phase 3 — Chunk Router (spec §4.5).

use std::collections::{BTreeMap, HashMap};

use crate::core::errors::{PipelineError, Result};
use crate::core::model::{Chunk, ChunkRoutingResult, ClusterId, GridKey, Question};
use crate::core::pipeline::envelope::Invariant;

/// Input to phase 3: the 60 chunks from phase 1 and the 300 questions
/// from the questionnaire, plus the cluster membership needed to stamp
/// each routing result.
pub struct Gate3Input {
    /// The phase-1 chunk grid.
    pub chunks: Vec<Chunk>,
    /// The questionnaire's 300 micro-questions.
    pub questions: Vec<Question>,
    /// Whether a single missing route aborts the phase immediately
    /// (`true`) or is recorded as a failure and routing continues
    /// (`false`).
    pub abort_on_insufficient: bool,
}

/// Phase 3's full output: the routing results plus the observable
/// counters spec §4.5 requires (total/success/failure counts and the
/// per-PA/per-DIM distributions).
#[derive(Debug, Clone, Default)]
pub struct RoutingOutcome {
    /// One entry per successfully routed question.
    pub routes: Vec<ChunkRoutingResult>,
    /// Total questions considered.
    pub total_questions: usize,
    /// Count of questions that routed successfully.
    pub successful_routes: usize,
    /// Count of questions that failed to route.
    pub failed_routes: usize,
    /// question_id of each routing failure, for diagnostics.
    pub failures: Vec<String>,
    /// Successful routes per policy area.
    pub per_pa_distribution: BTreeMap<String, usize>,
    /// Successful routes per dimension.
    pub per_dim_distribution: BTreeMap<String, usize>,
}

/// Nothing to check ahead of time beyond what the types already enforce;
/// the router's real validation is the per-question lookup in `execute`.
pub fn validate_input(_input: &Gate3Input) -> Vec<String> {
    Vec::new()
}

/// Builds a dense `(PA, DIM) -> Chunk` map and routes every question
/// through it by strict key equality, verifying the retrieved chunk's own
/// tags agree with the question's (spec §4.5).
pub async fn execute(input: Gate3Input) -> Result<RoutingOutcome> {
    let Gate3Input {
        chunks,
        questions,
        abort_on_insufficient,
    } = input;

    let by_key: HashMap<GridKey, &Chunk> = chunks
        .iter()
        .map(|c| (c.grid_key(), c))
        .collect();

    let mut outcome = RoutingOutcome {
        total_questions: questions.len(),
        ..Default::default()
    };

    for question in &questions {
        let key = GridKey::new(question.policy_area_id.clone(), question.dimension_id.clone());
        let Some(chunk) = by_key.get(&key) else {
            outcome.failed_routes += 1;
            outcome.failures.push(question.question_id.clone());
            if abort_on_insufficient {
                return Err(PipelineError::routing(
                    question.question_id.clone(),
                    format!("no chunk found for grid key {key}"),
                ));
            }
            continue;
        };

        if chunk.policy_area_id != question.policy_area_id || chunk.dimension_id != question.dimension_id {
            return Err(PipelineError::routing(
                question.question_id.clone(),
                format!(
                    "routed chunk tags ({}, {}) disagree with question tags ({}, {})",
                    chunk.policy_area_id, chunk.dimension_id, question.policy_area_id, question.dimension_id
                ),
            ));
        }

        outcome.successful_routes += 1;
        *outcome
            .per_pa_distribution
            .entry(question.policy_area_id.to_string())
            .or_insert(0) += 1;
        *outcome
            .per_dim_distribution
            .entry(question.dimension_id.to_string())
            .or_insert(0) += 1;

        outcome.routes.push(ChunkRoutingResult {
            question_id: question.question_id.clone(),
            base_slot: question.base_slot,
            chunk_id: chunk.chunk_id.clone(),
            policy_area_id: question.policy_area_id.clone(),
            dimension_id: question.dimension_id.clone(),
            cluster_id: question.cluster_id.clone(),
            expected_elements: question.signal_requirements.clone(),
        });
    }

    Ok(outcome)
}

/// Phase 3's output contract: the totality identity from spec §4.5 plus
/// the distribution sums.
pub fn validate_output(outcome: &RoutingOutcome) -> Vec<String> {
    let mut errors = Vec::new();

    if outcome.successful_routes + outcome.failed_routes != outcome.total_questions {
        errors.push(format!(
            "successful_routes ({}) + failed_routes ({}) != total_questions ({})",
            outcome.successful_routes, outcome.failed_routes, outcome.total_questions
        ));
    }
    if outcome.routes.len() != outcome.successful_routes {
        errors.push(format!(
            "routes length ({}) != successful_routes ({})",
            outcome.routes.len(),
            outcome.successful_routes
        ));
    }
    let pa_sum: usize = outcome.per_pa_distribution.values().sum();
    if pa_sum != outcome.successful_routes {
        errors.push(format!(
            "per-PA distribution sums to {pa_sum}, expected {}",
            outcome.successful_routes
        ));
    }
    let dim_sum: usize = outcome.per_dim_distribution.values().sum();
    if dim_sum != outcome.successful_routes {
        errors.push(format!(
            "per-DIM distribution sums to {dim_sum}, expected {}",
            outcome.successful_routes
        ));
    }

    errors
}

/// Phase 3's post-execution invariants.
pub fn invariants() -> Vec<Invariant<RoutingOutcome>> {
    vec![Invariant {
        name: "routing_totality",
        check: |o: &RoutingOutcome| o.successful_routes + o.failed_routes == o.total_questions,
    }]
}
