//! Scorer: the collaborator consumed between phase 3 and phase 4. Input a
//! routed question, output a score in [0,3] or a fatal error. Per-question
//! executor logic (NLP, heuristics, human-in-the-loop) is out of scope;
//! these are deterministic stand-ins sufficient to drive the aggregation
//! pipeline in tests and small runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::{PipelineError, Result};
use crate::core::model::{ChunkRoutingResult, EvidenceRef, ScoreMetadata, ScoredMicroQuestion};
use crate::core::pipeline::rubric::classify;

use super::signal_registry::SignalRegistry;

/// Scores a single routed question. Implementations must return a value
/// in `[0, 3]` or a fatal error; there is no partial or retried score.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Produces the scored answer for `routed`.
    async fn score(&self, routed: &ChunkRoutingResult) -> Result<ScoredMicroQuestion>;
}

/// Returns the same configured score for every question. Used by the
/// happy-path scenario and by smoke tests that only care about the
/// aggregation math, not the scoring logic.
#[derive(Debug, Clone, Copy)]
pub struct FixedScoreScorer {
    score: f64,
}

impl FixedScoreScorer {
    /// Builds a scorer returning a constant `score` for every question.
    /// `score` must be in `[0, 3]`.
    pub fn new(score: f64) -> Result<Self> {
        if !(0.0..=3.0).contains(&score) || !score.is_finite() {
            return Err(PipelineError::internal(format!(
                "FixedScoreScorer requires a score in [0, 3], got {score}"
            )));
        }
        Ok(Self { score })
    }
}

#[async_trait]
impl Scorer for FixedScoreScorer {
    async fn score(&self, routed: &ChunkRoutingResult) -> Result<ScoredMicroQuestion> {
        build_scored(routed, self.score)
    }
}

/// Derives a deterministic pseudo-score from the routed chunk's content
/// length and a signal registry lookup, standing in for a real NLP
/// scorer. Not intended to produce meaningful evaluations — only to
/// exercise the phase 3/4 boundary with registry-dependent scoring.
pub struct SignalScorer {
    registry: Arc<dyn SignalRegistry>,
    signal_key: String,
}

impl SignalScorer {
    /// Builds a scorer that consults `registry` under `signal_key` for
    /// every question, scaling the content-length heuristic by the
    /// resolved signal value.
    pub fn new(registry: Arc<dyn SignalRegistry>, signal_key: impl Into<String>) -> Self {
        Self {
            registry,
            signal_key: signal_key.into(),
        }
    }
}

#[async_trait]
impl Scorer for SignalScorer {
    async fn score(&self, routed: &ChunkRoutingResult) -> Result<ScoredMicroQuestion> {
        let signal = self.registry.lookup(&self.signal_key)?;
        let length_component = (routed.expected_elements.len() as f64 / 10.0).min(1.0);
        let raw = (signal.value.clamp(0.0, 1.0) * 2.0 + length_component).clamp(0.0, 3.0);
        build_scored(routed, raw)
    }
}

fn build_scored(routed: &ChunkRoutingResult, score: f64) -> Result<ScoredMicroQuestion> {
    let score = score.clamp(0.0, 3.0);
    let normalized = score / 3.0;
    Ok(ScoredMicroQuestion {
        question_id: routed.question_id.clone(),
        base_slot: routed.base_slot,
        score,
        normalized_score: normalized,
        quality_level: classify(normalized),
        metadata: ScoreMetadata {
            policy_area_id: routed.policy_area_id.clone(),
            dimension_id: routed.dimension_id.clone(),
            cluster_id: routed.cluster_id.clone(),
        },
        evidence: EvidenceRef {
            locator: format!("chunk:{}", routed.chunk_id),
        },
    })
}
