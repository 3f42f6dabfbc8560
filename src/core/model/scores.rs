//! Score entities emitted at each aggregation level: micro → dimension →
//! area → cluster → macro.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ids::{ClusterId, DimensionId, PolicyAreaId};

/// The quality label assigned by the shared rubric (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityLevel {
    /// `normalized_score < 0.55`.
    Insuficiente,
    /// `0.55 <= normalized_score < 0.70`.
    Aceptable,
    /// `0.70 <= normalized_score < 0.85`.
    Bueno,
    /// `normalized_score >= 0.85`.
    Excelente,
}

/// Evidence reference a scorer attaches to a `ScoredMicroQuestion`, kept
/// opaque to the core (its shape is a scorer/report-assembler concern).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EvidenceRef {
    /// Free-form locator into whatever evidence store the scorer used.
    pub locator: String,
}

/// Per-entity grouping metadata carried on a `ScoredMicroQuestion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMetadata {
    /// Policy area this answer belongs to.
    pub policy_area_id: PolicyAreaId,
    /// Dimension this answer belongs to.
    pub dimension_id: DimensionId,
    /// Cluster this answer's policy area belongs to.
    pub cluster_id: ClusterId,
}

/// The scorer's output for one routed micro-question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMicroQuestion {
    /// Identifier of the scored question.
    pub question_id: String,
    /// Position within the question's (PA, DIM) cell.
    pub base_slot: u32,
    /// Raw score in `[0, 3]`.
    pub score: f64,
    /// `score / 3`, in `[0, 1]`.
    pub normalized_score: f64,
    /// Rubric label for `normalized_score`.
    pub quality_level: QualityLevel,
    /// Grouping metadata (PA/DIM/CL).
    pub metadata: ScoreMetadata,
    /// Evidence backing this score.
    pub evidence: EvidenceRef,
}

/// Aggregated score for one `(policy_area_id, dimension_id)` cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Policy area this score summarizes.
    pub policy_area_id: PolicyAreaId,
    /// Dimension this score summarizes.
    pub dimension_id: DimensionId,
    /// Ids of the questions that contributed to this score.
    pub contributing_question_ids: Vec<String>,
    /// Weighted-mean score in `[0, 3]`.
    pub score: f64,
    /// Rubric label for `score / 3`.
    pub quality_level: QualityLevel,
    /// Whether this dimension met its coverage/weight requirements.
    pub validation_passed: bool,
    /// Free-form diagnostics (coverage shortfalls, weight fallbacks, …).
    pub validation_details: HashMap<String, String>,
}

/// Aggregated score for one policy area, exactly 10 per successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaScore {
    /// Policy area this score summarizes.
    pub policy_area_id: PolicyAreaId,
    /// Weighted-mean score in `[0, 3]`.
    pub score: f64,
    /// Rubric label for `score / 3`.
    pub quality_level: QualityLevel,
    /// The dimension scores that contributed to this area.
    pub dimension_scores: Vec<DimensionScore>,
    /// Whether this area had at least one present dimension.
    pub validation_passed: bool,
}

/// Aggregated, penalty-adjusted score for one cluster, exactly 4 per
/// successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterScore {
    /// Cluster this score summarizes.
    pub cluster_id: ClusterId,
    /// Policy areas that are members of this cluster.
    pub member_areas: Vec<PolicyAreaId>,
    /// Penalty-adjusted score in `[0, 3]`.
    pub score: f64,
    /// Weighted mean before the imbalance penalty was applied.
    pub raw_score: f64,
    /// `1 - 0.3 * min(sigma / 3, 1)`.
    pub penalty_factor: f64,
    /// `1 / (1 + sigma)`, an inverse-spread diagnostic.
    pub coherence: f64,
    /// `sigma^2`.
    pub variance: f64,
    /// The member area with the lowest score (lexicographic tie-break).
    pub weakest_area: PolicyAreaId,
    /// Rubric label for `score / 3`.
    pub quality_level: QualityLevel,
    /// Free-form diagnostics (std dev, penalty inputs, NaN fallback flag, …).
    pub validation_details: HashMap<String, String>,
}

/// The single holistic evaluation emitted by phase 7.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroScore {
    /// Weighted-mean score across clusters, in `[0, 3]`.
    pub score: f64,
    /// `score / 3`, in `[0, 1]`.
    pub normalized_score: f64,
    /// Rubric label for `normalized_score`.
    pub quality_band: QualityLevel,
    /// `1 - min(sigma / 3, 1)` across cluster scores.
    pub cross_cutting_coherence: f64,
    /// Policy areas whose quality level is `Insuficiente`, lexicographically
    /// ordered.
    pub systemic_gaps: Vec<PolicyAreaId>,
    /// `0.6 * cross_cutting_coherence + 0.4 * dimension_validation_rate`.
    pub strategic_alignment: f64,
    /// The cluster scores this macro score was derived from.
    pub cluster_scores: Vec<ClusterScore>,
    /// Whether the macro evaluation completed without falling back.
    pub validation_passed: bool,
    /// Free-form diagnostics (dedup conflicts, fallback reason, …).
    pub validation_details: HashMap<String, String>,
}
