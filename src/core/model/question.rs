//! Questions: the 300 micro-questions, 4 meso (cluster) questions, and the
//! single macro question that make up the Questionnaire.

use serde::{Deserialize, Serialize};

use super::ids::{ClusterId, DimensionId, PolicyAreaId};

/// The evidence-gathering modality a micro-question expects from the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    /// Direct textual evidence lookup.
    A,
    /// Cross-reference against another chunk.
    B,
    /// Quantitative indicator extraction.
    C,
    /// Structural/formal compliance check.
    D,
    /// Stakeholder/participation evidence.
    E,
    /// Temporal/continuity evidence.
    F,
}

/// One of the 300 atomic interrogations, bound to exactly one `(PA, DIM)` cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier, e.g. `"Q-PA03-DIM02-07"`.
    pub question_id: String,
    /// Position within the question's (PA, DIM) cell, used for stable
    /// ordering and display.
    pub base_slot: u32,
    /// Policy area this question interrogates.
    pub policy_area_id: PolicyAreaId,
    /// Dimension this question interrogates.
    pub dimension_id: DimensionId,
    /// Cluster this question's policy area belongs to.
    pub cluster_id: ClusterId,
    /// Evidence-gathering modality expected from the scorer.
    pub modality: Modality,
    /// Signal registry keys this question's scorer is expected to consult.
    pub signal_requirements: Vec<String>,
}

/// One of the 4 cluster-level (meso) questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MesoQuestion {
    /// Unique identifier.
    pub question_id: String,
    /// Cluster this question addresses.
    pub cluster_id: ClusterId,
}

/// The single macro-level question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroQuestion {
    /// Unique identifier.
    pub question_id: String,
}
