//! ChunkRoutingResult: phase 3's output binding one question to the chunk
//! it was routed to.

use serde::{Deserialize, Serialize};

use super::ids::{ClusterId, DimensionId, PolicyAreaId};

/// One question's routing outcome: which chunk it was bound to, and the
/// (PA, DIM, CL) metadata carried forward for scoring and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRoutingResult {
    /// Identifier of the routed question.
    pub question_id: String,
    /// Position within the question's (PA, DIM) cell.
    pub base_slot: u32,
    /// Identifier of the chunk this question was routed to.
    pub chunk_id: String,
    /// Policy area shared by the question and the routed chunk.
    pub policy_area_id: PolicyAreaId,
    /// Dimension shared by the question and the routed chunk.
    pub dimension_id: DimensionId,
    /// Cluster the question's policy area belongs to.
    pub cluster_id: ClusterId,
    /// Signal registry keys the scorer is expected to consult, carried
    /// forward from the question's `signal_requirements`.
    pub expected_elements: Vec<String>,
}
