//! Chunk: a scoped text region of the source document, one per (PA, DIM) pair.

use serde::{Deserialize, Serialize};

use super::ids::{DimensionId, GridKey, PolicyAreaId};

/// Where a chunk's text was drawn from in the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Source page number, if the ingester could determine one.
    pub source_page: Option<u32>,
    /// Source section label, if the ingester could determine one.
    pub source_section: Option<String>,
    /// Fraction of this chunk's provenance fields that were populated,
    /// in `[0, 1]`. Phase 1's contract requires the average across all
    /// chunks to be `>= 0.8`.
    pub completeness: f64,
}

impl Provenance {
    /// A provenance record with every field populated (completeness 1.0).
    pub fn complete(page: u32, section: impl Into<String>) -> Self {
        Self {
            source_page: Some(page),
            source_section: Some(section.into()),
            completeness: 1.0,
        }
    }

    /// A provenance record missing both fields (completeness 0.0).
    pub fn missing() -> Self {
        Self {
            source_page: None,
            source_section: None,
            completeness: 0.0,
        }
    }
}

/// A scoped text region of the source document, tagged with exactly one
/// `(policy_area_id, dimension_id)` pair. Phase 1 produces exactly 60.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier for this chunk, derived from its grid key.
    pub chunk_id: String,
    /// Policy area this chunk covers.
    pub policy_area_id: PolicyAreaId,
    /// Dimension this chunk covers.
    pub dimension_id: DimensionId,
    /// The chunk's text payload.
    pub text: String,
    /// 128-bit content digest of `text`, hex-encoded.
    pub content_hash: String,
    /// Source page/section provenance.
    pub provenance: Provenance,
}

impl Chunk {
    /// The `(policy_area_id, dimension_id)` key identifying this chunk's
    /// cell in the 60-cell grid.
    pub fn grid_key(&self) -> GridKey {
        GridKey::new(self.policy_area_id.clone(), self.dimension_id.clone())
    }
}

/// A chunk as handed to phase 1 before hashing/id assignment, i.e. what a
/// `DocumentIngester` produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChunk {
    /// Policy area this chunk covers.
    pub policy_area_id: PolicyAreaId,
    /// Dimension this chunk covers.
    pub dimension_id: DimensionId,
    /// The chunk's text payload.
    pub text: String,
    /// Source page/section provenance.
    pub provenance: Provenance,
}
