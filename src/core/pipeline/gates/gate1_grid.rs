//! Phase 1 — Grid Builder (spec §4.4).

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::collaborators::{DocumentIngester, DocumentRef};
use crate::core::errors::Result;
use crate::core::identity::content_hash_128;
use crate::core::model::{Chunk, GridKey, DIMENSION_COUNT, POLICY_AREA_COUNT};
use crate::core::pipeline::envelope::Invariant;

/// Input to phase 1: the document reference and the ingester collaborator.
pub struct Gate1Input {
    /// Reference to the source document.
    pub document: DocumentRef,
    /// Produces the raw, untagged-by-id chunk set.
    pub ingester: Arc<dyn DocumentIngester>,
}

/// Phase 1 has no meaningful input-shape check beyond the document
/// reference existing, which the ingester itself will surface as an I/O
/// error if it fails; nothing to validate up front.
pub fn validate_input(_input: &Gate1Input) -> Vec<String> {
    Vec::new()
}

/// Ingests the document, tags each raw chunk with a stable id and content
/// hash, and returns the 60-cell grid in canonical `(PA, DIM)` order.
pub async fn execute(input: Gate1Input) -> Result<Vec<Chunk>> {
    let raw_chunks = input.ingester.ingest(&input.document).await?;

    let mut chunks = Vec::with_capacity(raw_chunks.len());
    for raw in raw_chunks {
        let key = GridKey::new(raw.policy_area_id.clone(), raw.dimension_id.clone());
        chunks.push(Chunk {
            chunk_id: format!("chunk-{key}"),
            policy_area_id: raw.policy_area_id,
            dimension_id: raw.dimension_id,
            content_hash: content_hash_128(raw.text.as_bytes()),
            text: raw.text,
            provenance: raw.provenance,
        });
    }

    chunks.sort_by(|a, b| a.grid_key().cmp(&b.grid_key()));
    Ok(chunks)
}

/// Phase 1's output contract: exactly 60 chunks, no duplicate grid key, no
/// missing PA/DIM, and the provenance/structural-consistency thresholds
/// from spec §4.4.
pub fn validate_output(chunks: &[Chunk]) -> Vec<String> {
    let mut errors = Vec::new();

    if chunks.len() != POLICY_AREA_COUNT * DIMENSION_COUNT {
        errors.push(format!(
            "expected exactly {} chunks, got {}",
            POLICY_AREA_COUNT * DIMENSION_COUNT,
            chunks.len()
        ));
    }

    let mut seen = BTreeSet::new();
    for chunk in chunks {
        if !seen.insert(chunk.grid_key()) {
            errors.push(format!("duplicate chunk for grid key {}", chunk.grid_key()));
        }
    }

    if !chunks.is_empty() {
        let avg_completeness: f64 =
            chunks.iter().map(|c| c.provenance.completeness).sum::<f64>() / chunks.len() as f64;
        if avg_completeness < 0.8 {
            errors.push(format!(
                "average provenance completeness {avg_completeness:.3} is below the 0.8 contract floor"
            ));
        }

        let structural_consistency = seen.len() as f64 / chunks.len() as f64;
        if structural_consistency < 0.85 {
            errors.push(format!(
                "structural consistency {structural_consistency:.3} is below the 0.85 contract floor"
            ));
        }
    }

    errors
}

/// Phase 1's post-execution invariants.
pub fn invariants() -> Vec<Invariant<Vec<Chunk>>> {
    vec![
        Invariant {
            name: "exactly_60_chunks",
            check: |chunks: &Vec<Chunk>| chunks.len() == POLICY_AREA_COUNT * DIMENSION_COUNT,
        },
        Invariant {
            name: "no_duplicate_grid_keys",
            check: |chunks: &Vec<Chunk>| {
                let mut seen = BTreeSet::new();
                chunks.iter().all(|c| seen.insert(c.grid_key()))
            },
        },
    ]
}

/// Returns the grid-key gap, if any, between the expected full grid and
/// `chunks`. Used by callers that want a precise diagnostic rather than
/// just a pass/fail invariant.
pub fn missing_grid_keys(chunks: &[Chunk]) -> Vec<GridKey> {
    let present: BTreeSet<GridKey> = chunks.iter().map(Chunk::grid_key).collect();
    let mut missing = Vec::new();
    for pa in crate::core::model::PolicyAreaId::canonical_set() {
        for dim in crate::core::model::DimensionId::canonical_set() {
            let key = GridKey::new(pa.clone(), dim.clone());
            if !present.contains(&key) {
                missing.push(key);
            }
        }
    }
    missing
}
