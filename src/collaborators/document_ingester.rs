//! DocumentIngester: the phase 1 boundary collaborator. Out of scope per
//! the core's purpose (no real PDF/NLP extraction lives here); this module
//! defines the contract and one deterministic reference implementation
//! good enough to exercise phase 1's validation and invariants.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::errors::{PipelineError, Result};
use crate::core::model::{DimensionId, PolicyAreaId, Provenance, RawChunk, DIMENSION_COUNT, POLICY_AREA_COUNT};

/// A reference to the document phase 1 will ingest. Opaque beyond a path:
/// a production ingester would resolve format, pagination, and OCR
/// fallbacks here, none of which is this core's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Filesystem path to the source document.
    pub path: PathBuf,
}

impl DocumentRef {
    /// Wraps a path as a document reference.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Produces the 60 raw (PA, DIM) chunks phase 1 will tag, hash, and
/// validate. Must be deterministic: the same document reference always
/// yields byte-identical chunk text and provenance.
#[async_trait]
pub trait DocumentIngester: Send + Sync {
    /// Reads and splits `doc` into 60 raw chunks, one per `(PA, DIM)` cell,
    /// in canonical `(PA, DIM)` order.
    async fn ingest(&self, doc: &DocumentRef) -> Result<Vec<RawChunk>>;
}

/// Deterministically bands a UTF-8 text file into 60 equal-ish byte slices
/// in canonical grid order, tagging each with a synthetic page/section so
/// phase 1's provenance-completeness contract is exercisable without a
/// real extraction pipeline.
#[derive(Debug, Clone, Default)]
pub struct PlainTextGridIngester;

#[async_trait]
impl DocumentIngester for PlainTextGridIngester {
    async fn ingest(&self, doc: &DocumentRef) -> Result<Vec<RawChunk>> {
        let text = tokio::fs::read_to_string(&doc.path)
            .await
            .map_err(|e| PipelineError::io(format!("reading {}", doc.path.display()), e))?;

        let cells = POLICY_AREA_COUNT * DIMENSION_COUNT;
        let band_len = (text.len() / cells.max(1)).max(1);

        let mut chunks = Vec::with_capacity(cells);
        let mut cursor = 0usize;
        for (pa_idx, pa) in PolicyAreaId::canonical_set().into_iter().enumerate() {
            for (dim_idx, dim) in DimensionId::canonical_set().into_iter().enumerate() {
                let end = (cursor + band_len).min(text.len());
                let slice = safe_slice(&text, cursor, end);
                chunks.push(RawChunk {
                    policy_area_id: pa.clone(),
                    dimension_id: dim.clone(),
                    text: if slice.trim().is_empty() {
                        format!("[no content extracted for {pa}/{dim}]")
                    } else {
                        slice.to_string()
                    },
                    provenance: Provenance::complete(
                        (pa_idx * DIMENSION_COUNT + dim_idx + 1) as u32,
                        format!("section-{pa}-{dim}"),
                    ),
                });
                cursor = end;
            }
        }
        Ok(chunks)
    }
}

/// Slices `text` at the nearest char boundaries at or before `start`/`end`,
/// so banding never panics on a multi-byte UTF-8 split point.
fn safe_slice(text: &str, start: usize, end: usize) -> &str {
    let mut start = start.min(text.len());
    let mut end = end.min(text.len());
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    if start > end {
        return "";
    }
    &text[start..end]
}

/// An ingester backed by a fixed in-memory set of raw chunks, used in
/// tests where no filesystem document is needed.
#[derive(Debug, Clone)]
pub struct FixedChunkIngester {
    chunks: Vec<RawChunk>,
}

impl FixedChunkIngester {
    /// Wraps a pre-built chunk set.
    pub fn new(chunks: Vec<RawChunk>) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl DocumentIngester for FixedChunkIngester {
    async fn ingest(&self, _doc: &DocumentRef) -> Result<Vec<RawChunk>> {
        Ok(self.chunks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_ingester_produces_60_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        tokio::fs::write(&path, "lorem ipsum ".repeat(2000))
            .await
            .unwrap();

        let ingester = PlainTextGridIngester;
        let chunks = ingester.ingest(&DocumentRef::new(path)).await.unwrap();
        assert_eq!(chunks.len(), 60);

        let mut seen = std::collections::HashSet::new();
        for chunk in &chunks {
            assert!(seen.insert((chunk.policy_area_id.clone(), chunk.dimension_id.clone())));
            assert_eq!(chunk.provenance.completeness, 1.0);
        }
    }

    #[tokio::test]
    async fn fixed_ingester_returns_its_chunks_unchanged() {
        let chunks = vec![RawChunk {
            policy_area_id: PolicyAreaId::new("PA01").unwrap(),
            dimension_id: DimensionId::new("DIM01").unwrap(),
            text: "hello".into(),
            provenance: Provenance::missing(),
        }];
        let ingester = FixedChunkIngester::new(chunks.clone());
        let result = ingester.ingest(&DocumentRef::new("/dev/null")).await.unwrap();
        assert_eq!(result, chunks);
    }
}
