//! Domain entities shared by every pipeline phase: identifiers, chunks,
//! questions, and the score types each aggregation level emits.

pub mod chunk;
pub mod ids;
pub mod question;
pub mod routing;
pub mod scores;

pub use chunk::{Chunk, Provenance, RawChunk};
pub use ids::{
    ClusterId, DimensionId, GridKey, PolicyAreaId, CLUSTER_COUNT, DIMENSION_COUNT,
    POLICY_AREA_COUNT,
};
pub use question::{MacroQuestion, MesoQuestion, Modality, Question};
pub use routing::ChunkRoutingResult;
pub use scores::{
    AreaScore, ClusterScore, DimensionScore, EvidenceRef, MacroScore, QualityLevel,
    ScoreMetadata, ScoredMicroQuestion,
};
