//! External collaborators: the boundary contracts the core consumes but
//! does not implement in production form (spec §6). Each trait here is
//! paired with a deterministic reference implementation suitable for
//! tests and small runs, not a production extraction/NLP/telemetry stack.

pub mod document_ingester;
pub mod manifest_sink;
pub mod questionnaire_loader;
pub mod scorer;
pub mod signal_registry;

pub use document_ingester::{DocumentIngester, DocumentRef, FixedChunkIngester, PlainTextGridIngester};
pub use manifest_sink::{ManifestSink, NullSink};
pub use questionnaire_loader::{FixedQuestionnaireLoader, JsonQuestionnaireLoader, QuestionnaireLoader};
pub use scorer::{FixedScoreScorer, Scorer, SignalScorer};
pub use signal_registry::{InMemorySignalRegistry, Signal, SignalRegistry};
