//! Main evaluation engine facade.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::collaborators::{
    DocumentRef, FixedScoreScorer, JsonQuestionnaireLoader, ManifestSink, NullSink,
    PlainTextGridIngester, Scorer,
};
use crate::core::config::{load_raw_config, RawConfig};
use crate::core::errors::Result;
use crate::core::model::MacroScore;
use crate::core::pipeline::{run, Manifest, RunInputs};

/// The top-level evaluation engine. Wraps [`crate::core::pipeline::run`]
/// with sensible default collaborators; callers with a real ingestion,
/// scoring, or telemetry stack should construct a [`RunInputs`] directly
/// and call [`run`] instead of going through this facade.
pub struct PolidocEngine {
    manifest_sink: Arc<dyn ManifestSink>,
}

impl PolidocEngine {
    /// Builds an engine that discards the manifest unless a sink is
    /// supplied via [`Self::with_manifest_sink`].
    pub fn new() -> Self {
        info!("initializing polidoc evaluation engine");
        Self {
            manifest_sink: Arc::new(NullSink),
        }
    }

    /// Attaches a manifest sink the engine will publish to after every run.
    pub fn with_manifest_sink(mut self, sink: Arc<dyn ManifestSink>) -> Self {
        self.manifest_sink = sink;
        self
    }

    /// Loads configuration from `config_path`, evaluates `document_path`
    /// using the plain-text grid ingester and a constant-score scorer,
    /// and returns the manifest plus macro score (if the run reached
    /// phase 7).
    pub async fn evaluate(&self, config_path: &Path) -> Result<(Manifest, Option<MacroScore>)> {
        let raw_config = load_raw_config(config_path)?;
        self.evaluate_raw(raw_config).await
    }

    /// Evaluates an already-loaded [`RawConfig`] with the engine's default
    /// collaborators.
    pub async fn evaluate_raw(
        &self,
        raw_config: RawConfig,
    ) -> Result<(Manifest, Option<MacroScore>)> {
        let document = DocumentRef::new(raw_config.document_path.clone());
        let scorer: Arc<dyn Scorer> = Arc::new(FixedScoreScorer::new(1.5)?);

        let inputs = RunInputs {
            raw_config,
            document,
            loader: Arc::new(JsonQuestionnaireLoader),
            ingester: Arc::new(PlainTextGridIngester),
            scorer,
            manifest_sink: self.manifest_sink.clone(),
        };
        Ok(run(inputs).await)
    }
}

impl Default for PolidocEngine {
    fn default() -> Self {
        Self::new()
    }
}
