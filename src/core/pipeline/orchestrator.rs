//! The orchestrator: sequences gates 0, 1, 3, 4, 5, 6, 7 through the
//! Contract Envelope, building the Manifest as it goes and stopping at
//! the first gate that fails (spec §4.1, §4.2).

use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::{DocumentIngester, DocumentRef, ManifestSink, QuestionnaireLoader, Scorer};
use crate::core::config::RawConfig;
use crate::core::identity::content_hash_256;
use crate::core::model::MacroScore;

use super::envelope::run_gate;
use super::gates::{gate0_config, gate1_grid, gate3_router, gate4_dimension, gate5_area, gate6_cluster, gate7_macro};
use super::manifest::Manifest;

/// Everything the orchestrator needs beyond the raw config: the external
/// collaborators phase 0/1/3 consult and, optionally, a sink to persist
/// the finished manifest.
pub struct RunInputs {
    /// The not-yet-validated configuration.
    pub raw_config: RawConfig,
    /// Reference to the source document phase 1 ingests.
    pub document: DocumentRef,
    /// Resolves the questionnaire path to a normalized questionnaire.
    pub loader: Arc<dyn QuestionnaireLoader>,
    /// Produces the raw chunk set from the source document.
    pub ingester: Arc<dyn DocumentIngester>,
    /// Scores each routed question.
    pub scorer: Arc<dyn Scorer>,
    /// Receives the finished manifest, success or abort.
    pub manifest_sink: Arc<dyn ManifestSink>,
}

/// Runs the full pipeline end to end, returning the manifest and, if
/// every gate through phase 7 succeeded, the macro score.
///
/// Any gate failing short-circuits the remaining gates; the manifest
/// still comes back with every phase record recorded up to and
/// including the failure, per spec §4.2's total-order halt rule.
pub async fn run(inputs: RunInputs) -> (Manifest, Option<MacroScore>) {
    let RunInputs {
        raw_config,
        document,
        loader,
        ingester,
        scorer,
        manifest_sink,
    } = inputs;

    let config_hash = content_hash_256(&raw_config).unwrap_or_default();
    let declared_questionnaire_hash = raw_config.questionnaire_hash.clone();
    let mut manifest = Manifest::new(config_hash, declared_questionnaire_hash);

    let timeout = Duration::from_millis(raw_config.resource_limits.phase_timeout_ms);

    macro_rules! run_phase {
        ($index:expr, $name:expr, $input:expr, $module:ident) => {{
            let (output, record) = run_gate(
                $index,
                $name,
                $input,
                $module::validate_input,
                $module::execute,
                $module::validate_output,
                &$module::invariants(),
                timeout,
            )
            .await;
            manifest.record(record);
            match output {
                Some(o) => o,
                None => {
                    manifest_sink.publish(&manifest);
                    return (manifest, None);
                }
            }
        }};
    }

    let config = run_phase!(
        0,
        "configuration_gate",
        gate0_config::Gate0Input {
            raw_config,
            loader,
        },
        gate0_config
    );

    let chunks = run_phase!(
        1,
        "grid_builder",
        gate1_grid::Gate1Input {
            document,
            ingester,
        },
        gate1_grid
    );

    let routing_outcome = run_phase!(
        3,
        "chunk_router",
        gate3_router::Gate3Input {
            chunks,
            questions: config.questionnaire.micro_questions.clone(),
            abort_on_insufficient: config.abort_on_insufficient,
        },
        gate3_router
    );

    let scored = match score_all(&scorer, &routing_outcome.routes).await {
        Ok(scored) => scored,
        Err(e) => {
            manifest.record(scoring_failure_record(e.to_string()));
            manifest_sink.publish(&manifest);
            return (manifest, None);
        }
    };

    let dimension_scores = run_phase!(
        4,
        "dimension_aggregator",
        gate4_dimension::Gate4Input {
            scored,
            settings: config.aggregation_settings.clone(),
            abort_on_insufficient: config.abort_on_insufficient,
        },
        gate4_dimension
    );

    let area_scores = run_phase!(
        5,
        "area_aggregator",
        gate5_area::Gate5Input {
            dimension_scores: dimension_scores.clone(),
            settings: config.aggregation_settings.clone(),
        },
        gate5_area
    );

    let cluster_scores = run_phase!(
        6,
        "cluster_aggregator",
        gate6_cluster::Gate6Input {
            area_scores: area_scores.clone(),
            settings: config.aggregation_settings.clone(),
        },
        gate6_cluster
    );

    let macro_score = run_phase!(
        7,
        "macro_evaluator",
        gate7_macro::Gate7Input {
            cluster_scores,
            area_scores,
            dimension_scores,
            settings: config.aggregation_settings.clone(),
        },
        gate7_macro
    );

    manifest_sink.publish(&manifest);
    (manifest, Some(macro_score))
}

async fn score_all(
    scorer: &Arc<dyn Scorer>,
    routes: &[crate::core::model::ChunkRoutingResult],
) -> crate::core::errors::Result<Vec<crate::core::model::ScoredMicroQuestion>> {
    let mut scored = Vec::with_capacity(routes.len());
    for route in routes {
        scored.push(scorer.score(route).await?);
    }
    Ok(scored)
}

fn scoring_failure_record(message: String) -> super::manifest::PhaseRecord {
    use super::manifest::ValidationOutcome;
    let now = chrono::Utc::now();
    super::manifest::PhaseRecord {
        phase_index: 3,
        phase_name: "scoring".to_string(),
        started_at: now,
        finished_at: now,
        duration_ms: 0,
        input_validation_result: ValidationOutcome::ok(),
        output_validation_result: ValidationOutcome::ok(),
        invariants_checked: Vec::new(),
        error_message: Some(message),
        artifacts: Vec::new(),
    }
}
