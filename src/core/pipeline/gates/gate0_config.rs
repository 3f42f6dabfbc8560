//! Phase 0 — Configuration Gate (spec §4.3).

use std::sync::Arc;

use crate::collaborators::QuestionnaireLoader;
use crate::core::config::validation::{validate_non_negative, validate_positive_f64, validate_positive_usize, validate_unit_range};
use crate::core::config::{AggregationSettings, Config, RawConfig};
use crate::core::errors::Result;
use crate::core::identity::verify_hash;
use crate::core::pipeline::envelope::Invariant;

/// Input to phase 0: the caller-supplied config and the questionnaire
/// loader collaborator.
pub struct Gate0Input {
    /// The not-yet-validated configuration.
    pub raw_config: RawConfig,
    /// Resolves the questionnaire path to a normalized questionnaire.
    pub loader: Arc<dyn QuestionnaireLoader>,
}

/// Collects every input-shape and active-phase violation as a message
/// list, rather than stopping at the first one, so the manifest's
/// `input_validation_result` reports everything wrong at once.
pub fn validate_input(input: &Gate0Input) -> Vec<String> {
    let mut errors = Vec::new();
    if let Err(e) = input.raw_config.validate_shape() {
        errors.push(e.to_string());
    }
    if let Err(e) = input.raw_config.validate_active_phases() {
        errors.push(e.to_string());
    }
    errors
}

/// Loads the questionnaire, verifies its hash, and derives
/// [`AggregationSettings`] (spec §4.3 steps b-f).
pub async fn execute(input: Gate0Input) -> Result<Config> {
    let Gate0Input { raw_config, loader } = input;

    let (questionnaire, computed_hash) = loader.load(&raw_config.questionnaire_path)?;
    verify_hash(&raw_config.questionnaire_hash, &computed_hash)?;

    let aggregation_settings = AggregationSettings::derive(&questionnaire);

    Ok(Config {
        document_path: raw_config.document_path,
        questionnaire_path: raw_config.questionnaire_path,
        questionnaire_hash: raw_config.questionnaire_hash,
        calibration_profile: raw_config.calibration_profile,
        executor_reference: raw_config.executor_reference,
        resource_limits: raw_config.resource_limits,
        abort_on_insufficient: raw_config.abort_on_insufficient,
        questionnaire,
        aggregation_settings,
    })
}

/// Phase 0's output contract: the questionnaire must already have passed
/// canonical-set validation during loading, and the settings derived from
/// it must be internally sane (positive counts, thresholds and weights in
/// their valid ranges).
pub fn validate_output(output: &Config) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = output.questionnaire.validate_canonical_sets() {
        errors.push(e.to_string());
    }

    let counts = &output.aggregation_settings.expected_counts;
    for (label, value) in [
        ("questions_per_dimension", counts.questions_per_dimension),
        ("dimensions_total", counts.dimensions_total),
        ("areas_total", counts.areas_total),
        ("clusters_total", counts.clusters_total),
    ] {
        if let Err(e) = validate_positive_usize(value, label) {
            errors.push(e.to_string());
        }
    }

    let thresholds = &output.aggregation_settings.rubric_thresholds;
    for (label, value) in [
        ("rubric_thresholds.excelente", thresholds.excelente),
        ("rubric_thresholds.bueno", thresholds.bueno),
    ] {
        if let Err(e) = validate_unit_range(value, label) {
            errors.push(e.to_string());
        }
    }
    if let Err(e) = validate_positive_f64(thresholds.aceptable, "rubric_thresholds.aceptable") {
        errors.push(e.to_string());
    }
    if let Err(e) = validate_unit_range(thresholds.aceptable, "rubric_thresholds.aceptable") {
        errors.push(e.to_string());
    }

    for table in [
        &output.aggregation_settings.dimension_question_weights,
        &output.aggregation_settings.area_dimension_weights,
        &output.aggregation_settings.cluster_policy_area_weights,
        &output.aggregation_settings.macro_cluster_weights,
    ] {
        for weight in table.values() {
            if let Err(e) = validate_non_negative(*weight, "aggregation weight") {
                errors.push(e.to_string());
                break;
            }
        }
    }

    errors
}

/// Phase 0's post-execution invariants.
pub fn invariants() -> Vec<Invariant<Config>> {
    vec![
        Invariant {
            name: "questionnaire_has_300_micro_questions",
            check: |c: &Config| c.questionnaire.micro_questions.len() == 300,
        },
        Invariant {
            name: "aggregation_settings_expects_60_dimensions",
            check: |c: &Config| c.aggregation_settings.expected_counts.dimensions_total == 60,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::FixedQuestionnaireLoader;
    use crate::core::config::questionnaire::WeightTable;
    use crate::core::config::CANONICAL_ACTIVE_PHASES;
    use crate::core::model::{ClusterId, DimensionId, MacroQuestion, MesoQuestion, Modality, PolicyAreaId, Question};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn full_questionnaire() -> crate::core::config::Questionnaire {
        let mut cluster_members = BTreeMap::new();
        cluster_members.insert("CL01".to_string(), PolicyAreaId::canonical_set()[0..3].to_vec());
        cluster_members.insert("CL02".to_string(), PolicyAreaId::canonical_set()[3..5].to_vec());
        cluster_members.insert("CL03".to_string(), PolicyAreaId::canonical_set()[5..8].to_vec());
        cluster_members.insert("CL04".to_string(), PolicyAreaId::canonical_set()[8..10].to_vec());

        let mut micro_questions = Vec::new();
        for pa in PolicyAreaId::canonical_set() {
            for dim in DimensionId::canonical_set() {
                for slot in 0..5 {
                    micro_questions.push(Question {
                        question_id: format!("Q-{pa}-{dim}-{slot:02}"),
                        base_slot: slot,
                        policy_area_id: pa.clone(),
                        dimension_id: dim.clone(),
                        cluster_id: ClusterId::new("CL01").unwrap(),
                        modality: Modality::A,
                        signal_requirements: Vec::new(),
                    });
                }
            }
        }

        crate::core::config::Questionnaire {
            micro_questions,
            meso_questions: vec![
                MesoQuestion { question_id: "M1".into(), cluster_id: ClusterId::new("CL01").unwrap() },
                MesoQuestion { question_id: "M2".into(), cluster_id: ClusterId::new("CL02").unwrap() },
                MesoQuestion { question_id: "M3".into(), cluster_id: ClusterId::new("CL03").unwrap() },
                MesoQuestion { question_id: "M4".into(), cluster_id: ClusterId::new("CL04").unwrap() },
            ],
            macro_question: MacroQuestion { question_id: "MACRO".into() },
            dimension_question_weights: WeightTable::new(),
            area_dimension_weights: WeightTable::new(),
            cluster_policy_area_weights: WeightTable::new(),
            macro_cluster_weights: WeightTable::new(),
            cluster_members,
        }
    }

    fn raw_config(hash: String) -> RawConfig {
        RawConfig {
            document_path: PathBuf::from("/dev/null"),
            questionnaire_path: PathBuf::from("/dev/null"),
            questionnaire_hash: hash,
            calibration_profile: "default".into(),
            executor_reference: "default".into(),
            resource_limits: Default::default(),
            abort_on_insufficient: true,
            active_phases: CANONICAL_ACTIVE_PHASES.to_vec(),
        }
    }

    #[tokio::test]
    async fn succeeds_when_hash_matches() {
        let questionnaire = full_questionnaire();
        let hash = questionnaire.content_hash().unwrap();
        let loader = Arc::new(FixedQuestionnaireLoader::new(questionnaire));
        let config = execute(Gate0Input {
            raw_config: raw_config(hash),
            loader,
        })
        .await
        .unwrap();
        assert_eq!(config.questionnaire.micro_questions.len(), 300);
    }

    #[tokio::test]
    async fn fails_on_hash_mismatch() {
        let questionnaire = full_questionnaire();
        let loader = Arc::new(FixedQuestionnaireLoader::new(questionnaire));
        let err = execute(Gate0Input {
            raw_config: raw_config("0".repeat(64)),
            loader,
        })
        .await
        .unwrap_err();
        assert!(matches!(err, crate::core::errors::PipelineError::HashMismatch { .. }));
    }

    #[test]
    fn validate_input_rejects_phase_2() {
        let mut raw = raw_config("a".repeat(64));
        raw.active_phases.push(2);
        let input = Gate0Input {
            raw_config: raw,
            loader: Arc::new(FixedQuestionnaireLoader::new(full_questionnaire())),
        };
        let errors = validate_input(&input);
        assert!(errors.iter().any(|e| e.contains("phase 2")));
    }
}
