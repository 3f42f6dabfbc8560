//! AggregationSettings: grouping keys, expected counts, weight tables, and
//! rubric thresholds, derived once from the Questionnaire in phase 0.

use serde::{Deserialize, Serialize};

use crate::core::config::questionnaire::{Questionnaire, WeightTable};
use crate::core::model::{CLUSTER_COUNT, DIMENSION_COUNT, POLICY_AREA_COUNT};

/// The rubric's four strict thresholds, applied top-down (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricThresholds {
    /// Minimum normalized score for EXCELENTE.
    pub excelente: f64,
    /// Minimum normalized score for BUENO.
    pub bueno: f64,
    /// Minimum normalized score for ACEPTABLE; below this is INSUFICIENTE.
    pub aceptable: f64,
}

impl Default for RubricThresholds {
    fn default() -> Self {
        Self {
            excelente: 0.85,
            bueno: 0.70,
            aceptable: 0.55,
        }
    }
}

/// Expected item counts at each aggregation level, used by phase 4's
/// coverage check and the cardinality invariants in phases 5-7.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedCounts {
    /// Expected micro-questions per `(PA, DIM)` cell's dimension group.
    pub questions_per_dimension: usize,
    /// Expected dimension count, always 60 unless a PA/DIM is absent.
    pub dimensions_total: usize,
    /// Expected area count, always 10.
    pub areas_total: usize,
    /// Expected cluster count, always 4.
    pub clusters_total: usize,
}

/// Weight tables, grouping keys, expected counts, and rubric thresholds
/// derived deterministically from the Questionnaire (spec §4.3 step f).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Weight per question_id within its dimension group.
    pub dimension_question_weights: WeightTable,
    /// Weight per `DIMnn` within its area group.
    pub area_dimension_weights: WeightTable,
    /// Weight per `PAnn` within its cluster group.
    pub cluster_policy_area_weights: WeightTable,
    /// Weight per `CLnn` at the macro level.
    pub macro_cluster_weights: WeightTable,
    /// Declared cluster -> member policy areas, copied from the
    /// questionnaire for convenient lookup during phase 6's hermeticity
    /// check.
    pub cluster_members: std::collections::BTreeMap<String, Vec<crate::core::model::PolicyAreaId>>,
    /// Expected counts per level.
    pub expected_counts: ExpectedCounts,
    /// The shared rubric thresholds.
    pub rubric_thresholds: RubricThresholds,
}

impl AggregationSettings {
    /// Derives settings from a validated questionnaire. The questionnaire
    /// must already have passed [`Questionnaire::validate_canonical_sets`].
    pub fn derive(questionnaire: &Questionnaire) -> Self {
        let questions_per_dimension = questionnaire.micro_questions.len()
            / (POLICY_AREA_COUNT * DIMENSION_COUNT).max(1);

        Self {
            dimension_question_weights: questionnaire.dimension_question_weights.clone(),
            area_dimension_weights: questionnaire.area_dimension_weights.clone(),
            cluster_policy_area_weights: questionnaire.cluster_policy_area_weights.clone(),
            macro_cluster_weights: questionnaire.macro_cluster_weights.clone(),
            cluster_members: questionnaire.cluster_members.clone(),
            expected_counts: ExpectedCounts {
                questions_per_dimension,
                dimensions_total: POLICY_AREA_COUNT * DIMENSION_COUNT,
                areas_total: POLICY_AREA_COUNT,
                clusters_total: CLUSTER_COUNT,
            },
            rubric_thresholds: RubricThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::questionnaire::WeightTable;
    use std::collections::BTreeMap;

    #[test]
    fn default_thresholds_match_spec() {
        let t = RubricThresholds::default();
        assert_eq!(t.excelente, 0.85);
        assert_eq!(t.bueno, 0.70);
        assert_eq!(t.aceptable, 0.55);
    }

    #[test]
    fn derive_computes_expected_counts() {
        let questionnaire = Questionnaire {
            micro_questions: Vec::new(),
            meso_questions: Vec::new(),
            macro_question: crate::core::model::MacroQuestion {
                question_id: "M".into(),
            },
            dimension_question_weights: WeightTable::new(),
            area_dimension_weights: WeightTable::new(),
            cluster_policy_area_weights: WeightTable::new(),
            macro_cluster_weights: WeightTable::new(),
            cluster_members: BTreeMap::new(),
        };
        let settings = AggregationSettings::derive(&questionnaire);
        assert_eq!(settings.expected_counts.dimensions_total, 60);
        assert_eq!(settings.expected_counts.areas_total, 10);
        assert_eq!(settings.expected_counts.clusters_total, 4);
    }
}
