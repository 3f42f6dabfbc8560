//! Phase 5 — Area Aggregator (spec §4.7).

use std::collections::BTreeMap;

use crate::core::aggregation_math::{clamp, weighted_mean_with_fallback};
use crate::core::config::AggregationSettings;
use crate::core::errors::Result;
use crate::core::model::{AreaScore, DimensionScore, PolicyAreaId, QualityLevel};
use crate::core::pipeline::envelope::Invariant;
use crate::core::pipeline::rubric::classify_with;

/// Input to phase 5: the dimension scores from phase 4 and the settings
/// derived in phase 0.
pub struct Gate5Input {
    /// Up to 60 dimension scores.
    pub dimension_scores: Vec<DimensionScore>,
    /// Weight tables and rubric thresholds.
    pub settings: AggregationSettings,
}

/// Nothing to reject up front; every `DimensionScore` is already typed
/// and range-checked by phase 4's output contract.
pub fn validate_input(_input: &Gate5Input) -> Vec<String> {
    Vec::new()
}

/// Groups by `policy_area_id`, weights from `area_dimension_weights`,
/// weighted average clamped to `[0, 3]`, rubric applied (spec §4.7).
pub async fn execute(input: Gate5Input) -> Result<Vec<AreaScore>> {
    let Gate5Input {
        dimension_scores,
        settings,
    } = input;

    let mut grouped: BTreeMap<PolicyAreaId, Vec<DimensionScore>> = BTreeMap::new();
    for area in PolicyAreaId::canonical_set() {
        grouped.insert(area, Vec::new());
    }
    for dim_score in dimension_scores {
        grouped
            .entry(dim_score.policy_area_id.clone())
            .or_default()
            .push(dim_score);
    }

    let mut area_scores = Vec::with_capacity(grouped.len());
    for (policy_area_id, mut dims) in grouped {
        dims.sort_by(|a, b| a.dimension_id.cmp(&b.dimension_id));

        if dims.is_empty() {
            area_scores.push(AreaScore {
                policy_area_id,
                score: 0.0,
                quality_level: QualityLevel::Insuficiente,
                dimension_scores: dims,
                validation_passed: false,
            });
            continue;
        }

        let values: Vec<f64> = dims.iter().map(|d| d.score).collect();
        let weights: Vec<f64> = dims
            .iter()
            .map(|d| {
                *settings
                    .area_dimension_weights
                    .get(d.dimension_id.as_str())
                    .unwrap_or(&0.0)
            })
            .collect();
        let (mean, _) = weighted_mean_with_fallback(&values, &weights)?;
        let score = clamp(mean, 0.0, 3.0);

        area_scores.push(AreaScore {
            policy_area_id,
            score,
            quality_level: classify_with(score / 3.0, &settings.rubric_thresholds),
            dimension_scores: dims,
            validation_passed: true,
        });
    }

    Ok(area_scores)
}

/// Phase 5's output contract: exactly 10 areas, one per canonical PA.
pub fn validate_output(areas: &[AreaScore]) -> Vec<String> {
    let mut errors = Vec::new();
    if areas.len() != 10 {
        errors.push(format!("expected exactly 10 AreaScore, got {}", areas.len()));
    }
    for area in areas {
        if !area.score.is_finite() || !(0.0..=3.0).contains(&area.score) {
            errors.push(format!(
                "AreaScore {} has out-of-range score {}",
                area.policy_area_id, area.score
            ));
        }
    }
    errors
}

/// Phase 5's post-execution invariants.
pub fn invariants() -> Vec<Invariant<Vec<AreaScore>>> {
    vec![Invariant {
        name: "exactly_10_area_scores",
        check: |areas: &Vec<AreaScore>| areas.len() == 10,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::questionnaire::WeightTable;
    use crate::core::model::DimensionId;

    fn settings() -> AggregationSettings {
        AggregationSettings {
            dimension_question_weights: WeightTable::new(),
            area_dimension_weights: WeightTable::new(),
            cluster_policy_area_weights: WeightTable::new(),
            macro_cluster_weights: WeightTable::new(),
            cluster_members: Default::default(),
            expected_counts: crate::core::config::ExpectedCounts {
                questions_per_dimension: 5,
                dimensions_total: 60,
                areas_total: 10,
                clusters_total: 4,
            },
            rubric_thresholds: Default::default(),
        }
    }

    fn dim_score(pa: &str, dim: &str, score: f64) -> DimensionScore {
        DimensionScore {
            policy_area_id: PolicyAreaId::new(pa).unwrap(),
            dimension_id: DimensionId::new(dim).unwrap(),
            contributing_question_ids: Vec::new(),
            score,
            quality_level: QualityLevel::Bueno,
            validation_passed: true,
            validation_details: Default::default(),
        }
    }

    #[tokio::test]
    async fn produces_exactly_10_areas_even_when_sparse() {
        let dims = vec![dim_score("PA01", "DIM01", 2.4)];
        let areas = execute(Gate5Input {
            dimension_scores: dims,
            settings: settings(),
        })
        .await
        .unwrap();
        assert_eq!(areas.len(), 10);
        let pa01 = areas.iter().find(|a| a.policy_area_id.as_str() == "PA01").unwrap();
        assert!((pa01.score - 2.4).abs() < 1e-9);
        let pa02 = areas.iter().find(|a| a.policy_area_id.as_str() == "PA02").unwrap();
        assert_eq!(pa02.score, 0.0);
        assert!(!pa02.validation_passed);
    }
}
