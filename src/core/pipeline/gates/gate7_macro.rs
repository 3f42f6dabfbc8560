//! Phase 7 — Macro Evaluator (spec §4.9). The only phase permitted to
//! catch an unexpected internal fault and still return a (diagnostic,
//! flagged) result so the manifest remains emittable.

use std::collections::{HashMap, HashSet};

use crate::core::aggregation_math::{
    clamp, cross_cutting_coherence, population_std_dev, weighted_mean_with_fallback,
};
use crate::core::config::AggregationSettings;
use crate::core::errors::Result;
use crate::core::model::{AreaScore, ClusterScore, DimensionScore, MacroScore, QualityLevel};
use crate::core::pipeline::envelope::Invariant;
use crate::core::pipeline::rubric::classify_with;

/// Input to phase 7: every score level produced so far and the settings
/// derived in phase 0.
pub struct Gate7Input {
    /// Exactly 4 cluster scores (phase 6 output).
    pub cluster_scores: Vec<ClusterScore>,
    /// Exactly 10 area scores (phase 5 output), used for systemic-gap
    /// detection.
    pub area_scores: Vec<AreaScore>,
    /// Up to 60 dimension scores (phase 4 output), used for the
    /// dimension-validation rate.
    pub dimension_scores: Vec<DimensionScore>,
    /// Weight tables and rubric thresholds.
    pub settings: AggregationSettings,
}

/// Nothing to reject up front; every input list is already typed and
/// range-checked by earlier phases' output contracts.
pub fn validate_input(_input: &Gate7Input) -> Vec<String> {
    Vec::new()
}

/// Dedupes, computes the macro weighted mean, coherence, systemic gaps,
/// and strategic alignment (spec §4.9). Never returns `Err`: an empty
/// cluster list yields a zeroed, `validation_passed=false` MacroScore,
/// and any other internal fault is caught and reported the same way,
/// keeping the manifest emittable per spec §7.
pub async fn execute(input: Gate7Input) -> Result<MacroScore> {
    let Gate7Input {
        cluster_scores,
        area_scores,
        dimension_scores,
        settings,
    } = input;

    if cluster_scores.is_empty() {
        return Ok(zeroed_macro_score("no cluster scores to aggregate"));
    }

    match compute(cluster_scores, area_scores, dimension_scores, &settings) {
        Ok(score) => Ok(score),
        Err(e) => {
            tracing::warn!(error = %e, "phase 7 caught an internal fault, returning fallback MacroScore");
            Ok(zeroed_macro_score(&e.to_string()))
        }
    }
}

fn compute(
    cluster_scores: Vec<ClusterScore>,
    area_scores: Vec<AreaScore>,
    dimension_scores: Vec<DimensionScore>,
    settings: &AggregationSettings,
) -> Result<MacroScore> {
    let mut validation_details = HashMap::new();

    let deduped_areas = dedupe_by_id(area_scores, |a| a.policy_area_id.to_string(), &mut validation_details, "area");
    let deduped_dims = dedupe_by_id(
        dimension_scores,
        |d| format!("{}/{}", d.policy_area_id, d.dimension_id),
        &mut validation_details,
        "dimension",
    );

    let values: Vec<f64> = cluster_scores.iter().map(|c| c.score).collect();
    let weights: Vec<f64> = cluster_scores
        .iter()
        .map(|c| {
            *settings
                .macro_cluster_weights
                .get(c.cluster_id.as_str())
                .unwrap_or(&0.0)
        })
        .collect();
    let (weighted, used_fallback) = weighted_mean_with_fallback(&values, &weights)?;
    if used_fallback {
        validation_details.insert("weight_fallback".to_string(), "equal_weights".to_string());
    }
    let macro_score = clamp(weighted, 0.0, 3.0);
    let normalized_score = macro_score / 3.0;

    let sigma = population_std_dev(&values);
    let coherence = cross_cutting_coherence(sigma);

    let mut systemic_gaps: Vec<_> = deduped_areas
        .iter()
        .filter(|a| a.quality_level == QualityLevel::Insuficiente)
        .map(|a| a.policy_area_id.clone())
        .collect();
    systemic_gaps.sort();

    let dimension_validation_rate = if deduped_dims.is_empty() {
        0.0
    } else {
        deduped_dims.iter().filter(|d| d.validation_passed).count() as f64 / deduped_dims.len() as f64
    };

    let strategic_alignment = clamp(0.6 * coherence + 0.4 * dimension_validation_rate, 0.0, 1.0);

    Ok(MacroScore {
        score: macro_score,
        normalized_score,
        quality_band: classify_with(normalized_score, &settings.rubric_thresholds),
        cross_cutting_coherence: coherence,
        systemic_gaps,
        strategic_alignment,
        cluster_scores,
        validation_passed: true,
        validation_details,
    })
}

fn dedupe_by_id<T: Clone>(
    items: Vec<T>,
    id_of: impl Fn(&T) -> String,
    validation_details: &mut HashMap<String, String>,
    label: &str,
) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut conflicts = 0usize;
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let id = id_of(&item);
        if seen.insert(id) {
            result.push(item);
        } else {
            conflicts += 1;
        }
    }
    if conflicts > 0 {
        validation_details.insert(
            format!("{label}_dedup_conflicts"),
            conflicts.to_string(),
        );
    }
    result
}

fn zeroed_macro_score(reason: &str) -> MacroScore {
    let mut validation_details = HashMap::new();
    validation_details.insert("fallback_reason".to_string(), reason.to_string());
    MacroScore {
        score: 0.0,
        normalized_score: 0.0,
        quality_band: QualityLevel::Insuficiente,
        cross_cutting_coherence: 0.0,
        systemic_gaps: Vec::new(),
        strategic_alignment: 0.0,
        cluster_scores: Vec::new(),
        validation_passed: false,
        validation_details,
    }
}

/// Phase 7's output contract: exactly one MacroScore (always satisfied by
/// construction), score range, and label consistency.
pub fn validate_output(score: &MacroScore) -> Vec<String> {
    let mut errors = Vec::new();
    if !score.score.is_finite() || !(0.0..=3.0).contains(&score.score) {
        errors.push(format!("MacroScore has out-of-range score {}", score.score));
    }
    if !(0.0..=1.0).contains(&score.normalized_score) {
        errors.push(format!(
            "MacroScore normalized_score {} is outside [0, 1]",
            score.normalized_score
        ));
    }
    errors
}

/// Phase 7's post-execution invariants.
pub fn invariants() -> Vec<Invariant<MacroScore>> {
    vec![Invariant {
        name: "normalized_score_matches_score_over_three",
        check: |s: &MacroScore| (s.normalized_score - s.score / 3.0).abs() < 1e-9 || !s.validation_passed,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::questionnaire::WeightTable;
    use crate::core::model::{ClusterId, PolicyAreaId};

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

    fn cluster(id: &str, score: f64) -> ClusterScore {
        ClusterScore {
            cluster_id: ClusterId::new(id).unwrap(),
            member_areas: Vec::new(),
            score,
            raw_score: score,
            penalty_factor: 1.0,
            coherence: 1.0,
            variance: 0.0,
            weakest_area: PolicyAreaId::new("PA01").unwrap(),
            quality_level: QualityLevel::Bueno,
            validation_details: Default::default(),
        }
    }

    fn area(pa: &str, quality: QualityLevel) -> AreaScore {
        AreaScore {
            policy_area_id: PolicyAreaId::new(pa).unwrap(),
            score: 2.0,
            quality_level: quality,
            dimension_scores: Vec::new(),
            validation_passed: true,
        }
    }

    fn dimension(pa: &str, dim: &str) -> DimensionScore {
        DimensionScore {
            policy_area_id: PolicyAreaId::new(pa).unwrap(),
            dimension_id: crate::core::model::DimensionId::new(dim).unwrap(),
            contributing_question_ids: Vec::new(),
            score: 2.4,
            quality_level: QualityLevel::Bueno,
            validation_passed: true,
            validation_details: Default::default(),
        }
    }

    #[tokio::test]
    async fn happy_path_matches_spec_example() {
        let clusters = vec![
            cluster("CL01", 2.4),
            cluster("CL02", 2.4),
            cluster("CL03", 2.4),
            cluster("CL04", 2.4),
        ];
        let areas = vec![area("PA01", QualityLevel::Bueno)];
        let dimensions = vec![dimension("PA01", "DIM01"), dimension("PA01", "DIM02")];
        let result = execute(Gate7Input {
            cluster_scores: clusters,
            area_scores: areas,
            dimension_scores: dimensions,
            settings: settings(),
        })
        .await
        .unwrap();
        assert!((result.score - 2.4).abs() < 1e-9);
        assert!((result.normalized_score - 0.8).abs() < 1e-9);
        assert_eq!(result.quality_band, QualityLevel::Bueno);
        assert!(result.systemic_gaps.is_empty());
        assert!((result.strategic_alignment - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn systemic_gaps_are_lexicographically_ordered() {
        let clusters = vec![cluster("CL01", 2.0)];
        let areas = vec![
            area("PA07", QualityLevel::Insuficiente),
            area("PA03", QualityLevel::Insuficiente),
            area("PA01", QualityLevel::Bueno),
        ];
        let result = execute(Gate7Input {
            cluster_scores: clusters,
            area_scores: areas,
            dimension_scores: Vec::new(),
            settings: settings(),
        })
        .await
        .unwrap();
        let gaps: Vec<String> = result.systemic_gaps.iter().map(|p| p.to_string()).collect();
        assert_eq!(gaps, vec!["PA03".to_string(), "PA07".to_string()]);
    }

    #[tokio::test]
    async fn empty_cluster_list_yields_zeroed_fallback() {
        let result = execute(Gate7Input {
            cluster_scores: Vec::new(),
            area_scores: Vec::new(),
            dimension_scores: Vec::new(),
            settings: settings(),
        })
        .await
        .unwrap();
        assert!(!result.validation_passed);
        assert_eq!(result.score, 0.0);
    }
}
