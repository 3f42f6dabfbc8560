//! Phase 6 — Cluster Aggregator (spec §4.8).

use std::collections::{BTreeMap, HashMap};

use crate::core::aggregation_math::{
    cluster_coherence, clamp, imbalance_penalty_factor, mean, population_std_dev,
    weighted_mean_with_fallback,
};
use crate::core::config::AggregationSettings;
use crate::core::errors::{PipelineError, Result};
use crate::core::model::{AreaScore, ClusterId, ClusterScore, PolicyAreaId};
use crate::core::pipeline::envelope::Invariant;
use crate::core::pipeline::rubric::classify_with;

/// Input to phase 6: the 10 area scores from phase 5 and the settings
/// derived in phase 0.
pub struct Gate6Input {
    /// Exactly 10 area scores.
    pub area_scores: Vec<AreaScore>,
    /// Cluster membership, weight tables, and rubric thresholds.
    pub settings: AggregationSettings,
}

/// Nothing to reject ahead of the per-cluster hermeticity check, which
/// needs the grouped view `execute` builds.
pub fn validate_input(_input: &Gate6Input) -> Vec<String> {
    Vec::new()
}

/// Maps areas to clusters, checks hermeticity, applies weighted mean and
/// the imbalance penalty (spec §4.8).
pub async fn execute(input: Gate6Input) -> Result<Vec<ClusterScore>> {
    let Gate6Input {
        area_scores,
        settings,
    } = input;

    let by_area: HashMap<PolicyAreaId, &AreaScore> =
        area_scores.iter().map(|a| (a.policy_area_id.clone(), a)).collect();

    let mut cluster_scores = Vec::with_capacity(settings.cluster_members.len());

    for (cluster_key, declared_members) in &settings.cluster_members {
        let cluster_id = ClusterId::new(cluster_key.as_str())?;

        let mut observed: Vec<&PolicyAreaId> =
            area_scores.iter().map(|a| &a.policy_area_id).collect();
        observed.retain(|a| declared_members.contains(a));

        if observed.len() != declared_members.len() {
            return Err(PipelineError::hermeticity(
                cluster_id.to_string(),
                format!(
                    "cluster declares {} members but {} were observed",
                    declared_members.len(),
                    observed.len()
                ),
            ));
        }

        let mut members: Vec<&AreaScore> = declared_members
            .iter()
            .map(|area_id| {
                by_area.get(area_id).copied().ok_or_else(|| {
                    PipelineError::hermeticity(
                        cluster_id.to_string(),
                        format!("mandatory member {area_id} has no AreaScore"),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        members.sort_by(|a, b| a.policy_area_id.cmp(&b.policy_area_id));

        let values: Vec<f64> = members.iter().map(|a| a.score).collect();
        let weights: Vec<f64> = members
            .iter()
            .map(|a| {
                *settings
                    .cluster_policy_area_weights
                    .get(a.policy_area_id.as_str())
                    .unwrap_or(&0.0)
            })
            .collect();

        let (weighted, _) = weighted_mean_with_fallback(&values, &weights)?;
        let raw_score = clamp(weighted, 0.0, 3.0);

        let mu = mean(&values);
        let sigma = population_std_dev(&values);
        let mut penalty_factor = imbalance_penalty_factor(sigma);
        let mut validation_details = HashMap::new();
        validation_details.insert("mean".to_string(), format!("{mu:.6}"));
        validation_details.insert("std_dev".to_string(), format!("{sigma:.6}"));
        validation_details.insert("raw_score".to_string(), format!("{raw_score:.6}"));

        let mut score = raw_score * penalty_factor;
        if !score.is_finite() {
            validation_details.insert("penalty_nan_fallback".to_string(), "true".to_string());
            penalty_factor = 1.0;
            score = raw_score;
        }
        validation_details.insert("penalty_factor".to_string(), format!("{penalty_factor:.6}"));
        validation_details.insert("adjusted_score".to_string(), format!("{score:.6}"));
        score = clamp(score, 0.0, 3.0);

        let weakest_idx = members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let weakest_area = members[weakest_idx].policy_area_id.clone();

        cluster_scores.push(ClusterScore {
            cluster_id,
            member_areas: members.iter().map(|a| a.policy_area_id.clone()).collect(),
            score,
            raw_score,
            penalty_factor,
            coherence: cluster_coherence(sigma),
            variance: sigma * sigma,
            weakest_area,
            quality_level: classify_with(score / 3.0, &settings.rubric_thresholds),
            validation_details,
        });
    }

    cluster_scores.sort_by(|a, b| a.cluster_id.cmp(&b.cluster_id));
    Ok(cluster_scores)
}

/// Phase 6's output contract: exactly 4 clusters, every score finite and
/// in `[0, 3]`.
pub fn validate_output(clusters: &[ClusterScore]) -> Vec<String> {
    let mut errors = Vec::new();
    if clusters.len() != 4 {
        errors.push(format!("expected exactly 4 ClusterScore, got {}", clusters.len()));
    }
    for c in clusters {
        if !c.score.is_finite() || !(0.0..=3.0).contains(&c.score) {
            errors.push(format!("ClusterScore {} has out-of-range score {}", c.cluster_id, c.score));
        }
    }
    errors
}

/// Phase 6's post-execution invariants.
pub fn invariants() -> Vec<Invariant<Vec<ClusterScore>>> {
    vec![
        Invariant {
            name: "exactly_4_cluster_scores",
            check: |clusters: &Vec<ClusterScore>| clusters.len() == 4,
        },
        Invariant {
            name: "hermeticity_no_alien_members",
            check: |clusters: &Vec<ClusterScore>| {
                clusters.iter().all(|c| {
                    let mut sorted = c.member_areas.clone();
                    sorted.sort();
                    sorted.dedup();
                    sorted.len() == c.member_areas.len()
                })
            },
        },
    ]
}
