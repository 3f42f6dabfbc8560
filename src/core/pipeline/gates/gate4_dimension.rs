//! Phase 4 — Dimension Aggregator (spec §4.6).

use std::collections::{BTreeMap, HashMap};

use crate::core::aggregation_math::{clamp, weighted_mean_with_fallback};
use crate::core::config::AggregationSettings;
use crate::core::errors::{PipelineError, Result};
use crate::core::model::{DimensionScore, GridKey, ScoredMicroQuestion};
use crate::core::pipeline::envelope::Invariant;
use crate::core::pipeline::rubric::classify_with;

/// Input to phase 4: every scored micro-question and the settings
/// derived in phase 0.
pub struct Gate4Input {
    /// The scorer's output for all successfully routed questions.
    pub scored: Vec<ScoredMicroQuestion>,
    /// Grouping keys, expected counts, weights, and rubric thresholds.
    pub settings: AggregationSettings,
    /// Whether a coverage shortfall aborts the phase (`true`) or degrades
    /// a single dimension to `validation_passed=false` (`false`).
    pub abort_on_insufficient: bool,
}

/// Rejects null/out-of-range scores at the boundary (spec §4.6 step a);
/// a null score cannot occur in the typed model, so this only checks the
/// numeric range and finiteness.
pub fn validate_input(input: &Gate4Input) -> Vec<String> {
    input
        .scored
        .iter()
        .filter(|s| !s.score.is_finite() || !(0.0..=3.0).contains(&s.score))
        .map(|s| format!("question {} has an out-of-range score {}", s.question_id, s.score))
        .collect()
}

/// Groups by `(policy_area_id, dimension_id)`, checks coverage, resolves
/// weights with equal-weight fallback, and computes the weighted mean
/// (spec §4.6 steps b-f).
pub async fn execute(input: Gate4Input) -> Result<Vec<DimensionScore>> {
    let Gate4Input {
        scored,
        settings,
        abort_on_insufficient,
    } = input;

    let mut groups: BTreeMap<GridKey, Vec<&ScoredMicroQuestion>> = BTreeMap::new();
    for s in &scored {
        let key = GridKey::new(s.metadata.policy_area_id.clone(), s.metadata.dimension_id.clone());
        groups.entry(key).or_default().push(s);
    }

    let expected = settings.expected_counts.questions_per_dimension;
    let mut dimension_scores = Vec::with_capacity(groups.len());

    for (key, members) in groups {
        let mut validation_details = HashMap::new();
        let mut validation_passed = true;

        if expected > 0 && members.len() < expected {
            if abort_on_insufficient {
                return Err(PipelineError::coverage(
                    4,
                    format!("dimension {key} has {} of {expected} expected questions", members.len()),
                    expected,
                    members.len(),
                ));
            }
            validation_passed = false;
            validation_details.insert(
                "coverage_shortfall".to_string(),
                format!("{} of {expected} expected", members.len()),
            );
        }

        let values: Vec<f64> = members.iter().map(|m| m.score).collect();
        let weights: Vec<f64> = members
            .iter()
            .map(|m| {
                *settings
                    .dimension_question_weights
                    .get(&m.question_id)
                    .unwrap_or(&0.0)
            })
            .collect();

        let (mean, used_fallback) = weighted_mean_with_fallback(&values, &weights)?;
        if used_fallback {
            validation_details.insert("weight_fallback".to_string(), "equal_weights".to_string());
        }
        let score = clamp(mean, 0.0, 3.0);
        let normalized = score / 3.0;

        dimension_scores.push(DimensionScore {
            policy_area_id: key.policy_area_id,
            dimension_id: key.dimension_id,
            contributing_question_ids: members.iter().map(|m| m.question_id.clone()).collect(),
            score,
            quality_level: classify_with(normalized, &settings.rubric_thresholds),
            validation_passed,
            validation_details,
        });
    }

    Ok(dimension_scores)
}

/// Phase 4's output contract: at most 60 dimensions, each `(PA, DIM)`
/// appearing at most once, every score finite and in `[0, 3]`.
pub fn validate_output(scores: &[DimensionScore]) -> Vec<String> {
    let mut errors = Vec::new();
    if scores.len() > 60 {
        errors.push(format!("expected at most 60 DimensionScore, got {}", scores.len()));
    }
    let mut seen = std::collections::BTreeSet::new();
    for s in scores {
        let key = (s.policy_area_id.clone(), s.dimension_id.clone());
        if !seen.insert(key) {
            errors.push(format!(
                "duplicate DimensionScore for {}/{}",
                s.policy_area_id, s.dimension_id
            ));
        }
        if !s.score.is_finite() || !(0.0..=3.0).contains(&s.score) {
            errors.push(format!(
                "DimensionScore {}/{} has out-of-range score {}",
                s.policy_area_id, s.dimension_id, s.score
            ));
        }
    }
    errors
}

/// Phase 4's post-execution invariants.
pub fn invariants() -> Vec<Invariant<Vec<DimensionScore>>> {
    vec![Invariant {
        name: "at_most_60_dimension_scores",
        check: |scores: &Vec<DimensionScore>| scores.len() <= 60,
    }]
}
