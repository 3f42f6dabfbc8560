//! The Questionnaire: 300 micro-questions, 4 meso questions, 1 macro
//! question, canonical id sets, weight tables, and cluster membership.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::errors::{PipelineError, Result};
use crate::core::identity::content_hash_256;
use crate::core::model::{ClusterId, DimensionId, MacroQuestion, MesoQuestion, PolicyAreaId, Question};

/// A named weight table: `id -> weight`. Kept as a `BTreeMap` so iteration
/// order is lexicographic by key without an explicit sort at every call
/// site (spec §5's fixed-summation-order requirement).
pub type WeightTable = BTreeMap<String, f64>;

/// The normalized questionnaire, loaded once in phase 0 and treated as
/// read-only for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    /// The 300 atomic micro-questions.
    pub micro_questions: Vec<Question>,
    /// The 4 cluster-level (meso) questions.
    pub meso_questions: Vec<MesoQuestion>,
    /// The single macro-level question.
    pub macro_question: MacroQuestion,
    /// Per-question weight within its `(PA, DIM)` cell, keyed by question_id.
    pub dimension_question_weights: WeightTable,
    /// Per-dimension weight within its policy area, keyed by `DIMnn`.
    pub area_dimension_weights: WeightTable,
    /// Per-area weight within its cluster, keyed by `PAnn`.
    pub cluster_policy_area_weights: WeightTable,
    /// Per-cluster weight at the macro level, keyed by `CLnn`.
    pub macro_cluster_weights: WeightTable,
    /// Declared cluster -> member policy areas mapping.
    pub cluster_members: BTreeMap<String, Vec<PolicyAreaId>>,
}

impl Questionnaire {
    /// The canonical policy-area set this questionnaire is defined over.
    /// Always the full `{PA01..PA10}`; a questionnaire referencing anything
    /// outside it fails validation in [`Self::validate_canonical_sets`].
    pub fn canonical_policy_areas() -> Vec<PolicyAreaId> {
        PolicyAreaId::canonical_set()
    }

    /// The canonical dimension set, always `{DIM01..DIM06}`.
    pub fn canonical_dimensions() -> Vec<DimensionId> {
        DimensionId::canonical_set()
    }

    /// The canonical cluster set, always `{CL01..CL04}`.
    pub fn canonical_clusters() -> Vec<ClusterId> {
        ClusterId::canonical_set()
    }

    /// Checks every question and weight-table key against the canonical
    /// sets, and that `cluster_members` partitions the 10 areas across the
    /// 4 clusters with no gaps or overlaps.
    pub fn validate_canonical_sets(&self) -> Result<()> {
        if self.micro_questions.len() != 300 {
            return Err(PipelineError::validation(
                0,
                format!(
                    "questionnaire must declare exactly 300 micro-questions, found {}",
                    self.micro_questions.len()
                ),
            ));
        }
        if self.meso_questions.len() != 4 {
            return Err(PipelineError::validation(
                0,
                format!(
                    "questionnaire must declare exactly 4 meso questions, found {}",
                    self.meso_questions.len()
                ),
            ));
        }

        let declared_clusters: Vec<&String> = self.cluster_members.keys().collect();
        if declared_clusters.len() != 4 {
            return Err(PipelineError::validation(
                0,
                format!(
                    "questionnaire must declare membership for exactly 4 clusters, found {}",
                    declared_clusters.len()
                ),
            ));
        }

        let mut seen_areas: Vec<&PolicyAreaId> = Vec::new();
        for members in self.cluster_members.values() {
            for area in members {
                if seen_areas.contains(&area) {
                    return Err(PipelineError::validation(
                        0,
                        format!("policy area {area} is declared in more than one cluster"),
                    ));
                }
                seen_areas.push(area);
            }
        }
        if seen_areas.len() != 10 {
            return Err(PipelineError::validation(
                0,
                format!(
                    "cluster membership must cover all 10 policy areas exactly once, covered {}",
                    seen_areas.len()
                ),
            ));
        }

        Ok(())
    }

    /// The cluster a policy area belongs to, per declared membership.
    pub fn cluster_of(&self, area: &PolicyAreaId) -> Option<ClusterId> {
        self.cluster_members.iter().find_map(|(cluster, members)| {
            members
                .contains(area)
                .then(|| ClusterId::new(cluster).expect("cluster_members keys are canonical"))
        })
    }

    /// Canonical-bytes SHA-256 hash of this questionnaire, hex-encoded.
    pub fn content_hash(&self) -> Result<String> {
        content_hash_256(self)
    }
}
