//! QuestionnaireLoader: the phase 0 boundary collaborator that turns a
//! path into a normalized Questionnaire and its canonical hash.

use std::path::Path;

use crate::core::config::Questionnaire;
use crate::core::errors::{PipelineError, Result};

/// Loads a questionnaire from a path, returning it alongside its
/// canonical-bytes hash. Must be deterministic: the same file always
/// produces the same questionnaire and the same hash.
pub trait QuestionnaireLoader: Send + Sync {
    /// Loads and normalizes the questionnaire at `path`.
    fn load(&self, path: &Path) -> Result<(Questionnaire, String)>;
}

/// Loads a questionnaire serialized as JSON on disk.
#[derive(Debug, Clone, Default)]
pub struct JsonQuestionnaireLoader;

impl QuestionnaireLoader for JsonQuestionnaireLoader {
    fn load(&self, path: &Path) -> Result<(Questionnaire, String)> {
        let bytes = std::fs::read(path)
            .map_err(|e| PipelineError::io(format!("reading {}", path.display()), e))?;
        let questionnaire: Questionnaire = serde_json::from_slice(&bytes)?;
        questionnaire.validate_canonical_sets()?;
        let hash = questionnaire.content_hash()?;
        Ok((questionnaire, hash))
    }
}

/// Serves a fixed, in-memory questionnaire; used by tests that construct
/// their questionnaire programmatically instead of from a file.
pub struct FixedQuestionnaireLoader {
    questionnaire: Questionnaire,
}

impl FixedQuestionnaireLoader {
    /// Wraps an already-built questionnaire.
    pub fn new(questionnaire: Questionnaire) -> Self {
        Self { questionnaire }
    }
}

impl QuestionnaireLoader for FixedQuestionnaireLoader {
    fn load(&self, _path: &Path) -> Result<(Questionnaire, String)> {
        self.questionnaire.validate_canonical_sets()?;
        let hash = self.questionnaire.content_hash()?;
        Ok((self.questionnaire.clone(), hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::questionnaire::WeightTable;
    use crate::core::model::MacroQuestion;
    use std::collections::BTreeMap;

    fn empty_questionnaire() -> Questionnaire {
        Questionnaire {
            micro_questions: Vec::new(),
            meso_questions: Vec::new(),
            macro_question: MacroQuestion {
                question_id: "M".into(),
            },
            dimension_question_weights: WeightTable::new(),
            area_dimension_weights: WeightTable::new(),
            cluster_policy_area_weights: WeightTable::new(),
            macro_cluster_weights: WeightTable::new(),
            cluster_members: BTreeMap::new(),
        }
    }

    #[test]
    fn fixed_loader_rejects_incomplete_questionnaire() {
        let loader = FixedQuestionnaireLoader::new(empty_questionnaire());
        assert!(loader.load(Path::new("/dev/null")).is_err());
    }
}
