//! The single quality rubric applied at every aggregation level (spec
//! §4.6). Thresholds are strict greater-or-equal, applied top-down.

use crate::core::config::RubricThresholds;
use crate::core::model::QualityLevel;

/// Classifies a normalized score (`score / 3`, in `[0, 1]`) against the
/// default thresholds (0.85 / 0.70 / 0.55).
pub fn classify(normalized_score: f64) -> QualityLevel {
    classify_with(normalized_score, &RubricThresholds::default())
}

/// Classifies a normalized score against explicit `thresholds`, letting
/// callers apply a questionnaire-derived rubric rather than the default.
pub fn classify_with(normalized_score: f64, thresholds: &RubricThresholds) -> QualityLevel {
    if normalized_score >= thresholds.excelente {
        QualityLevel::Excelente
    } else if normalized_score >= thresholds.bueno {
        QualityLevel::Bueno
    } else if normalized_score >= thresholds.aceptable {
        QualityLevel::Aceptable
    } else {
        QualityLevel::Insuficiente
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_boundary_values_per_spec_example() {
        assert_eq!(classify(0.8), QualityLevel::Bueno);
    }

    #[test]
    fn thresholds_are_strict_greater_or_equal() {
        assert_eq!(classify(0.85), QualityLevel::Excelente);
        assert_eq!(classify(0.8499999), QualityLevel::Bueno);
        assert_eq!(classify(0.70), QualityLevel::Bueno);
        assert_eq!(classify(0.6999999), QualityLevel::Aceptable);
        assert_eq!(classify(0.55), QualityLevel::Aceptable);
        assert_eq!(classify(0.5499999), QualityLevel::Insuficiente);
    }

    #[test]
    fn is_idempotent_when_reapplied_to_its_own_label_boundary() {
        let label = classify(0.425);
        assert_eq!(label, QualityLevel::Insuficiente);
        assert_eq!(classify(0.425), label);
    }
}
