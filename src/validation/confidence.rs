use crate::models::{ValidationOutcome, ValidationRules};

pub struct ConfidenceValidator;

impl ConfidenceValidator {
    pub fn validate(confidence: Option<f32>, rules: &ValidationRules, outcome: &mut ValidationOutcome) {
        let confidence = match confidence {
            Some(confidence) => confidence,
            None => return,
        };
        if confidence < rules.confidence_error_below {
            outcome.error(format!(
                "OCR confidence {:.1} is below {:.0}",
                confidence, rules.confidence_error_below
            ));
        } else if confidence < rules.confidence_warning_below {
            outcome.warning(format!(
                "OCR confidence {:.1} is below {:.0}",
                confidence, rules.confidence_warning_below
            ));
        }
    }
}
