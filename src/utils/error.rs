use thiserror::Error;

#[derive(Debug, Error)]
pub enum PassportError {
    #[error("Image processing error: {0}")]
    ImageProcessingError(String),

    #[error("OCR engine error: {0}")]
    OcrError(String),

    /// No two plausible MRZ lines after every page segmentation strategy was tried.
    #[error("MRZ extraction error: no machine readable zone found after {attempts} OCR attempt(s)")]
    MrzExtractionError {
        attempts: usize,
        confidence: Option<f32>,
    },

    /// The two-line zone was found but its field layout could not be decoded.
    #[error("MRZ parsing error: {0}")]
    MrzParsingError(String),

    /// Raised only when the caller asks for invalid records to be treated as fatal.
    #[error("Validation error: {}", errors.join("; "))]
    ValidationError {
        errors: Vec<String>,
        confidence: Option<f32>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PassportError {
    /// OCR confidence that accompanied the failure, when one was measured.
    pub fn confidence(&self) -> Option<f32> {
        match self {
            PassportError::MrzExtractionError { confidence, .. } => *confidence,
            PassportError::ValidationError { confidence, .. } => *confidence,
            _ => None,
        }
    }
}
