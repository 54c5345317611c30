use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::{LabelExtensions, LabelPatterns, NameConfusion, ValidationRules};
use crate::processing::ocr::{PageSegStrategy, MRZ_WHITELIST};
use crate::utils::PassportError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub language: String,
    /// Directory holding `<language>.traineddata`; Tesseract's default when unset.
    pub datapath: Option<String>,
    pub dpi_hint: u32,
    pub zone_whitelist: String,
    /// Page segmentation strategies tried, in order, until two MRZ lines appear.
    pub strategies: Vec<PageSegStrategy>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        OcrSettings {
            language: "eng".to_string(),
            datapath: None,
            dpi_hint: 300,
            zone_whitelist: MRZ_WHITELIST.to_string(),
            strategies: PageSegStrategy::FALLBACK_ORDER.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub preprocess: bool,
    pub min_width: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            preprocess: true,
            min_width: 1200,
        }
    }
}

/// Settings for one pipeline instance, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ocr: OcrSettings,
    pub image: ImageSettings,
    pub validation: ValidationRules,
    /// Extra label patterns, appended to the built-in multilingual tables.
    pub labels: LabelExtensions,
    pub names: NameConfusion,
    /// Raise a validation error instead of returning an invalid record.
    pub strict: bool,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, PassportError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PassportError::ConfigError(format!("Failed to read {:?}: {}", path, e)))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, PassportError> {
        let config: PipelineConfig = serde_json::from_str(json)
            .map_err(|e| PassportError::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Built-in label tables extended with the configured extras.
    pub fn label_patterns(&self) -> LabelPatterns {
        LabelPatterns::default().extended_with(&self.labels)
    }

    fn check(&self) -> Result<(), PassportError> {
        if self.ocr.strategies.is_empty() {
            return Err(PassportError::ConfigError(
                "At least one page segmentation strategy is required".to_string(),
            ));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(PassportError::ConfigError("OCR language is empty".to_string()));
        }
        if self.validation.confidence_error_below > self.validation.confidence_warning_below {
            return Err(PassportError::ConfigError(
                "confidence_error_below must not exceed confidence_warning_below".to_string(),
            ));
        }
        Ok(())
    }
}
