use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

use crate::config::{ImageSettings, PipelineConfig};
use crate::models::*;
use crate::processing::*;
use crate::utils::PassportError;
use crate::validation::Validator;

/// Everything produced for one passport image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub record: IdentityRecord,
    pub outcome: ValidationOutcome,
    /// Confidence of the OCR pass that yielded the MRZ.
    pub confidence: f32,
    pub strategy: PageSegStrategy,
    pub checks: ZoneChecks,
    pub name_recovered: bool,
}

/// Runs the whole recognition pipeline for one image at a time:
/// MRZ scan (with strategy fallback), line detection, decoding, visual field
/// scan and business-rule validation.
pub struct PassportValidator<E: OcrEngine = TesseractEngine> {
    scanner: TextScanner<E>,
    detector: ZoneLineDetector,
    decoder: ZoneDecoder,
    visual: VisualFieldScanner,
    validator: Validator,
    strategies: Vec<PageSegStrategy>,
    image: ImageSettings,
    strict: bool,
    today: Option<NaiveDate>,
}

impl PassportValidator<TesseractEngine> {
    pub fn new(config: &PipelineConfig) -> Result<Self, PassportError> {
        let engine = TesseractEngine::new(config.ocr.datapath.clone(), config.ocr.language.clone());
        Self::with_engine(engine, config)
    }
}

impl<E: OcrEngine> PassportValidator<E> {
    pub fn with_engine(engine: E, config: &PipelineConfig) -> Result<Self, PassportError> {
        if config.ocr.strategies.is_empty() {
            return Err(PassportError::ConfigError(
                "At least one page segmentation strategy is required".to_string(),
            ));
        }
        let tables = LabelTables::from_patterns(&config.label_patterns())?;
        Ok(PassportValidator {
            scanner: TextScanner::new(engine, config.ocr.dpi_hint, config.ocr.zone_whitelist.clone()),
            detector: ZoneLineDetector::new(),
            decoder: ZoneDecoder::new(config.names.clone()),
            visual: VisualFieldScanner::new(tables)?,
            validator: Validator::new(config.validation.clone())?,
            strategies: config.ocr.strategies.clone(),
            image: config.image.clone(),
            strict: config.strict,
            today: None,
        })
    }

    /// Pins the evaluation date used for the century pivot and date rules.
    pub fn at_date(mut self, today: NaiveDate) -> Self {
        self.decoder = self.decoder.with_reference_year(today.year());
        self.today = Some(today);
        self
    }

    // Main function that orchestrates the entire process
    pub fn process(&self, image_path: &Path) -> Result<ScanReport, PassportError> {
        info!("Processing passport image {:?}", image_path);

        // Step 1: Prepare the image; the temp copy lives until this function returns
        let prepared = if self.image.preprocess {
            Some(ImageProcessor::prepare(image_path, self.image.min_width)?)
        } else {
            None
        };
        let ocr_input = prepared.as_ref().map(|p| p.path()).unwrap_or(image_path);

        // Step 2: Find the MRZ, falling back across segmentation strategies
        let (lines, scan, strategy) = self.detect_zone(ocr_input)?;

        // Step 3: Decode it
        let decoded = self.decoder.decode_lines(&lines)?;

        // Step 4: Fill the fields only printed in the visual zone
        let fields = self.scan_visual(ocr_input);
        let mut record = decoded.record;
        record.birth_place = fields.birth_place.unwrap_or_default();
        record.place_of_issue = fields.place_of_issue.unwrap_or_default();
        record.issue_date = fields.issue_date.unwrap_or_default();

        // Step 5: Business rules
        let outcome = match self.today {
            Some(today) => self.validator.validate_at(&record, Some(scan.confidence), today),
            None => self.validator.validate(&record, Some(scan.confidence)),
        };

        if self.strict && !outcome.valid {
            return Err(PassportError::ValidationError {
                errors: outcome.errors,
                confidence: Some(scan.confidence),
            });
        }

        Ok(ScanReport {
            record,
            outcome,
            confidence: scan.confidence,
            strategy,
            checks: decoded.checks,
            name_recovered: decoded.name_recovered,
        })
    }

    /// Tries each strategy in order and stops at the first one that yields two
    /// MRZ lines.
    fn detect_zone(
        &self,
        image: &Path,
    ) -> Result<(Vec<String>, RawScanResult, PageSegStrategy), PassportError> {
        let mut best: Option<(usize, f32)> = None;
        for &strategy in &self.strategies {
            let scan = self.scanner.scan_zone(image, strategy)?;
            let lines = self.detector.detect(&scan.text);
            info!(
                "MRZ scan with {} strategy: {} line(s), confidence {:.1}",
                strategy,
                lines.len(),
                scan.confidence
            );
            if lines.len() >= 2 {
                return Ok((lines, scan, strategy));
            }
            if best.map_or(true, |(count, _)| lines.len() > count) {
                best = Some((lines.len(), scan.confidence));
            }
        }

        warn!(
            "No MRZ found after {} strategies (best attempt: {} line(s))",
            self.strategies.len(),
            best.map(|(count, _)| count).unwrap_or(0)
        );
        Err(PassportError::MrzExtractionError {
            attempts: self.strategies.len(),
            confidence: best.map(|(_, confidence)| confidence),
        })
    }

    /// A failed visual pass only means the visual fields stay empty.
    fn scan_visual(&self, image: &Path) -> VisualFields {
        match self.scanner.scan_visual(image) {
            Ok(scan) => self.visual.scan(&scan.text),
            Err(err) => {
                warn!("Visual zone OCR failed, leaving visual fields empty: {}", err);
                VisualFields::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const LINE1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
    const LINE2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

    const VISUAL_TEXT: &str = "\
UTOPIA PASSPORT
Surname
ERIKSSON
Given names
ANNA MARIA
Place of birth
ZENITH
Date of issue
16 APR 2002
";

    struct ScriptedEngine {
        zone: HashMap<PageSegStrategy, String>,
        visual: Option<String>,
        confidence: f32,
        calls: RefCell<Vec<ScanOptions>>,
    }

    impl ScriptedEngine {
        fn new(zone: &[(PageSegStrategy, String)], visual: Option<&str>) -> Self {
            ScriptedEngine {
                zone: zone.iter().cloned().collect(),
                visual: visual.map(str::to_string),
                confidence: 90.0,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn recognize(&self, _image: &Path, options: &ScanOptions) -> Result<RawScanResult, PassportError> {
            self.calls.borrow_mut().push(options.clone());
            let text = if options.whitelist.is_some() {
                self.zone.get(&options.page_seg_mode).cloned().unwrap_or_default()
            } else {
                self.visual
                    .clone()
                    .ok_or_else(|| PassportError::OcrError("engine crashed".to_string()))?
            };
            Ok(RawScanResult {
                text,
                confidence: self.confidence,
            })
        }
    }

    fn zone_text() -> String {
        format!("UTOPIA\n{}\n{}\n", LINE1, LINE2)
    }

    fn config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.image.preprocess = false;
        config
    }

    fn pipeline(engine: ScriptedEngine, config: &PipelineConfig) -> PassportValidator<ScriptedEngine> {
        PassportValidator::with_engine(engine, config)
            .unwrap()
            .at_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn test_canonical_zone_end_to_end() {
        let engine = ScriptedEngine::new(
            &[(PageSegStrategy::SingleBlock, zone_text())],
            Some(VISUAL_TEXT),
        );
        let report = pipeline(engine, &config()).process(Path::new("passport.jpg")).unwrap();

        let record = &report.record;
        assert_eq!(record.surname, "ERIKSSON");
        assert_eq!(record.given_names, "ANNA MARIA");
        assert_eq!(record.document_number, "L898902C3");
        assert_eq!(record.nationality, "UTO");
        assert_eq!(record.date_of_birth, "12/08/1974");
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.expiry_date, "15/04/2012");
        assert_eq!(record.birth_place, "ZENITH");
        assert_eq!(record.issue_date, "16/04/2002");
        assert_eq!(record.place_of_issue, "");
        assert!(report.checks.document_number);
        assert!(!report.checks.document_number_corrected);
        assert_eq!(report.strategy, PageSegStrategy::SingleBlock);

        assert!(!report.outcome.valid);
        assert_eq!(report.outcome.errors.len(), 1);
        assert!(report.outcome.errors[0].contains("expired"));
        assert!(report.outcome.warnings.is_empty());
    }

    #[test]
    fn test_missing_place_of_issue_is_silent() {
        let engine = ScriptedEngine::new(
            &[(PageSegStrategy::SingleBlock, zone_text())],
            Some(VISUAL_TEXT),
        );
        let report = pipeline(engine, &config()).process(Path::new("passport.jpg")).unwrap();
        assert_eq!(report.record.place_of_issue, "");
        assert!(report
            .outcome
            .errors
            .iter()
            .chain(&report.outcome.warnings)
            .all(|message| !message.to_lowercase().contains("place of issue")));
    }

    #[test]
    fn test_falls_back_to_next_strategy() {
        let engine = ScriptedEngine::new(
            &[
                (PageSegStrategy::SingleBlock, "PASSPORT\nnothing useful".to_string()),
                (PageSegStrategy::SparseText, zone_text()),
            ],
            Some(VISUAL_TEXT),
        );
        let validator = pipeline(engine, &config());
        let report = validator.process(Path::new("passport.jpg")).unwrap();
        assert_eq!(report.strategy, PageSegStrategy::SparseText);

        let calls = validator.scanner_calls();
        let modes: Vec<PageSegStrategy> = calls
            .iter()
            .filter(|call| call.whitelist.is_some())
            .map(|call| call.page_seg_mode)
            .collect();
        assert_eq!(modes, vec![PageSegStrategy::SingleBlock, PageSegStrategy::SparseText]);
    }

    #[test]
    fn test_detection_failure_after_all_strategies() {
        let engine = ScriptedEngine::new(
            &[(PageSegStrategy::Auto, format!("{}\n", LINE2))],
            Some(VISUAL_TEXT),
        );
        let validator = pipeline(engine, &config());
        match validator.process(Path::new("passport.jpg")) {
            Err(PassportError::MrzExtractionError { attempts, confidence }) => {
                assert_eq!(attempts, 3);
                assert_eq!(confidence, Some(90.0));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // Three zone passes and no visual pass.
        assert_eq!(validator.scanner_calls().len(), 3);
    }

    #[test]
    fn test_misread_nationality_still_validated() {
        let line2 = "L898902C36UT07408122F1204159ZE184226B<<<<<10";
        let engine = ScriptedEngine::new(
            &[(PageSegStrategy::SingleBlock, format!("{}\n{}\n", LINE1, line2))],
            Some(VISUAL_TEXT),
        );
        let report = pipeline(engine, &config()).process(Path::new("passport.jpg")).unwrap();
        assert_eq!(report.record.nationality, "UTO");
        assert_eq!(report.outcome.errors.len(), 1);
        assert!(report.outcome.errors[0].contains("expired"));
    }

    #[test]
    fn test_strict_mode_raises_on_invalid_record() {
        let engine = ScriptedEngine::new(
            &[(PageSegStrategy::SingleBlock, zone_text())],
            Some(VISUAL_TEXT),
        );
        let mut config = config();
        config.strict = true;
        let err = pipeline(engine, &config)
            .process(Path::new("passport.jpg"))
            .unwrap_err();
        assert_eq!(err.confidence(), Some(90.0));
        match err {
            PassportError::ValidationError { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("expired"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_visual_ocr_failure_leaves_fields_empty() {
        let engine = ScriptedEngine::new(&[(PageSegStrategy::SingleBlock, zone_text())], None);
        let report = pipeline(engine, &config()).process(Path::new("passport.jpg")).unwrap();
        assert_eq!(report.record.birth_place, "");
        assert_eq!(report.record.issue_date, "");
        assert_eq!(report.outcome.errors.len(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let engine = ScriptedEngine::new(
            &[(PageSegStrategy::SingleBlock, zone_text())],
            Some(VISUAL_TEXT),
        );
        let report = pipeline(engine, &config()).process(Path::new("passport.jpg")).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["record"]["documentNumber"], "L898902C3");
        assert_eq!(json["strategy"], "single_block");
        assert_eq!(json["outcome"]["valid"], false);
    }

    impl PassportValidator<ScriptedEngine> {
        fn scanner_calls(&self) -> Vec<ScanOptions> {
            self.scanner.engine().calls.borrow().clone()
        }
    }
}
