use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tesseract::{PageSegMode, Tesseract};

use crate::models::RawScanResult;
use crate::utils::PassportError;

/// Characters the MRZ pass is allowed to produce.
pub const MRZ_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789<";

/// How the OCR engine should interpret page layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegStrategy {
    /// One uniform block of text.
    SingleBlock,
    /// As much text as possible, in no particular order.
    SparseText,
    /// Fully automatic layout analysis.
    Auto,
}

impl PageSegStrategy {
    /// Order in which MRZ detection falls back across strategies.
    pub const FALLBACK_ORDER: [PageSegStrategy; 3] = [
        PageSegStrategy::SingleBlock,
        PageSegStrategy::SparseText,
        PageSegStrategy::Auto,
    ];

    fn tesseract_mode(self) -> PageSegMode {
        match self {
            PageSegStrategy::SingleBlock => PageSegMode::PsmSingleBlock,
            PageSegStrategy::SparseText => PageSegMode::PsmSparseText,
            PageSegStrategy::Auto => PageSegMode::PsmAuto,
        }
    }
}

impl fmt::Display for PageSegStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PageSegStrategy::SingleBlock => write!(f, "single block"),
            PageSegStrategy::SparseText => write!(f, "sparse text"),
            PageSegStrategy::Auto => write!(f, "automatic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub whitelist: Option<String>,
    pub page_seg_mode: PageSegStrategy,
    pub dpi_hint: u32,
}

/// An OCR engine that turns one image into text and a 0-100 confidence.
pub trait OcrEngine {
    fn recognize(&self, image: &Path, options: &ScanOptions) -> Result<RawScanResult, PassportError>;
}

/// Tesseract backed engine. A fresh Tesseract instance is created for every
/// call and dropped before the call returns.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    datapath: Option<String>,
    language: String,
}

impl TesseractEngine {
    pub fn new(datapath: Option<String>, language: impl Into<String>) -> Self {
        TesseractEngine {
            datapath,
            language: language.into(),
        }
    }

    /// Runs `recognize` against a freshly initialised engine. `recognize` takes
    /// the engine by value, so it is dropped before this call returns on every
    /// path, success or error.
    fn with_engine<T>(
        &self,
        recognize: impl FnOnce(Tesseract) -> Result<T, PassportError>,
    ) -> Result<T, PassportError> {
        let tess = Tesseract::new(self.datapath.as_deref(), Some(&self.language))
            .map_err(|e| PassportError::OcrError(format!("Tesseract init error: {}", e)))?;
        debug!("Tesseract engine acquired (lang={})", self.language);
        let result = recognize(tess);
        debug!("Tesseract engine released");
        result
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &Path, options: &ScanOptions) -> Result<RawScanResult, PassportError> {
        let image_path = image
            .to_str()
            .ok_or_else(|| PassportError::OcrError(format!("Image path is not valid UTF-8: {:?}", image)))?;

        self.with_engine(|tess| {
            let tess = match &options.whitelist {
                Some(whitelist) => tess
                    .set_variable("tessedit_char_whitelist", whitelist)
                    .map_err(|e| PassportError::OcrError(format!("Tesseract set variable error: {}", e)))?,
                None => tess,
            };
            let mut tess = tess
                .set_variable("user_defined_dpi", &options.dpi_hint.to_string())
                .map_err(|e| PassportError::OcrError(format!("Tesseract set variable error: {}", e)))?;
            tess.set_page_seg_mode(options.page_seg_mode.tesseract_mode());

            let mut tess = tess
                .set_image(image_path)
                .map_err(|e| PassportError::OcrError(format!("Tesseract set image error: {}", e)))?;
            let text = tess
                .get_text()
                .map_err(|e| PassportError::OcrError(format!("Tesseract error: {}", e)))?;
            let confidence = tess.mean_text_conf().clamp(0, 100) as f32;

            Ok(RawScanResult { text, confidence })
        })
    }
}

/// Runs single OCR passes for the MRZ and for the printed (visual) zone.
pub struct TextScanner<E: OcrEngine> {
    engine: E,
    dpi_hint: u32,
    zone_whitelist: String,
}

impl<E: OcrEngine> TextScanner<E> {
    pub fn new(engine: E, dpi_hint: u32, zone_whitelist: impl Into<String>) -> Self {
        TextScanner {
            engine,
            dpi_hint,
            zone_whitelist: zone_whitelist.into(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn scan(&self, image: &Path, options: &ScanOptions) -> Result<RawScanResult, PassportError> {
        debug!(
            "OCR pass: mode={}, whitelist={}, dpi={}",
            options.page_seg_mode,
            options.whitelist.is_some(),
            options.dpi_hint
        );
        let result = self.engine.recognize(image, options)?;
        debug!(
            "OCR pass returned {} line(s), confidence {:.1}",
            result.text.lines().count(),
            result.confidence
        );
        Ok(result)
    }

    /// Whitelisted pass for the machine readable zone.
    pub fn scan_zone(&self, image: &Path, strategy: PageSegStrategy) -> Result<RawScanResult, PassportError> {
        self.scan(
            image,
            &ScanOptions {
                whitelist: Some(self.zone_whitelist.clone()),
                page_seg_mode: strategy,
                dpi_hint: self.dpi_hint,
            },
        )
    }

    /// Unconstrained pass for labelled fields in the printed area.
    pub fn scan_visual(&self, image: &Path) -> Result<RawScanResult, PassportError> {
        self.scan(
            image,
            &ScanOptions {
                whitelist: None,
                page_seg_mode: PageSegStrategy::Auto,
                dpi_hint: self.dpi_hint,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingEngine {
        calls: RefCell<Vec<ScanOptions>>,
    }

    impl OcrEngine for RecordingEngine {
        fn recognize(&self, _image: &Path, options: &ScanOptions) -> Result<RawScanResult, PassportError> {
            self.calls.borrow_mut().push(options.clone());
            Ok(RawScanResult {
                text: "TEXT".to_string(),
                confidence: 88.0,
            })
        }
    }

    #[test]
    fn test_zone_scan_uses_whitelist_and_strategy() {
        let scanner = TextScanner::new(
            RecordingEngine { calls: RefCell::new(Vec::new()) },
            300,
            MRZ_WHITELIST,
        );
        let result = scanner
            .scan_zone(Path::new("page.png"), PageSegStrategy::SparseText)
            .unwrap();
        assert_eq!(result.confidence, 88.0);

        let calls = scanner.engine.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].whitelist.as_deref(), Some(MRZ_WHITELIST));
        assert_eq!(calls[0].page_seg_mode, PageSegStrategy::SparseText);
        assert_eq!(calls[0].dpi_hint, 300);
    }

    #[test]
    fn test_visual_scan_has_no_whitelist() {
        let scanner = TextScanner::new(
            RecordingEngine { calls: RefCell::new(Vec::new()) },
            200,
            MRZ_WHITELIST,
        );
        scanner.scan_visual(Path::new("page.png")).unwrap();
        let calls = scanner.engine.calls.borrow();
        assert_eq!(calls[0].whitelist, None);
        assert_eq!(calls[0].page_seg_mode, PageSegStrategy::Auto);
    }

    #[test]
    fn test_fallback_order() {
        assert_eq!(
            PageSegStrategy::FALLBACK_ORDER,
            [
                PageSegStrategy::SingleBlock,
                PageSegStrategy::SparseText,
                PageSegStrategy::Auto
            ]
        );
    }

    #[test]
    fn test_strategy_config_names() {
        let parsed: Vec<PageSegStrategy> =
            serde_json::from_str(r#"["single_block", "sparse_text", "auto"]"#).unwrap();
        assert_eq!(parsed, PageSegStrategy::FALLBACK_ORDER.to_vec());
    }
}
