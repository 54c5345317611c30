pub mod checksum;
pub mod extractors;
pub mod image;
pub mod mrz;
pub mod mrz_lines;
pub mod name_recovery;
pub mod ocr;

pub use extractors::{VisualFieldScanner, VisualFields};
pub use image::{ImageProcessor, PreparedImage};
pub use mrz::{DecodedZone, ZoneDecoder};
pub use mrz_lines::ZoneLineDetector;
pub use name_recovery::{NameRecovery, RecoveredName};
pub use ocr::{OcrEngine, PageSegStrategy, ScanOptions, TesseractEngine, TextScanner};
