use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::equalize_histogram;
use log::debug;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::utils::PassportError;

/// A preprocessed copy of the input image on disk. The temporary file is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct PreparedImage {
    file: NamedTempFile,
    pub width: u32,
    pub height: u32,
}

impl PreparedImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Loads the page, converts it to grayscale, upscales narrow photos to
    /// `min_width` and equalises the histogram before writing a PNG copy.
    pub fn prepare(image_path: &Path, min_width: u32) -> Result<PreparedImage, PassportError> {
        let img = image::open(image_path).map_err(|e| {
            PassportError::ImageProcessingError(format!("Failed to open image {:?}: {}", image_path, e))
        })?;
        let processed = Self::preprocess_image(&img, min_width);
        debug!(
            "Prepared {:?}: {}x{} -> {}x{}",
            image_path,
            img.width(),
            img.height(),
            processed.width(),
            processed.height()
        );

        let file = tempfile::Builder::new()
            .prefix("passport-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| PassportError::ImageProcessingError(format!("Failed to create temp file: {}", e)))?;
        processed
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| PassportError::ImageProcessingError(format!("Failed to write temp image: {}", e)))?;

        Ok(PreparedImage {
            width: processed.width(),
            height: processed.height(),
            file,
        })
    }

    fn preprocess_image(img: &DynamicImage, min_width: u32) -> GrayImage {
        let gray = img.to_luma8();
        let scaled = if gray.width() > 0 && gray.width() < min_width {
            let factor = min_width as f64 / gray.width() as f64;
            let height = ((gray.height() as f64) * factor).round().max(1.0) as u32;
            image::imageops::resize(&gray, min_width, height, FilterType::CatmullRom)
        } else {
            gray
        };
        equalize_histogram(&scaled)
    }
}
