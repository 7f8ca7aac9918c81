//! Image normalization before the fallback OCR pass
//!
//! General-purpose OCR engines read low-contrast plate crops poorly;
//! grayscale conversion plus contrast stretch and a light blur to knock
//! down sensor noise measurably improves their hit rate.

use std::io::Cursor;

use image::ImageFormat;
use tracing::debug;

use placa_types::Result;

/// Contrast boost applied before the fallback engine
const CONTRAST_BOOST: f32 = 32.0;

/// Gaussian sigma for denoising
const DENOISE_SIGMA: f32 = 0.8;

/// Re-encode the image region as a normalized grayscale PNG
pub fn enhance_for_ocr(image_bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(image_bytes)?;

    debug!(
        width = img.width(),
        height = img.height(),
        "normalizing region for fallback OCR"
    );

    let enhanced = img
        .grayscale()
        .adjust_contrast(CONTRAST_BOOST)
        .blur(DENOISE_SIGMA);

    let mut out = Cursor::new(Vec::new());
    enhanced.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
