use image::DynamicImage;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

#[cfg(feature = "ocr")]
use image::{imageops, GrayImage, Luma};
#[cfg(feature = "ocr")]
use imageproc::{
    contrast::adaptive_threshold,
    distance_transform::Norm,
    filter::gaussian_blur_f32,
    morphology::close,
};

use crate::config::OcrSettings;

/// Smoothing kernel used for sharpness enhancement; matches the classic
/// "smooth" filter that sharpness blending is defined against.
#[cfg(feature = "ocr")]
const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

/// Enhances bitmaps for character recognition.
///
/// The pipeline is fixed: grayscale, gaussian blur, adaptive threshold,
/// morphological closing, contrast boost, sharpness boost. Enhancement is
/// best effort: if any step fails the original image is handed back.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    blur_sigma: f32,
    threshold_radius: u32,
    close_radius: u8,
    contrast_factor: f32,
    sharpness_factor: f32,
}

impl ImagePreprocessor {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            blur_sigma: settings.blur_sigma,
            threshold_radius: settings.threshold_radius,
            close_radius: settings.close_radius,
            contrast_factor: settings.contrast_factor,
            sharpness_factor: settings.sharpness_factor,
        }
    }

    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        if image.width() == 0 || image.height() == 0 {
            warn!("Image enhancement skipped: empty bitmap");
            return image.clone();
        }

        // imageproc panics on some degenerate inputs, so panics count as failures too
        match catch_unwind(AssertUnwindSafe(|| self.run_pipeline(image))) {
            Ok(Some(enhanced)) => enhanced,
            Ok(None) => image.clone(),
            Err(_) => {
                warn!("Image enhancement failed, using original image");
                image.clone()
            }
        }
    }

    #[cfg(feature = "ocr")]
    fn run_pipeline(&self, image: &DynamicImage) -> Option<DynamicImage> {
        let gray = image.to_luma8();
        let blurred = gaussian_blur_f32(&gray, self.blur_sigma);
        let thresholded = adaptive_threshold(&blurred, self.threshold_radius);
        let closed = close(&thresholded, Norm::LInf, self.close_radius);
        let contrasted = adjust_contrast(&closed, self.contrast_factor);
        let sharpened = adjust_sharpness(&contrasted, self.sharpness_factor);

        debug!(
            "Enhanced {}x{} image (blur sigma {:.2}, threshold radius {}, close radius {})",
            sharpened.width(),
            sharpened.height(),
            self.blur_sigma,
            self.threshold_radius,
            self.close_radius
        );

        Some(DynamicImage::ImageLuma8(sharpened))
    }

    #[cfg(not(feature = "ocr"))]
    fn run_pipeline(&self, _image: &DynamicImage) -> Option<DynamicImage> {
        debug!("OCR feature not enabled, skipping image enhancement");
        None
    }
}

/// Scales each pixel's distance from the mean brightness by `factor`.
#[cfg(feature = "ocr")]
pub(crate) fn adjust_contrast(img: &GrayImage, factor: f32) -> GrayImage {
    let pixel_count = (img.width() as u64) * (img.height() as u64);
    if pixel_count == 0 {
        return img.clone();
    }

    let sum: u64 = img.pixels().map(|p| p[0] as u64).sum();
    let mean = (sum as f32 / pixel_count as f32).round();

    let mut adjusted = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let value = mean + factor * (pixel[0] as f32 - mean);
        adjusted.put_pixel(x, y, Luma([clamp_to_u8(value)]));
    }
    adjusted
}

/// Blends the image away from its smoothed version by `factor`.
#[cfg(feature = "ocr")]
pub(crate) fn adjust_sharpness(img: &GrayImage, factor: f32) -> GrayImage {
    let smoothed = imageops::filter3x3(img, &SMOOTH_KERNEL);

    let mut adjusted = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let base = smoothed.get_pixel(x, y)[0] as f32;
        let value = base + factor * (pixel[0] as f32 - base);
        adjusted.put_pixel(x, y, Luma([clamp_to_u8(value)]));
    }
    adjusted
}

#[cfg(feature = "ocr")]
fn clamp_to_u8(value: f32) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}
