use image::DynamicImage;

#[cfg(feature = "ocr")]
use pdfium_render::prelude::*;
#[cfg(feature = "ocr")]
use std::sync::mpsc;
#[cfg(feature = "ocr")]
use tracing::{debug, warn};

use crate::config::OcrSettings;

/// Page bitmaps in document order. Produced on demand and consumed once.
pub type PageImages = Box<dyn Iterator<Item = DynamicImage> + Send>;

/// Converts PDF bytes into page bitmaps.
///
/// Implementations never fail: a document that cannot be opened, or a
/// missing rendering library, produces an empty sequence.
pub trait PageRasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8]) -> PageImages;
}

const POINTS_PER_INCH: f32 = 72.0;

/// Longest edge of a rendered page. A3 at 300 DPI fits; oversized media
/// boxes are scaled down to it.
pub const MAX_RENDER_DIMENSION_PX: u32 = 5000;

/// Pixel size of a page rendered at `dpi`, clamped to
/// [1, `MAX_RENDER_DIMENSION_PX`] on both axes with the aspect ratio kept.
pub fn render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let raw_width = (width_points * dpi as f32 / POINTS_PER_INCH).max(1.0);
    let raw_height = (height_points * dpi as f32 / POINTS_PER_INCH).max(1.0);

    let longest = raw_width.max(raw_height);
    let ratio = if longest > MAX_RENDER_DIMENSION_PX as f32 {
        MAX_RENDER_DIMENSION_PX as f32 / longest
    } else {
        1.0
    };

    (
        ((raw_width * ratio).round() as u32).clamp(1, MAX_RENDER_DIMENSION_PX),
        ((raw_height * ratio).round() as u32).clamp(1, MAX_RENDER_DIMENSION_PX),
    )
}

/// Renders pages with PDFium.
///
/// `Pdfium` is `!Send`, so each call loads the library on a dedicated worker
/// thread which renders one page at a time into a bounded channel. Dropping
/// the iterator stops the worker after the page in flight.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    library_path: Option<String>,
}

impl PdfiumRasterizer {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            dpi: settings.pdf_render_dpi,
            library_path: settings.pdfium_library_path.clone(),
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

impl PageRasterizer for PdfiumRasterizer {
    #[cfg(feature = "ocr")]
    fn rasterize(&self, pdf: &[u8]) -> PageImages {
        let (sender, receiver) = mpsc::sync_channel::<DynamicImage>(1);
        let bytes = pdf.to_vec();
        let dpi = self.dpi;
        let library_path = self.library_path.clone();

        let spawned = std::thread::Builder::new()
            .name("pdf-rasterizer".to_string())
            .spawn(move || render_pages(&bytes, dpi, library_path.as_deref(), sender));

        match spawned {
            Ok(_) => Box::new(receiver.into_iter()),
            Err(e) => {
                warn!("Failed to start PDF rasterizer thread: {}", e);
                Box::new(std::iter::empty())
            }
        }
    }

    #[cfg(not(feature = "ocr"))]
    fn rasterize(&self, _pdf: &[u8]) -> PageImages {
        tracing::debug!("OCR feature not enabled, PDF pages are not rasterized");
        Box::new(std::iter::empty())
    }
}

#[cfg(feature = "ocr")]
fn bind_pdfium(library_path: Option<&str>) -> Option<Pdfium> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    };

    match bindings {
        Ok(bindings) => Some(Pdfium::new(bindings)),
        Err(e) => {
            warn!("PDFium library unavailable ({}), skipping rasterization", e);
            None
        }
    }
}

#[cfg(feature = "ocr")]
fn render_pages(
    bytes: &[u8],
    dpi: u32,
    library_path: Option<&str>,
    sender: mpsc::SyncSender<DynamicImage>,
) {
    let Some(pdfium) = bind_pdfium(library_path) else {
        return;
    };

    let document = match pdfium.load_pdf_from_byte_slice(bytes, None) {
        Ok(document) => document,
        Err(e) => {
            warn!("PDFium could not open document: {}", e);
            return;
        }
    };

    for (index, page) in document.pages().iter().enumerate() {
        let (width_points, height_points) = (page.width().value, page.height().value);
        let (width, height) = render_dimensions(width_points, height_points, dpi);
        if width_points.max(height_points) * dpi as f32 / POINTS_PER_INCH
            > MAX_RENDER_DIMENSION_PX as f32
        {
            warn!(
                "Page {} is {}x{} points, rendering capped at {}x{}",
                index + 1,
                width_points,
                height_points,
                width,
                height
            );
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_maximum_width(width as i32)
            .set_maximum_height(height as i32);
        let image = match page.render_with_config(&render_config) {
            Ok(bitmap) => bitmap.as_image(),
            Err(e) => {
                warn!("Failed to render page {}: {}", index + 1, e);
                continue;
            }
        };

        debug!("Rendered page {} at {}x{}", index + 1, image.width(), image.height());
        if sender.send(image).is_err() {
            debug!("Rasterized pages no longer needed, stopping at page {}", index + 1);
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpi_comes_from_settings() {
        let settings = OcrSettings { pdf_render_dpi: 150, ..OcrSettings::default() };
        assert_eq!(PdfiumRasterizer::new(&settings).dpi(), 150);
    }

    #[test]
    fn test_letter_page_at_300_dpi_is_not_capped() {
        assert_eq!(render_dimensions(612.0, 792.0, 300), (2550, 3300));
    }

    #[test]
    fn test_oversized_page_is_capped_with_aspect_ratio() {
        let (width, height) = render_dimensions(14400.0, 7200.0, 300);
        assert_eq!(width, MAX_RENDER_DIMENSION_PX);
        assert_eq!(height, MAX_RENDER_DIMENSION_PX / 2);

        let (width, height) = render_dimensions(14400.0, 14400.0, 300);
        assert_eq!((width, height), (MAX_RENDER_DIMENSION_PX, MAX_RENDER_DIMENSION_PX));
    }

    #[test]
    fn test_degenerate_page_renders_at_least_one_pixel() {
        assert_eq!(render_dimensions(0.0, 0.0, 300), (1, 1));

        let (width, height) = render_dimensions(100_000.0, 1.0, 300);
        assert_eq!(width, MAX_RENDER_DIMENSION_PX);
        assert_eq!(height, 1);
    }

    #[test]
    fn test_garbage_yields_no_pages() {
        let rasterizer = PdfiumRasterizer::new(&OcrSettings::default());
        assert_eq!(rasterizer.rasterize(b"definitely not a pdf").count(), 0);
    }
}
