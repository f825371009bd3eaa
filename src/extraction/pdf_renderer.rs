//! PDF rasterization via Google PDFium.
//!
//! Providers whose primary API cannot take a multi-page PDF get one rendered
//! PNG per page instead. PDFium handles CIDFont encodings, embedded fonts,
//! form fields, and transparency.
//!
//! `PdfiumRasterizer` is stateless (`Send + Sync`). Each operation creates a
//! fresh `Pdfium` instance because the upstream type is `!Send`. The OS caches
//! `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use std::io::Cursor;
use std::path::Path;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PageRasterizer;
use super::ProviderError;
use crate::document::Page;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages or absurd DPI settings.
const MAX_DIMENSION_PX: u32 = 4096;

/// Default rendering DPI for per-page OCR calls.
pub const DEFAULT_RENDER_DPI: u32 = 200;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Production rasterizer backed by PDFium.
pub struct PdfiumRasterizer {
    dpi: u32,
}

impl PdfiumRasterizer {
    /// Create a rasterizer, verifying the PDFium library is loadable.
    pub fn new() -> Result<Self, ProviderError> {
        // Fail fast if the native renderer is missing.
        let _ = load_pdfium()?;
        Ok(Self {
            dpi: DEFAULT_RENDER_DPI,
        })
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ProviderError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ProviderError::Rasterize(format!("Failed to load PDFium from {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if std::path::Path::new(&lib_path).exists() {
                if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                    return Ok(Pdfium::new(bindings));
                }
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ProviderError::Rasterize(format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX].
/// Preserves aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).max(1).min(MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, path: &Path) -> Result<Vec<Page>, ProviderError> {
        let pdf_bytes = std::fs::read(path)?;

        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(&pdf_bytes, None)
            .map_err(|e| ProviderError::Rasterize(format!("Failed to load PDF: {e}")))?;

        let mut pages = Vec::new();
        for (page_number, page) in document.pages().iter().enumerate() {
            let index = page_number + 1;

            let width_points = page.width().value;
            let height_points = page.height().value;
            let (target_w, target_h) =
                compute_render_dimensions(width_points, height_points, self.dpi);

            let uncapped_w = (width_points * self.dpi as f32 / POINTS_PER_INCH) as u32;
            let uncapped_h = (height_points * self.dpi as f32 / POINTS_PER_INCH) as u32;
            if target_w != uncapped_w || target_h != uncapped_h {
                warn!(
                    page = index,
                    raw_width = uncapped_w,
                    raw_height = uncapped_h,
                    capped_width = target_w,
                    capped_height = target_h,
                    "Page dimensions capped to {MAX_DIMENSION_PX}px",
                );
            }

            let config = PdfRenderConfig::new()
                .set_target_width(target_w as i32)
                .set_maximum_height(target_h as i32);

            let bitmap = page.render_with_config(&config).map_err(|e| {
                ProviderError::Rasterize(format!("Rendering page {index} failed: {e}"))
            })?;

            let dynamic_image = bitmap.as_image();
            let mut cursor = Cursor::new(Vec::new());
            dynamic_image
                .write_to(&mut cursor, ImageOutputFormat::Png)
                .map_err(|e| {
                    ProviderError::Rasterize(format!("PNG encoding of page {index} failed: {e}"))
                })?;
            let png_bytes = cursor.into_inner();

            debug!(
                page = index,
                width = target_w,
                height = target_h,
                png_size = png_bytes.len(),
                "Rendered PDF page to PNG"
            );

            pages.push(Page {
                index,
                image_png: png_bytes,
            });
        }

        if pages.is_empty() {
            return Err(ProviderError::Rasterize("PDF contains no pages".into()));
        }

        Ok(pages)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Mock rasterizer returning a fixed number of tiny page fixtures, or a
/// configured failure. Lets coordinator tests run without the PDFium binary.
pub struct MockRasterizer {
    page_count: usize,
    fail: bool,
}

impl MockRasterizer {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            page_count: 0,
            fail: true,
        }
    }
}

impl PageRasterizer for MockRasterizer {
    fn rasterize(&self, _path: &Path) -> Result<Vec<Page>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Rasterize("mock rasterizer failure".into()));
        }
        Ok((1..=self.page_count)
            .map(|index| Page {
                index,
                // Not a decodable PNG — the mock vendor clients never look.
                image_png: format!("page-{index}").into_bytes(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_within_cap_are_unchanged() {
        // US Letter at 200 DPI: 1700x2200, well under the cap.
        let (w, h) = compute_render_dimensions(612.0, 792.0, 200);
        assert_eq!((w, h), (1700, 2200));
    }

    #[test]
    fn oversized_dimensions_are_capped_preserving_aspect() {
        let (w, h) = compute_render_dimensions(612.0, 792.0, 1200);
        assert!(w <= MAX_DIMENSION_PX && h <= MAX_DIMENSION_PX);
        // Float rounding may land one pixel under the cap.
        assert!(h >= MAX_DIMENSION_PX - 1);
        let aspect = w as f32 / h as f32;
        assert!((aspect - 612.0 / 792.0).abs() < 0.01);
    }

    #[test]
    fn degenerate_page_renders_at_least_one_pixel() {
        let (w, h) = compute_render_dimensions(0.0, 0.0, 200);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn mock_produces_ordered_one_based_pages() {
        let pages = MockRasterizer::new(3).rasterize(Path::new("x.pdf")).unwrap();
        let indices: Vec<usize> = pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn failing_mock_returns_rasterize_error() {
        let err = MockRasterizer::failing()
            .rasterize(Path::new("x.pdf"))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rasterize(_)));
    }
}
