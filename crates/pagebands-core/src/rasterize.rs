//! Page rasterization seam
//!
//! The pipeline only needs "PDF bytes in, one bitmap per page out". The
//! [`PageRasterizer`] trait is that boundary; [`PdfiumRasterizer`] implements it
//! with pdfium when the `pdfium` feature is enabled.

use std::sync::Arc;

use image::DynamicImage;

use crate::error::Result;

/// Inclusive, 1-indexed range of pages to rasterize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        Self { first, last }
    }

    /// Every page of a document with `page_count` pages
    pub fn whole(page_count: u32) -> Self {
        Self::new(1, page_count)
    }

    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.last
    }
}

/// Converts PDF bytes into one bitmap per requested page.
///
/// Implementations return the bitmaps in page order, exactly one per page in
/// `pages`.
pub trait PageRasterizer {
    fn rasterize(&self, pdf: &[u8], pages: PageRange) -> Result<Vec<DynamicImage>>;
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for Arc<R> {
    fn rasterize(&self, pdf: &[u8], pages: PageRange) -> Result<Vec<DynamicImage>> {
        (**self).rasterize(pdf, pages)
    }
}

impl<R: PageRasterizer + ?Sized> PageRasterizer for &R {
    fn rasterize(&self, pdf: &[u8], pages: PageRange) -> Result<Vec<DynamicImage>> {
        (**self).rasterize(pdf, pages)
    }
}

#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use std::path::PathBuf;

    use image::DynamicImage;
    use pdfium_render::prelude::*;
    use tracing::debug;

    use super::{PageRange, PageRasterizer};
    use crate::error::{PageBandsError, Result};

    /// Rasterizer backed by the pdfium shared library.
    ///
    /// The library is bound per call, so no pdfium handle outlives a request.
    #[derive(Debug, Clone)]
    pub struct PdfiumRasterizer {
        dpi: u32,
        library_dir: Option<PathBuf>,
    }

    impl PdfiumRasterizer {
        pub fn new(dpi: u32) -> Self {
            Self {
                dpi,
                library_dir: None,
            }
        }

        /// Look for the pdfium library in `dir` before falling back to the system library
        pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
            self.library_dir = Some(dir.into());
            self
        }

        fn bind(&self) -> Result<Pdfium> {
            let bindings = match &self.library_dir {
                Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                    .or_else(|_| Pdfium::bind_to_system_library()),
                None => Pdfium::bind_to_system_library(),
            }
            .map_err(|e| PageBandsError::RasterizeFailure(format!("pdfium bind failed: {:?}", e)))?;
            Ok(Pdfium::new(bindings))
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize(&self, pdf: &[u8], range: PageRange) -> Result<Vec<DynamicImage>> {
            let pdfium = self.bind()?;
            let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(|e| {
                PageBandsError::RasterizeFailure(format!("pdfium open failed: {:?}", e))
            })?;
            let pages = document.pages();
            let scale = self.dpi as f32 / 72.0;

            let mut images = Vec::with_capacity(range.len());
            for number in range.pages() {
                let index = PdfPageIndex::try_from(number.saturating_sub(1)).map_err(|_| {
                    PageBandsError::RasterizeFailure(format!("page {} is not addressable", number))
                })?;
                let page = pages.get(index).map_err(|e| {
                    PageBandsError::RasterizeFailure(format!("page {} access failed: {:?}", number, e))
                })?;

                let width = (page.width().value * scale).round() as i32;
                let height = (page.height().value * scale).round() as i32;
                let bitmap = page
                    .render_with_config(
                        &PdfRenderConfig::new()
                            .set_target_width(width)
                            .set_target_height(height),
                    )
                    .map_err(|e| {
                        PageBandsError::RasterizeFailure(format!(
                            "render page {} failed: {:?}",
                            number, e
                        ))
                    })?;

                debug!(page = number, width, height, "rasterized page");
                images.push(bitmap.as_image());
            }

            Ok(images)
        }
    }
}
