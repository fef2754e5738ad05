//! Request orchestration
//!
//! Sequences document loading, page selection, rasterization, band splitting
//! and archiving for the two workflows:
//!
//! - **process all**: every page of a document of at most [`MAX_SELECTION`]
//!   pages, delivered as one archive
//! - **process selected**: the pages named by a page spec, delivered band by
//!   band and as one archive
//!
//! All validation runs before the rasterizer is called, and nothing reaches the
//! sink until every output of the request has been encoded.

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::archive::{self, archive_file_name, entry_name, ArchiveBuilder, ZIP_MEDIA_TYPE};
use crate::bands::{split, ResizeFilter, TargetSize, BAND_COUNT};
use crate::command::Workflow;
use crate::document::{DocumentInfo, SourceDocument};
use crate::error::{PageBandsError, Result};
use crate::page_spec::PageSpec;
use crate::png_encode::encode_png;
use crate::rasterize::{PageRange, PageRasterizer};
use crate::MAX_SELECTION;

/// Archive prefix of the process-all workflow
pub const ALL_PAGES_PREFIX: &str = "all_pages";

/// Archive prefix of the process-selected workflow
pub const SELECTED_PAGES_PREFIX: &str = "selected_pages";

/// Everything one request carries: the upload and the form values
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub pdf: Vec<u8>,
    /// Raw page selection text, e.g. "1,3,5" or "2-4"
    pub pages: String,
    pub width: u32,
    pub height: u32,
}

/// One band delivered on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandOutput {
    pub page: u32,
    /// 1-based position of the band within its page, top to bottom
    pub part: usize,
    pub file_name: String,
    pub png: Vec<u8>,
}

/// A finished archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutput {
    pub file_name: String,
    pub media_type: &'static str,
    pub entries: usize,
    pub bytes: Vec<u8>,
}

/// Receives the outputs of one request
pub trait DeliverySink {
    fn deliver_band(&mut self, band: BandOutput);
    fn deliver_archive(&mut self, archive: ArchiveOutput);
}

/// Sink that keeps every output in memory
#[derive(Debug, Default)]
pub struct CollectedOutput {
    pub bands: Vec<BandOutput>,
    pub archives: Vec<ArchiveOutput>,
}

impl DeliverySink for CollectedOutput {
    fn deliver_band(&mut self, band: BandOutput) {
        self.bands.push(band);
    }

    fn deliver_archive(&mut self, archive: ArchiveOutput) {
        self.archives.push(archive);
    }
}

/// Pipeline settings that are not part of a request
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub filter: ResizeFilter,
}

/// File name of a band delivered on its own
pub fn band_file_name(page: u32, part: usize) -> String {
    format!("page_{}_part_{}.png", page, part)
}

pub struct Orchestrator<R> {
    rasterizer: R,
    config: PipelineConfig,
}

impl<R: PageRasterizer> Orchestrator<R> {
    pub fn new(rasterizer: R, config: PipelineConfig) -> Self {
        Self { rasterizer, config }
    }

    /// Read page count and limits of an upload without processing it
    pub fn inspect(&self, pdf: Vec<u8>) -> Result<DocumentInfo> {
        Ok(SourceDocument::load(pdf)?.info())
    }

    pub fn run(
        &self,
        workflow: Workflow,
        request: ProcessRequest,
        sink: &mut impl DeliverySink,
    ) -> Result<()> {
        match workflow {
            Workflow::ProcessAll => self.process_all(request, sink),
            Workflow::ProcessSelected => self.process_selected(request, sink),
        }
    }

    /// Split every page of the document and deliver one archive.
    ///
    /// The page selection text of the request is not consulted.
    pub fn process_all(&self, request: ProcessRequest, sink: &mut impl DeliverySink) -> Result<()> {
        let document = SourceDocument::load(request.pdf)?;
        let page_count = document.page_count();
        if page_count as usize > MAX_SELECTION {
            warn!(page_count, "document too long for a single run");
            return Err(PageBandsError::TooManyPages {
                count: page_count as usize,
                max: MAX_SELECTION,
            });
        }
        let size = TargetSize::new(request.width, request.height)?;

        info!(
            page_count,
            width = size.width(),
            height = size.height(),
            "processing all pages"
        );

        let images = self.rasterize(&document, PageRange::whole(page_count))?;
        let entries = images.len() * BAND_COUNT;
        let bands = images
            .iter()
            .flat_map(|image| split(image, size, self.config.filter));

        let bytes = archive::build_numbered(ALL_PAGES_PREFIX, bands)?;
        debug!(entries, bytes = bytes.len(), "built archive");

        sink.deliver_archive(ArchiveOutput {
            file_name: archive_file_name(ALL_PAGES_PREFIX),
            media_type: ZIP_MEDIA_TYPE,
            entries,
            bytes,
        });
        Ok(())
    }

    /// Split the selected pages, delivering each band and one archive of all of them.
    ///
    /// Pages are rasterized with a single call covering the lowest through the
    /// highest selected page; pages in between that were not selected are
    /// discarded.
    pub fn process_selected(
        &self,
        request: ProcessRequest,
        sink: &mut impl DeliverySink,
    ) -> Result<()> {
        let document = SourceDocument::load(request.pdf)?;
        let selection = PageSpec::parse(&request.pages, document.page_count())?;
        if selection.len() > MAX_SELECTION {
            warn!(selected = selection.len(), "selection too large");
            return Err(PageBandsError::TooManyPages {
                count: selection.len(),
                max: MAX_SELECTION,
            });
        }
        let range = match (selection.first(), selection.last()) {
            (Some(first), Some(last)) => PageRange::new(first, last),
            _ => return Err(PageBandsError::NoPagesSelected),
        };
        let size = TargetSize::new(request.width, request.height)?;

        info!(
            pages = %selection,
            width = size.width(),
            height = size.height(),
            "processing selected pages"
        );

        let images = self.rasterize(&document, range)?;

        let mut bands = Vec::with_capacity(selection.len() * BAND_COUNT);
        let mut builder = ArchiveBuilder::new();
        for (page, image) in range.pages().zip(images) {
            if !selection.contains(page) {
                continue;
            }
            for (index, band) in split(&image, size, self.config.filter).iter().enumerate() {
                let png = encode_png(band)?;
                builder.add_png(&entry_name(SELECTED_PAGES_PREFIX, builder.entry_count() + 1), &png)?;
                bands.push(BandOutput {
                    page,
                    part: index + 1,
                    file_name: band_file_name(page, index + 1),
                    png,
                });
            }
        }

        let entries = builder.entry_count();
        let bytes = builder.finish()?;
        debug!(entries, bytes = bytes.len(), "built archive");

        for band in bands {
            sink.deliver_band(band);
        }
        sink.deliver_archive(ArchiveOutput {
            file_name: archive_file_name(SELECTED_PAGES_PREFIX),
            media_type: ZIP_MEDIA_TYPE,
            entries,
            bytes,
        });
        Ok(())
    }

    fn rasterize(&self, document: &SourceDocument, range: PageRange) -> Result<Vec<DynamicImage>> {
        debug!(first = range.first, last = range.last, "rasterizing");
        let images = self.rasterizer.rasterize(document.bytes(), range)?;
        if images.len() != range.len() {
            return Err(PageBandsError::RasterizeFailure(format!(
                "expected {} page images, got {}",
                range.len(),
                images.len()
            )));
        }
        Ok(images)
    }
}
