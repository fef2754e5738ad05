//! PDF page band extraction
//!
//! Rasterizes pages of an uploaded PDF, slices every page into four horizontal
//! bands, resizes each band to a fixed pixel size and packages the results as
//! PNG files and ZIP archives.
//!
//! - `PageSpec::parse`: page selection text like "1,3,5" or "2-4"
//! - `bands::split`: one page bitmap into four resized bands
//! - `archive`: PNG entries in a deflate-compressed ZIP
//! - `Orchestrator`: the process-all and process-selected workflows

pub mod archive;
pub mod bands;
pub mod command;
pub mod document;
pub mod error;
pub mod page_spec;
pub mod pipeline;
pub mod png_encode;
pub mod rasterize;

pub use archive::ArchiveBuilder;
pub use bands::{split, ResizeFilter, TargetSize, BAND_COUNT, MAX_BAND_PIXELS, MAX_DIMENSION};
pub use command::{ProcessMetrics, ProcessResult, Workflow};
#[cfg(feature = "test-util")]
pub use document::create_test_pdf;
pub use document::{DocumentInfo, SourceDocument};
pub use error::{PageBandsError, Result};
pub use page_spec::PageSpec;
pub use pipeline::{
    ArchiveOutput, BandOutput, CollectedOutput, DeliverySink, Orchestrator, PipelineConfig,
    ProcessRequest,
};
#[cfg(feature = "pdfium")]
pub use rasterize::PdfiumRasterizer;
pub use rasterize::{PageRange, PageRasterizer};

/// Most pages a single run may process
pub const MAX_SELECTION: usize = 20;
