use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageBandsError {
    #[error("Invalid page selection: {0}")]
    InvalidFormat(String),

    #[error("Page {page} is out of range, enter a number between 1 and {max}")]
    OutOfRange { page: u64, max: u32 },

    #[error("Too many pages: {count} requested, at most {max} can be processed per run")]
    TooManyPages { count: usize, max: usize },

    #[error("Image encoding failed: {0}")]
    EncodingFailure(String),

    #[error("Failed to parse PDF: {0}")]
    InvalidPdf(String),

    #[error(
        "Invalid target size {width}x{height}: each side must be 1 to {} pixels and the band at most {} pixels",
        crate::bands::MAX_DIMENSION,
        crate::bands::MAX_BAND_PIXELS
    )]
    InvalidDimensions { width: u32, height: u32 },

    #[error("No pages selected")]
    NoPagesSelected,

    #[error("Rasterization failed: {0}")]
    RasterizeFailure(String),
}

pub type Result<T> = std::result::Result<T, PageBandsError>;

impl PageBandsError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            PageBandsError::InvalidFormat(_) => "INVALID_FORMAT",
            PageBandsError::OutOfRange { .. } => "OUT_OF_RANGE",
            PageBandsError::TooManyPages { .. } => "TOO_MANY_PAGES",
            PageBandsError::EncodingFailure(_) => "ENCODING_FAILURE",
            PageBandsError::InvalidPdf(_) => "INVALID_PDF",
            PageBandsError::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            PageBandsError::NoPagesSelected => "NO_PAGES_SELECTED",
            PageBandsError::RasterizeFailure(_) => "RASTERIZE_FAILURE",
        }
    }

    /// True when the error was caused by the caller's input rather than by the pipeline
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            PageBandsError::EncodingFailure(_) | PageBandsError::RasterizeFailure(_)
        )
    }
}
