//! Band splitting
//!
//! Divides a page bitmap into four equal-height horizontal bands and stretches
//! each one to the requested output size.

use std::str::FromStr;

use image::imageops::FilterType;
use image::DynamicImage;
use crate::error::{PageBandsError, Result};

/// Number of horizontal bands produced per page
pub const BAND_COUNT: usize = 4;

/// Largest accepted band width or height, in pixels
pub const MAX_DIMENSION: u32 = 10_000;

/// Largest accepted band area, in pixels
pub const MAX_BAND_PIXELS: u64 = 16_000_000;

/// Output size of every band, in pixels.
///
/// Both dimensions are positive, at most [`MAX_DIMENSION`], and their product
/// is at most [`MAX_BAND_PIXELS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    width: u32,
    height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let in_bounds = (1..=MAX_DIMENSION).contains(&width)
            && (1..=MAX_DIMENSION).contains(&height)
            && u64::from(width) * u64::from(height) <= MAX_BAND_PIXELS;
        if !in_bounds {
            return Err(PageBandsError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Resampling filter used when stretching a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "triangle" | "bilinear" => Ok(ResizeFilter::Triangle),
            "catmull-rom" | "bicubic" => Ok(ResizeFilter::CatmullRom),
            "gaussian" => Ok(ResizeFilter::Gaussian),
            "lanczos3" | "lanczos" => Ok(ResizeFilter::Lanczos3),
            other => Err(format!("Unknown resize filter: {}", other)),
        }
    }
}

/// Split a page into [`BAND_COUNT`] bands, top to bottom, each resized to `size`.
///
/// Band height is `height / 4` rounded down, so the last `height % 4` rows of
/// the page never appear in any band. Pages shorter than four rows yield
/// blank bands of the target size.
pub fn split(
    image: &DynamicImage,
    size: TargetSize,
    filter: ResizeFilter,
) -> [DynamicImage; BAND_COUNT] {
    let width = image.width();
    let part_height = image.height() / BAND_COUNT as u32;

    std::array::from_fn(|index| {
        if width == 0 || part_height == 0 {
            return DynamicImage::new_rgba8(size.width, size.height);
        }
        image
            .crop_imm(0, part_height * index as u32, width, part_height)
            .resize_exact(size.width, size.height, filter.into())
    })
}
