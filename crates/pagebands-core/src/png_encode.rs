//! PNG serialization of band bitmaps

use image::DynamicImage;

use crate::error::{PageBandsError, Result};

/// Encode a bitmap as 8-bit PNG.
///
/// Bitmaps without an alpha channel are written as RGB, everything else as RGBA.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let (width, height) = (image.width(), image.height());
    let (color, data) = if image.color().has_alpha() {
        (png::ColorType::Rgba, image.to_rgba8().into_raw())
    } else {
        (png::ColorType::Rgb, image.to_rgb8().into_raw())
    };

    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| PageBandsError::EncodingFailure(format!("PNG header: {}", e)))?;
        writer
            .write_image_data(&data)
            .map_err(|e| PageBandsError::EncodingFailure(format!("PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| PageBandsError::EncodingFailure(format!("PNG finish: {}", e)))?;
    }

    Ok(buffer)
}
