//! ZIP packaging of encoded bands

use std::borrow::Borrow;
use std::collections::HashSet;
use std::io::{Cursor, Write};

use image::DynamicImage;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PageBandsError, Result};
use crate::png_encode::encode_png;

/// Media type of every archive handed to the delivery surface
pub const ZIP_MEDIA_TYPE: &str = "application/zip";

/// Entry name of the `index`-th (1-based) band in a bulk export
pub fn entry_name(prefix: &str, index: usize) -> String {
    format!("page_{}_part_{}.png", prefix, index)
}

/// Download file name for an archive built with `prefix`
pub fn archive_file_name(prefix: &str) -> String {
    format!("{}_parts.zip", prefix)
}

/// Builds one in-memory ZIP of PNG entries.
///
/// Each builder owns its buffer; two builds never share state.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    /// Append an already-encoded PNG under `name`
    pub fn add_png(&mut self, name: &str, png: &[u8]) -> Result<()> {
        if !self.names.insert(name.to_string()) {
            return Err(PageBandsError::EncodingFailure(format!(
                "Duplicate archive entry: {}",
                name
            )));
        }

        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(name, options)
            .map_err(|e| PageBandsError::EncodingFailure(format!("ZIP entry {}: {}", name, e)))?;
        self.writer
            .write_all(png)
            .map_err(|e| PageBandsError::EncodingFailure(format!("ZIP write {}: {}", name, e)))?;

        debug!(entry = name, bytes = png.len(), "added archive entry");
        Ok(())
    }

    /// Encode `image` as PNG and append it under `name`
    pub fn add_image(&mut self, name: &str, image: &DynamicImage) -> Result<()> {
        let png = encode_png(image)?;
        self.add_png(name, &png)
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> usize {
        self.names.len()
    }

    /// Finalize the central directory and return the archive bytes
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| PageBandsError::EncodingFailure(format!("ZIP finalize: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Build an archive from `(name, image)` pairs, in order.
///
/// Items are pulled and encoded one at a time, so a lazy iterator never holds
/// more than one image alive here. The first failing item aborts the whole build.
pub fn build<I, D>(items: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (String, D)>,
    D: Borrow<DynamicImage>,
{
    let mut builder = ArchiveBuilder::new();
    for (name, image) in items {
        builder.add_image(&name, image.borrow())?;
    }
    builder.finish()
}

/// Build a bulk export named `page_{prefix}_part_{i}.png`, numbered across all images
pub fn build_numbered<I, D>(prefix: &str, images: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = D>,
    D: Borrow<DynamicImage>,
{
    build(
        images
            .into_iter()
            .enumerate()
            .map(|(i, image)| (entry_name(prefix, i + 1), image)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use zip::ZipArchive;

    fn entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                assert_eq!(file.compression(), CompressionMethod::Deflated);
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_names() {
        assert_eq!(entry_name("all_pages", 3), "page_all_pages_part_3.png");
        assert_eq!(archive_file_name("selected_pages"), "selected_pages_parts.zip");
    }

    #[test]
    fn test_numbered_archive_round_trip() {
        let images: Vec<DynamicImage> = (0..5).map(|_| DynamicImage::new_rgb8(6, 9)).collect();
        let bytes = build_numbered("all_pages", &images).unwrap();

        let entries = entries(bytes);
        assert_eq!(entries.len(), 5);
        for (i, (name, data)) in entries.iter().enumerate() {
            assert_eq!(name, &entry_name("all_pages", i + 1));
            let decoded = image::load_from_memory(data).unwrap();
            assert_eq!(decoded.dimensions(), (6, 9));
        }
    }

    #[test]
    fn test_explicit_names_keep_order() {
        let a = DynamicImage::new_rgb8(1, 1);
        let b = DynamicImage::new_rgb8(2, 2);
        let bytes = build(vec![("z.png".to_string(), &a), ("a.png".to_string(), &b)]).unwrap();
        let names: Vec<String> = entries(bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["z.png", "a.png"]);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let builder = ArchiveBuilder::new();
        assert_eq!(builder.entry_count(), 0);
        assert!(entries(builder.finish().unwrap()).is_empty());
    }

    #[test]
    fn test_owned_images_are_accepted() {
        let pages = (1..=3u8).map(|level| {
            DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, image::Rgb([level; 3])))
        });
        let bytes = build_numbered("all_pages", pages).unwrap();
        let names: Vec<String> = entries(bytes).into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "page_all_pages_part_1.png",
                "page_all_pages_part_2.png",
                "page_all_pages_part_3.png"
            ]
        );
    }

    #[test]
    fn test_duplicate_name_fails() {
        let img = DynamicImage::new_rgb8(1, 1);
        let result = build(vec![("x.png".to_string(), &img), ("x.png".to_string(), &img)]);
        assert!(matches!(result, Err(PageBandsError::EncodingFailure(_))));
    }

    #[test]
    fn test_encoding_failure_aborts_build() {
        let good = DynamicImage::new_rgb8(2, 2);
        let bad = DynamicImage::new_rgb8(0, 0);
        let result = build_numbered("selected_pages", [&good, &bad, &good]);
        assert!(matches!(result, Err(PageBandsError::EncodingFailure(_))));
    }

    #[test]
    fn test_independent_builders() {
        let img = DynamicImage::new_rgb8(3, 3);
        let all = build_numbered("all_pages", [&img, &img]).unwrap();
        let selected = build_numbered("selected_pages", [&img]).unwrap();
        assert_eq!(entries(all).len(), 2);
        assert_eq!(entries(selected).len(), 1);
    }
}
