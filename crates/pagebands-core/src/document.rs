//! Uploaded PDF validation and page counting

use lopdf::Document;
use serde::Serialize;

use crate::error::{PageBandsError, Result};
use crate::MAX_SELECTION;

/// An uploaded PDF whose page count has been read.
///
/// The page count is fixed once the document is loaded.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    bytes: Vec<u8>,
    page_count: u32,
    version: String,
}

/// Basic facts about an uploaded PDF, shown before any processing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// Most pages a single run may process
    pub max_selection: usize,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    pub size_bytes: usize,
}

impl SourceDocument {
    /// Validate PDF bytes and read the page count
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(PageBandsError::InvalidPdf(
                "File too small to be a valid PDF".into(),
            ));
        }
        if !bytes.starts_with(b"%PDF-") {
            return Err(PageBandsError::InvalidPdf(
                "Not a valid PDF file (missing %PDF- header)".into(),
            ));
        }

        let document =
            Document::load_mem(&bytes).map_err(|e| PageBandsError::InvalidPdf(e.to_string()))?;
        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(PageBandsError::InvalidPdf("PDF has no pages".into()));
        }

        Ok(Self {
            version: document.version.clone(),
            bytes,
            page_count,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            page_count: self.page_count,
            max_selection: MAX_SELECTION,
            version: self.version.clone(),
            size_bytes: self.bytes.len(),
        }
    }
}

/// Build a minimal PDF with `num_pages` one-line text pages
#[cfg(any(test, feature = "test-util"))]
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    use lopdf::{content::Content, content::Operation, Dictionary, Object, Stream};

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::new();

    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
