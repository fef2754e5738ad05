//! Workflow selection and JSON results
//!
//! [`ProcessResult`] is the wire shape returned to callers: base64 band PNGs,
//! the base64 archive, and either metrics or an error code.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::PageBandsError;
use crate::pipeline::{ArchiveOutput, BandOutput, CollectedOutput};

/// The two top-level processing modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Every page of the document, archive only
    ProcessAll,
    /// Pages named by the page selection, individual bands plus archive
    ProcessSelected,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    pub bands: Vec<BandPayload>,
    pub archive: Option<ArchivePayload>,
    pub error: Option<String>,
    pub code: Option<String>,
    pub metrics: Option<ProcessMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BandPayload {
    pub page: u32,
    pub part: usize,
    pub file_name: String,
    pub mime_type: &'static str,
    /// Base64-encoded PNG data
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchivePayload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub entries: usize,
    /// Base64-encoded ZIP data
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub band_count: usize,
    pub processing_time_ms: u64,
}

impl From<&BandOutput> for BandPayload {
    fn from(band: &BandOutput) -> Self {
        Self {
            page: band.page,
            part: band.part,
            file_name: band.file_name.clone(),
            mime_type: "image/png",
            data: BASE64.encode(&band.png),
        }
    }
}

impl From<&ArchiveOutput> for ArchivePayload {
    fn from(archive: &ArchiveOutput) -> Self {
        Self {
            file_name: archive.file_name.clone(),
            mime_type: archive.media_type,
            entries: archive.entries,
            data: BASE64.encode(&archive.bytes),
        }
    }
}

impl ProcessResult {
    pub fn success(output: &CollectedOutput, input_size_bytes: usize, processing_time_ms: u64) -> Self {
        let output_size_bytes = output.bands.iter().map(|b| b.png.len()).sum::<usize>()
            + output.archives.iter().map(|a| a.bytes.len()).sum::<usize>();

        Self {
            success: true,
            bands: output.bands.iter().map(BandPayload::from).collect(),
            archive: output.archives.last().map(ArchivePayload::from),
            error: None,
            code: None,
            metrics: Some(ProcessMetrics {
                input_size_bytes,
                output_size_bytes,
                band_count: output
                    .archives
                    .last()
                    .map(|a| a.entries)
                    .unwrap_or(output.bands.len()),
                processing_time_ms,
            }),
        }
    }

    pub fn failure(err: &PageBandsError) -> Self {
        Self {
            success: false,
            bands: Vec::new(),
            archive: None,
            error: Some(err.to_string()),
            code: Some(err.code().to_string()),
            metrics: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_deserializes() {
        let workflow: Workflow = serde_json::from_str(r#""process_selected""#).unwrap();
        assert_eq!(workflow, Workflow::ProcessSelected);
    }

    #[test]
    fn test_success_result_encodes_payloads() {
        let output = CollectedOutput {
            bands: vec![BandOutput {
                page: 2,
                part: 1,
                file_name: "page_2_part_1.png".into(),
                png: vec![1, 2, 3],
            }],
            archives: vec![ArchiveOutput {
                file_name: "selected_pages_parts.zip".into(),
                media_type: "application/zip",
                entries: 1,
                bytes: vec![9; 10],
            }],
        };

        let result = ProcessResult::success(&output, 100, 5);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["bands"][0]["data"], "AQID");
        assert_eq!(json["archive"]["file_name"], "selected_pages_parts.zip");
        assert_eq!(json["metrics"]["output_size_bytes"], 13);
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_failure_result_carries_code() {
        let result = ProcessResult::failure(&PageBandsError::TooManyPages { count: 25, max: 20 });
        assert!(!result.success);
        assert_eq!(result.code.as_deref(), Some("TOO_MANY_PAGES"));
        assert!(result.error.unwrap().contains("25"));
    }
}
