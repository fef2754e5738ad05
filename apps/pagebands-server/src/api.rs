//! API handlers for the pagebands server
//!
//! Provides REST endpoints for:
//! - Document inspection (page count and limits)
//! - Processing every page into one ZIP download
//! - Processing selected pages into individual bands plus a ZIP

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use pagebands_core::{
    CollectedOutput, DocumentInfo, ProcessRequest, ProcessResult, Workflow,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pagebands-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Page selection used when the form omits the `pages` field
const DEFAULT_PAGES: &str = "1";

/// Fields of the upload form
#[derive(Debug, Default)]
struct UploadForm {
    pdf: Option<Vec<u8>>,
    pages: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ServerError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => form.pdf = Some(field.bytes().await?.to_vec()),
                "pages" => form.pages = Some(field.text().await?),
                "width" => form.width = Some(parse_dimension("width", &field.text().await?)?),
                "height" => form.height = Some(parse_dimension("height", &field.text().await?)?),
                other => debug!("Ignoring form field '{}'", other),
            }
        }

        Ok(form)
    }

    fn take_pdf(&mut self) -> Result<Vec<u8>, ServerError> {
        self.pdf
            .take()
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(|| ServerError::InvalidRequest("Missing PDF upload in field 'file'".into()))
    }

    fn into_request(mut self, state: &AppState) -> Result<ProcessRequest, ServerError> {
        Ok(ProcessRequest {
            pdf: self.take_pdf()?,
            pages: self.pages.unwrap_or_else(|| DEFAULT_PAGES.to_string()),
            width: self.width.unwrap_or(state.default_width),
            height: self.height.unwrap_or(state.default_height),
        })
    }
}

pub(crate) fn parse_dimension(field: &str, value: &str) -> Result<u32, ServerError> {
    value.trim().parse::<u32>().map_err(|_| {
        ServerError::InvalidRequest(format!(
            "'{}' must be a whole number of pixels, got '{}'",
            field,
            value.trim()
        ))
    })
}

/// Run one workflow on the blocking pool
async fn run_workflow(
    state: &AppState,
    workflow: Workflow,
    request: ProcessRequest,
) -> Result<CollectedOutput, ServerError> {
    let orchestrator = state.orchestrator.clone();
    tokio::task::spawn_blocking(move || {
        let mut sink = CollectedOutput::default();
        orchestrator.run(workflow, request, &mut sink).map(|()| sink)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Processing task panicked: {}", e)))?
    .map_err(ServerError::from)
}

/// Handler: POST /api/inspect
pub async fn handle_inspect(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DocumentInfo>, ServerError> {
    let pdf = UploadForm::read(multipart).await?.take_pdf()?;
    let orchestrator = state.orchestrator.clone();

    let info = tokio::task::spawn_blocking(move || orchestrator.inspect(pdf))
        .await
        .map_err(|e| ServerError::Internal(format!("Inspection task panicked: {}", e)))??;

    info!("Inspected document: {} pages", info.page_count);
    Ok(Json(info))
}

/// Handler: POST /api/process-all
///
/// Responds with the ZIP archive itself as an attachment.
pub async fn handle_process_all(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let request = UploadForm::read(multipart).await?.into_request(&state)?;
    info!(
        "Process-all request: {} bytes, {}x{}",
        request.pdf.len(),
        request.width,
        request.height
    );

    let output = run_workflow(&state, Workflow::ProcessAll, request).await?;
    let archive = output
        .archives
        .into_iter()
        .next()
        .ok_or_else(|| ServerError::Internal("Processing produced no archive".into()))?;

    let disposition = format!("attachment; filename=\"{}\"", archive.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, archive.media_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response())
}

/// Handler: POST /api/process-selected
pub async fn handle_process_selected(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessResult>, ServerError> {
    let request = UploadForm::read(multipart).await?.into_request(&state)?;
    info!(
        "Process-selected request: pages='{}', {}x{}",
        request.pages, request.width, request.height
    );

    let input_size = request.pdf.len();
    let started = Instant::now();
    let output = run_workflow(&state, Workflow::ProcessSelected, request).await?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    debug!("Produced {} bands in {}ms", output.bands.len(), elapsed_ms);
    Ok(Json(ProcessResult::success(&output, input_size, elapsed_ms)))
}
