//! pagebands server
//!
//! Accepts a PDF upload, rasterizes its pages, slices each page into four
//! horizontal bands resized to a requested pixel size, and returns the bands
//! as PNG files and ZIP archives.
//!
//! ## Endpoints
//!
//! - `GET /health`
//! - `POST /api/inspect`: page count of an upload
//! - `POST /api/process-all`: every page, returned as `all_pages_parts.zip`
//! - `POST /api/process-selected`: selected pages, returned as JSON with
//!   base64 bands and `selected_pages_parts.zip`
//!
//! Each request is processed synchronously on the blocking pool and owns all
//! of its data; nothing is kept between requests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use pagebands_core::{
    Orchestrator, PageRasterizer, PdfiumRasterizer, PipelineConfig, ResizeFilter, TargetSize,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_health, handle_inspect, handle_process_all, handle_process_selected};

/// Command-line arguments for the pagebands server
#[derive(Parser, Debug)]
#[command(name = "pagebands-server")]
#[command(about = "Split PDF pages into four resized PNG bands")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rasterization resolution in dots per inch
    #[arg(long, default_value = "200")]
    dpi: u32,

    /// Directory containing the pdfium shared library (system library otherwise)
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// Band width used when a request omits it
    #[arg(long, default_value = "600")]
    default_width: u32,

    /// Band height used when a request omits it
    #[arg(long, default_value = "800")]
    default_height: u32,

    /// Resampling filter: nearest, triangle, catmull-rom, gaussian or lanczos3
    #[arg(long, default_value = "catmull-rom")]
    filter: ResizeFilter,

    /// Largest accepted upload in megabytes
    #[arg(long, default_value = "50")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Rasterizer shared by all requests
pub type SharedRasterizer = Arc<dyn PageRasterizer + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator<SharedRasterizer>>,
    pub default_width: u32,
    pub default_height: u32,
}

impl AppState {
    pub fn new(rasterizer: SharedRasterizer, config: PipelineConfig) -> Self {
        Self {
            orchestrator: Arc::new(Orchestrator::new(rasterizer, config)),
            default_width: 600,
            default_height: 800,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/inspect", post(handle_inspect))
        .route("/api/process-all", post(handle_process_all))
        .route("/api/process-selected", post(handle_process_selected))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pagebands server on {}:{}", args.host, args.port);

    // Reject unusable defaults at startup instead of on every request
    TargetSize::new(args.default_width, args.default_height)?;

    let mut rasterizer = PdfiumRasterizer::new(args.dpi);
    if let Some(dir) = &args.pdfium_lib {
        rasterizer = rasterizer.with_library_dir(dir);
    }

    let mut state = AppState::new(
        Arc::new(rasterizer),
        PipelineConfig {
            filter: args.filter,
        },
    );
    state.default_width = args.default_width;
    state.default_height = args.default_height;

    let app = build_router(state, args.max_upload_mb * 1024 * 1024);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rasterizing at {} dpi, filter {:?}", args.dpi, args.filter);
    info!(
        "Default band size: {}x{}",
        args.default_width, args.default_height
    );

    axum::serve(listener, app).await?;

    Ok(())
}
