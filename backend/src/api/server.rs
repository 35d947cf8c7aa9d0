//! HTTP Server for the expander API.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                                   |
//! |--------|---------------|-----------------------------------------------|
//! | GET    | `/health`     | Health check                                  |
//! | POST   | `/api/expand` | Expand a JSON grid or grid request            |
//! | POST   | `/api/upload` | Expand an uploaded CSV or JSON file           |
//! | GET    | `/api/logs`   | SSE stream for real-time logs                 |
//!
//! Expansions run on the blocking thread pool and are refused above the
//! configured row limit before any row is built.

use axum::{
    extract::{Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{LogEntry, LOG_BROADCASTER};
use super::types::{error_response, new_job_id, ExpandResponse};
use crate::config::Settings;
use crate::error::{GridError, PipelineError, ServerError};
use crate::output::OutputFormat;
use crate::parser::parse_nesting_list;
use crate::transform::pipeline::{expand_bytes, expand_document, ExpandOptions, PipelineOutput};

type Rejection = (StatusCode, Json<Value>);

/// Build the application router.
pub fn router(settings: Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/expand", post(expand_json))
        .route("/api/upload", post(upload_file))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(Arc::new(settings))
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let port = settings.port;
    let limit = settings.max_rows;
    let app = router(settings);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Expander server running on http://localhost:{}", port);
    eprintln!("   POST /api/expand - Expand a JSON grid");
    eprintln!("   POST /api/upload - Upload a CSV or JSON grid");
    eprintln!("   GET  /api/logs   - SSE log stream");
    eprintln!("   GET  /health     - Health check");
    match limit {
        Some(n) => eprintln!("   Row limit: {}", n),
        None => eprintln!("   Row limit: none"),
    }
    eprintln!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "expander",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "expand": "POST /api/expand",
            "upload": "POST /api/upload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Expand a JSON body
async fn expand_json(
    State(settings): State<Arc<Settings>>,
    Json(document): Json<Value>,
) -> Result<Json<ExpandResponse>, Rejection> {
    let job_id = new_job_id();
    LOG_BROADCASTER.log(LogEntry::info("📥 New expand request").with_job(&job_id));

    let format = requested_format(document.get("format").and_then(Value::as_str))
        .map_err(|e| reject(&job_id, e))?;
    let options = options_for(&settings, None);

    let output = run_blocking(move || expand_document(&document, options))
        .await
        .map_err(|e| reject(&job_id, e))?;

    respond(job_id, output, format, settings.delimiter)
}

/// Expand an uploaded file. Fields: `file` (required), `nesting`, `format`.
async fn upload_file(
    State(settings): State<Arc<Settings>>,
    mut multipart: Multipart,
) -> Result<Json<ExpandResponse>, Rejection> {
    let job_id = new_job_id();

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut nesting: Option<Vec<String>> = None;
    let mut format_field: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(&job_id, ServerError::BadRequest(format!("Multipart error: {}", e))))?
    {
        let name = field.name().unwrap_or("").to_string();
        let read_error = |e: axum::extract::multipart::MultipartError| {
            reject(&job_id, ServerError::BadRequest(format!("Read error: {}", e)))
        };

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(read_error)?.to_vec());
            }
            "nesting" => {
                let text = field.text().await.map_err(read_error)?;
                nesting = Some(parse_nesting_list(&text));
            }
            "format" => {
                format_field = Some(field.text().await.map_err(read_error)?);
            }
            _ => {}
        }
    }

    let bytes = file_data
        .ok_or_else(|| reject(&job_id, ServerError::BadRequest("No file provided".to_string())))?;

    LOG_BROADCASTER.log(
        LogEntry::info(format!(
            "📥 Upload: {} ({} bytes)",
            file_name.as_deref().unwrap_or("unknown"),
            bytes.len()
        ))
        .with_job(&job_id),
    );

    let format = requested_format(format_field.as_deref()).map_err(|e| reject(&job_id, e))?;
    let options = options_for(&settings, nesting);

    let output = run_blocking(move || expand_bytes(&bytes, options))
        .await
        .map_err(|e| reject(&job_id, e))?;

    respond(job_id, output, format, settings.delimiter)
}

fn options_for(settings: &Settings, nesting: Option<Vec<String>>) -> ExpandOptions {
    ExpandOptions {
        nesting,
        max_rows: settings.max_rows,
        skip_validation: false,
    }
}

/// Defaults to records when no format is given.
fn requested_format(raw: Option<&str>) -> Result<OutputFormat, ServerError> {
    match raw {
        None => Ok(OutputFormat::Records),
        Some(s) => s.parse().map_err(ServerError::BadRequest),
    }
}

async fn run_blocking<F>(job: F) -> Result<PipelineOutput, ServerError>
where
    F: FnOnce() -> Result<PipelineOutput, PipelineError> + Send + 'static,
{
    let output = tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ServerError::Internal(format!("Expansion task failed: {}", e)))??;
    Ok(output)
}

fn respond(
    job_id: String,
    output: PipelineOutput,
    format: OutputFormat,
    delimiter: char,
) -> Result<Json<ExpandResponse>, Rejection> {
    let rows = output.table.len();
    let response = ExpandResponse::build(job_id.clone(), output, format, delimiter)
        .map_err(|e| reject(&job_id, PipelineError::from(e).into()))?;

    LOG_BROADCASTER.log(LogEntry::success(format!("Returned {} rows", rows)).with_job(&job_id));
    Ok(Json(response))
}

/// HTTP status for a server error.
pub fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Pipeline(pipeline) => match pipeline {
            PipelineError::Expand(_) | PipelineError::Grid(GridError::Invalid(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::RowLimitExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::Grid(_) | PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
            PipelineError::Output(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn reject(job_id: &str, err: ServerError) -> Rejection {
    let status = status_for(&err);
    LOG_BROADCASTER.log(LogEntry::error(err.to_string()).with_job(job_id));
    (status, Json(error_response(job_id, &err.to_string())))
}
