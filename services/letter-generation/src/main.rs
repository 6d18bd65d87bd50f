//! Pretenza Letter Generation Service
//!
//! Ingests the delivery-reporting and document-registration exports,
//! aggregates overdue positions with penalty accrual, and serves the
//! generated claim letters and appendices.

use anyhow::Result;
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use pretenza_models::LetterRecord;
use pretenza_utils::config::AppConfig;
use pretenza_utils::error::PretenzaError;
use pretenza_utils::logging::init_logging;

mod aggregate;
mod archive;
mod classify;
mod letters;
mod normalize;
mod penalty;
mod service;
mod words;

use service::{LetterService, UploadedFile};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Falling back to default configuration: {}", e);
        AppConfig::default()
    });
    init_logging(&config.logging)?;
    info!("Starting Pretenza Letter Generation Service");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let service = LetterService::new(config);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/letters/upload", post(upload_tables))
        .route("/api/v1/letters/process", post(process_tables))
        .route("/api/v1/letters/files/:filename", get(download_file))
        .route("/api/v1/letters/archive", get(download_archive))
        .route("/api/v1/letters/status", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    let listener = TcpListener::bind(&addr).await?;
    info!("Letter Generation Service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "letter-generation",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn error_reply(error: PretenzaError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, error.to_string())
}

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub reporting_file: String,
    pub registry_file: String,
}

/// Upload both table exports in one multipart request.
async fn upload_tables(
    State(service): State<LetterService>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut reporting: Option<UploadedFile> = None;
    let mut registry: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Upload error: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Read error: {}", e)))?;

        match name.as_str() {
            "reporting_file" => {
                reporting = Some(UploadedFile {
                    filename,
                    data: data.to_vec(),
                })
            }
            "registry_file" => {
                registry = Some(UploadedFile {
                    filename,
                    data: data.to_vec(),
                })
            }
            _ => {}
        }
    }

    let reporting = reporting.ok_or((
        StatusCode::BAD_REQUEST,
        "Field 'reporting_file' is required".to_string(),
    ))?;
    let registry = registry.ok_or((
        StatusCode::BAD_REQUEST,
        "Field 'registry_file' is required".to_string(),
    ))?;

    let response = service
        .store_uploads(reporting, registry)
        .await
        .map_err(error_reply)?;

    Ok(Json(response))
}

/// Processing response
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub letters_count: usize,
    pub files_generated: Vec<String>,
    pub letters: Vec<LetterRecord>,
}

/// Run the aggregation pass over the stored uploads and generate documents.
async fn process_tables(
    State(service): State<LetterService>,
) -> Result<Json<ProcessResponse>, (StatusCode, String)> {
    let response = service.process().await.map_err(error_reply)?;
    Ok(Json(response))
}

/// Download one generated document.
async fn download_file(
    State(service): State<LetterService>,
    Path(filename): Path<String>,
) -> Result<([(header::HeaderName, String); 2], Vec<u8>), (StatusCode, String)> {
    let data = service.document(&filename).await.map_err(error_reply)?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}

/// Download every generated document as one ZIP archive.
async fn download_archive(
    State(service): State<LetterService>,
) -> Result<([(header::HeaderName, String); 2], Vec<u8>), (StatusCode, String)> {
    let data = service.archive_all().await.map_err(error_reply)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"all_letters.zip\"".to_string(),
            ),
        ],
        data,
    ))
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub reporting_file_uploaded: bool,
    pub registry_file_uploaded: bool,
    pub generated_letters_count: usize,
}

async fn get_status(
    State(service): State<LetterService>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    let response = service.status().await.map_err(error_reply)?;
    Ok(Json(response))
}
