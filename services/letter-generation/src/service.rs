//! Letter Generation Service
//!
//! Orchestration around the core pipeline: stored uploads, the
//! ingest → aggregate → render pass, and access to generated documents.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use pretenza_utils::config::AppConfig;
use pretenza_utils::error::{PretenzaError, PretenzaResult};
use pretenza_utils::tables::{parse_registration, parse_reporting};
use pretenza_utils::validation::{
    validate_file_size, validate_file_type, SPREADSHEET_EXTENSIONS,
};

use crate::aggregate::aggregate;
use crate::archive;
use crate::letters::TemplateEngine;
use crate::{ProcessResponse, StatusResponse, UploadResponse};

/// Canonical stems the two uploads are stored under (original extension kept).
const REPORTING_STEM: &str = "reporting";
const REGISTRY_STEM: &str = "registry";

/// One received upload, as extracted from the multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Letter service
#[derive(Clone)]
pub struct LetterService {
    config: Arc<AppConfig>,
    engine: Arc<TemplateEngine>,
}

impl LetterService {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(TemplateEngine::new()),
        }
    }

    /// Validate and store both table uploads under canonical names.
    pub async fn store_uploads(
        &self,
        reporting: UploadedFile,
        registry: UploadedFile,
    ) -> PretenzaResult<UploadResponse> {
        let reporting_name = self.store_upload(REPORTING_STEM, &reporting).await?;
        let registry_name = self.store_upload(REGISTRY_STEM, &registry).await?;

        info!(
            reporting = %reporting_name,
            registry = %registry_name,
            "Stored table uploads"
        );

        Ok(UploadResponse {
            message: "Файлы успешно загружены".to_string(),
            reporting_file: reporting_name,
            registry_file: registry_name,
        })
    }

    async fn store_upload(&self, stem: &str, upload: &UploadedFile) -> PretenzaResult<String> {
        validate_file_type(&upload.filename, SPREADSHEET_EXTENSIONS)?;
        validate_file_size(upload.data.len() as u64, self.config.server.max_upload_size)?;

        let upload_dir = PathBuf::from(&self.config.storage.upload_dir);
        tokio::fs::create_dir_all(&upload_dir).await?;

        // Drop stale copies stored under another extension.
        for extension in SPREADSHEET_EXTENSIONS {
            let stale = upload_dir.join(format!("{}.{}", stem, extension));
            if stale.exists() {
                tokio::fs::remove_file(&stale).await?;
            }
        }

        let extension = std::path::Path::new(&upload.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("xlsx")
            .to_lowercase();
        let stored_name = format!("{}.{}", stem, extension);
        tokio::fs::write(upload_dir.join(&stored_name), &upload.data).await?;

        Ok(stored_name)
    }

    async fn find_upload(&self, stem: &str) -> Option<PathBuf> {
        let upload_dir = PathBuf::from(&self.config.storage.upload_dir);
        for extension in SPREADSHEET_EXTENSIONS {
            let candidate = upload_dir.join(format!("{}.{}", stem, extension));
            if tokio::fs::metadata(&candidate).await.is_ok() {
                return Some(candidate);
            }
        }
        None
    }

    /// Run the full pass: read both stored tables, aggregate, render and
    /// store one letter + appendix per record.
    pub async fn process(&self) -> PretenzaResult<ProcessResponse> {
        let reporting_path = self.find_upload(REPORTING_STEM).await.ok_or_else(|| {
            PretenzaError::not_found("reporting table upload (upload files first)")
        })?;
        let registry_path = self.find_upload(REGISTRY_STEM).await.ok_or_else(|| {
            PretenzaError::not_found("registration table upload (upload files first)")
        })?;

        let reporting_data = tokio::fs::read(&reporting_path).await?;
        let registry_data = tokio::fs::read(&registry_path).await?;

        let reporting_name = file_name(&reporting_path);
        let registry_name = file_name(&registry_path);

        let reporting_table = parse_reporting(&reporting_name, &reporting_data, None)
            .map_err(|e| PretenzaError::table_ingest(format!("{:#}", e)))?;
        let registry_table = parse_registration(&registry_name, &registry_data, None)
            .map_err(|e| PretenzaError::table_ingest(format!("{:#}", e)))?;

        for skipped in reporting_table
            .skipped
            .iter()
            .chain(registry_table.skipped.iter())
        {
            warn!("{}", skipped);
        }

        // One reference date for the whole pass keeps classification
        // deterministic across rows.
        let now = Utc::now().date_naive();
        let records = aggregate(&reporting_table.rows, &registry_table.rows, now);

        info!(
            reporting_rows = reporting_table.rows.len(),
            registry_rows = registry_table.rows.len(),
            letters = records.len(),
            "Aggregation pass complete"
        );

        let generated_dir = PathBuf::from(&self.config.storage.generated_dir);
        if tokio::fs::metadata(&generated_dir).await.is_ok() {
            tokio::fs::remove_dir_all(&generated_dir).await?;
        }
        tokio::fs::create_dir_all(&generated_dir).await?;

        // Rendering is per-record and independent: one bad record is logged
        // and skipped, the rest still produce documents.
        let mut files_generated = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let documents =
                match self
                    .engine
                    .render_documents(record, index + 1, now, &self.config.letters)
                {
                    Ok(documents) => documents,
                    Err(e) => {
                        error!(
                            order_id = %record.order_id,
                            contractor = %record.contractor_name,
                            "Failed to render documents: {:#}",
                            e
                        );
                        continue;
                    }
                };

            for document in documents {
                let path = generated_dir.join(&document.filename);
                match tokio::fs::write(&path, document.body.as_bytes()).await {
                    Ok(()) => files_generated.push(document.filename),
                    Err(e) => {
                        error!(filename = %document.filename, "Failed to write document: {}", e);
                    }
                }
            }
        }

        Ok(ProcessResponse {
            message: format!("Обработано и сгенерировано {} писем", records.len()),
            letters_count: records.len(),
            files_generated,
            letters: records,
        })
    }

    /// Read one generated document by filename.
    pub async fn document(&self, filename: &str) -> PretenzaResult<Vec<u8>> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(PretenzaError::validation("filename", "Invalid file name"));
        }

        let path = PathBuf::from(&self.config.storage.generated_dir).join(filename);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PretenzaError::not_found(filename))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Bundle every generated document into one ZIP archive.
    pub async fn archive_all(&self) -> PretenzaResult<Vec<u8>> {
        let documents = self.generated_documents().await?;
        if documents.is_empty() {
            return Err(PretenzaError::not_found("generated documents"));
        }

        archive::bundle(&documents).map_err(|e| PretenzaError::archive(format!("{:#}", e)))
    }

    async fn generated_documents(&self) -> PretenzaResult<Vec<(String, Vec<u8>)>> {
        let generated_dir = PathBuf::from(&self.config.storage.generated_dir);
        let mut documents = Vec::new();

        let mut entries = match tokio::fs::read_dir(&generated_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(documents),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                let data = tokio::fs::read(entry.path()).await?;
                documents.push((name, data));
            }
        }

        documents.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(documents)
    }

    /// Upload/generation state for the status endpoint.
    pub async fn status(&self) -> PretenzaResult<StatusResponse> {
        let generated_count = self.generated_documents().await?.len();

        Ok(StatusResponse {
            reporting_file_uploaded: self.find_upload(REPORTING_STEM).await.is_some(),
            registry_file_uploaded: self.find_upload(REGISTRY_STEM).await.is_some(),
            generated_letters_count: generated_count,
        })
    }

}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
