use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PretenzaError {
    #[error("Table ingestion error: {message}")]
    TableIngest { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Letter rendering error: {message}")]
    Rendering { message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl PretenzaError {
    pub fn table_ingest(message: impl Into<String>) -> Self {
        Self::TableIngest {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn rendering(message: impl Into<String>) -> Self {
        Self::Rendering {
            message: message.into(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TableIngest { .. } => "TABLE_INGEST_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Rendering { .. } => "RENDERING_ERROR",
            Self::Archive { .. } => "ARCHIVE_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::TableIngest { .. } => 422,
            Self::Validation { .. } => 400,
            Self::Rendering { .. } => 500,
            Self::Archive { .. } => 500,
            Self::Storage { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }
}

pub type PretenzaResult<T> = Result<T, PretenzaError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

impl From<PretenzaError> for ErrorResponse {
    fn from(error: PretenzaError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for PretenzaError {
    fn from(error: std::io::Error) -> Self {
        Self::storage(error.to_string())
    }
}

impl From<calamine::XlsxError> for PretenzaError {
    fn from(error: calamine::XlsxError) -> Self {
        Self::table_ingest(error.to_string())
    }
}

impl From<csv::Error> for PretenzaError {
    fn from(error: csv::Error) -> Self {
        Self::table_ingest(error.to_string())
    }
}

impl From<serde_json::Error> for PretenzaError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}
