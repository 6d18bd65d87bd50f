use crate::error::{PretenzaError, PretenzaResult};
use validator::{Validate, ValidationErrors};

/// Spreadsheet extensions the upload endpoint accepts.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

pub fn validate_model<T: Validate>(model: &T) -> PretenzaResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(PretenzaError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match error.message.as_deref() {
                Some(message) => format!("{}: {}", field, message),
                None => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.join(", ")
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> PretenzaResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(PretenzaError::validation(
            "file_type",
            format!(
                "File type '{}' not allowed. Allowed types: {}",
                extension,
                allowed_types.join(", ")
            ),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> PretenzaResult<()> {
    if file_size > max_size {
        return Err(PretenzaError::validation(
            "file_size",
            format!(
                "File size {} bytes exceeds maximum allowed size {} bytes",
                file_size, max_size
            ),
        ));
    }

    Ok(())
}
