//! ZIP packaging of generated documents for the download-all endpoint.

use anyhow::{bail, Context, Result};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle named documents into a deflate-compressed ZIP archive in memory.
pub fn bundle(documents: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    if documents.is_empty() {
        bail!("No documents to archive");
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, body) in documents {
        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add '{}' to archive", name))?;
        writer
            .write_all(body)
            .with_context(|| format!("Failed to write '{}' into archive", name))?;
    }

    let cursor = writer.finish().context("Failed to finalize archive")?;
    Ok(cursor.into_inner())
}
