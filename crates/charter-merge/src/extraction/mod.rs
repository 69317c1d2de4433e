//! Plain-text extraction from uploaded PDF, DOCX and text files

mod docx;
mod pdf;

pub use docx::extract_docx_text;
pub use pdf::{extract_pdf_text, join_page_runs};

use std::time::Instant;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::{DocumentRole, SourceFormat, UploadedFile};

/// Format-level extraction failure, before it is tagged with a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractFailure {
    /// Human-readable summary
    pub message: String,
    /// Lower-level library error, if any
    pub details: Option<String>,
}

impl ExtractFailure {
    pub fn new(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            message: message.into(),
            details,
        }
    }

    fn into_error(self, role: DocumentRole) -> Error {
        Error::extraction(role, self.message, self.details)
    }
}

/// Converts uploaded bytes into a single plain-text string
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    config: ExtractionConfig,
}

impl TextExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract text from an upload. Blocking; callers on the runtime should
    /// run this inside `spawn_blocking`.
    pub fn extract(&self, file: &UploadedFile) -> Result<String> {
        let start = Instant::now();
        let format = file.format();

        tracing::debug!(
            "Extracting {} '{}' as {} ({} bytes)",
            file.role,
            file.display_name(),
            format.display_name(),
            file.data.len()
        );

        let text = self
            .extract_bytes(format, &file.data)
            .map_err(|failure| failure.into_error(file.role))?;

        tracing::info!(
            "Extracted {} chars from {} '{}' in {:.1}ms",
            text.chars().count(),
            file.role,
            file.display_name(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(text)
    }

    /// Extract text from raw bytes of a known format
    pub fn extract_bytes(
        &self,
        format: SourceFormat,
        data: &[u8],
    ) -> std::result::Result<String, ExtractFailure> {
        match format {
            SourceFormat::Pdf => extract_pdf_text(data, self.config.pdf_timeout()),
            SourceFormat::Docx => extract_docx_text(data),
            SourceFormat::PlainText => Ok(decode_plain_text(data)),
        }
    }
}

/// Lossy UTF-8 decode with any byte-order mark removed
fn decode_plain_text(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string()
}
