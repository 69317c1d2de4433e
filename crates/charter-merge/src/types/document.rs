//! Uploaded source documents and their roles in the merge

use bytes::Bytes;
use std::fmt;

use crate::error::{Error, Result};

/// The part a source document plays in the merged Charter Party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentRole {
    /// Fixture recap (negotiated deal terms)
    Fixture,
    /// Base Charter Party template (GENCON, NYPE, ...)
    BaseCp,
    /// Negotiated additional clauses
    Clauses,
}

impl DocumentRole {
    /// All roles, in merge order of the upload form
    pub const ALL: [DocumentRole; 3] = [Self::Fixture, Self::BaseCp, Self::Clauses];

    /// Multipart form field name for this role
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Fixture => "fixture",
            Self::BaseCp => "baseCP",
            Self::Clauses => "clauses",
        }
    }

    /// Resolve a multipart field name to a role
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.field_name() == name)
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Input format the extractor will treat a file as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// PDF document
    Pdf,
    /// Word-processing document (.docx)
    Docx,
    /// Plain UTF-8 text
    PlainText,
}

const PDF_MAGIC: &[u8] = b"%PDF-";

impl SourceFormat {
    /// Resolve the format from a declared MIME type.
    ///
    /// A missing or generic MIME type (`application/octet-stream`) falls back
    /// to the filename extension, then to the PDF magic bytes. Anything not
    /// recognised as PDF or plain text is treated as a Word document.
    pub fn detect(content_type: Option<&str>, filename: Option<&str>, data: &[u8]) -> Self {
        if let Some(format) = content_type.and_then(Self::from_mime) {
            return format;
        }

        if let Some(format) = filename
            .and_then(|name| mime_guess::from_path(name).first())
            .and_then(|mime| Self::from_mime(mime.essence_str()))
        {
            return format;
        }

        if data.starts_with(PDF_MAGIC) {
            return Self::Pdf;
        }

        Self::Docx
    }

    /// Map a MIME type to a format, `None` for generic or unknown types
    fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::PlainText),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/msword" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::PlainText => "Text File",
        }
    }
}

/// One uploaded file, alive for the duration of a single request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Role in the merge
    pub role: DocumentRole,
    /// Original filename, if the client sent one
    pub filename: Option<String>,
    /// Declared MIME type, if the client sent one
    pub content_type: Option<String>,
    /// Raw file content
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(
        role: DocumentRole,
        filename: Option<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            role,
            filename,
            content_type,
            data: data.into(),
        }
    }

    /// Format the extractor should use for this file
    pub fn format(&self) -> SourceFormat {
        SourceFormat::detect(
            self.content_type.as_deref(),
            self.filename.as_deref(),
            &self.data,
        )
    }

    /// Name used in logs
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(self.role.field_name())
    }

    /// Browsers submit an untouched file input as an empty part with no filename
    pub fn is_empty_submission(&self) -> bool {
        self.data.is_empty() && self.filename.as_deref().map_or(true, str::is_empty)
    }
}

/// Collects uploads by role while a request body is read
#[derive(Debug, Default)]
pub struct UploadSet {
    fixture: Option<UploadedFile>,
    base_cp: Option<UploadedFile>,
    clauses: Option<UploadedFile>,
}

impl UploadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an upload under its role. Returns `false` if the role was already
    /// filled; the first upload for a role wins.
    pub fn insert(&mut self, file: UploadedFile) -> bool {
        if file.is_empty_submission() {
            return true;
        }

        let slot = match file.role {
            DocumentRole::Fixture => &mut self.fixture,
            DocumentRole::BaseCp => &mut self.base_cp,
            DocumentRole::Clauses => &mut self.clauses,
        };

        if slot.is_some() {
            return false;
        }
        *slot = Some(file);
        true
    }

    /// Roles that have no upload yet
    pub fn missing(&self) -> Vec<DocumentRole> {
        let mut missing = Vec::new();
        if self.fixture.is_none() {
            missing.push(DocumentRole::Fixture);
        }
        if self.base_cp.is_none() {
            missing.push(DocumentRole::BaseCp);
        }
        if self.clauses.is_none() {
            missing.push(DocumentRole::Clauses);
        }
        missing
    }

    /// Finish collection, failing with `MissingInput` if any role is absent
    pub fn into_inputs(self) -> Result<MergeInputs> {
        match (self.fixture, self.base_cp, self.clauses) {
            (Some(fixture), Some(base_cp), Some(clauses)) => Ok(MergeInputs {
                fixture,
                base_cp,
                clauses,
            }),
            (fixture, base_cp, clauses) => {
                let missing = [
                    (DocumentRole::Fixture, fixture.is_none()),
                    (DocumentRole::BaseCp, base_cp.is_none()),
                    (DocumentRole::Clauses, clauses.is_none()),
                ]
                .into_iter()
                .filter_map(|(role, absent)| absent.then_some(role))
                .collect();
                Err(Error::MissingInput(missing))
            }
        }
    }
}

/// The complete set of three uploads a merge needs
#[derive(Debug, Clone)]
pub struct MergeInputs {
    pub fixture: UploadedFile,
    pub base_cp: UploadedFile,
    pub clauses: UploadedFile,
}
