//! Assembly of the merged Charter Party document

mod writer;

pub use writer::{render_docx, sanitize_xml_text};

use crate::error::{Error, Result};
use crate::extraction::extract_docx_text;

/// Heading of the fixture recap section
pub const FIXTURE_HEADING: &str = "FIXTURE RECAP";
/// Heading of the base contract section
pub const BASE_CP_HEADING: &str = "BASE CHARTER PARTY";
/// Heading of the negotiated clauses section
pub const CLAUSES_HEADING: &str = "ADDITIONAL CLAUSES";

/// Body of one titled section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    /// A text blob, written one paragraph per non-blank line
    Text(String),
    /// Pre-split paragraphs, written one paragraph each
    Paragraphs(Vec<String>),
}

/// A titled section of the output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

impl Section {
    pub fn text(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Text(text.into()),
        }
    }

    pub fn paragraphs(heading: impl Into<String>, paragraphs: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            body: SectionBody::Paragraphs(paragraphs),
        }
    }
}

/// Ordered sections making up the output document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub sections: Vec<Section>,
}

impl MergedDocument {
    /// Fixed layout: fixture recap, base Charter Party, additional clauses
    pub fn assemble(fixture_text: &str, base_text: &str, clauses: &[String]) -> Self {
        Self {
            sections: vec![
                Section::text(FIXTURE_HEADING, fixture_text),
                Section::text(BASE_CP_HEADING, base_text),
                Section::paragraphs(CLAUSES_HEADING, clauses.to_vec()),
            ],
        }
    }

    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }

    /// Serialize to DOCX bytes
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        render_docx(self)
    }
}

/// Builds the merged DOCX from the three extracted texts
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentMerger;

impl DocumentMerger {
    /// Produce the serialized output document. The base contract text is
    /// wrapped in a DOCX and re-extracted before it is inserted.
    pub fn merge(base_text: &str, fixture_text: &str, clauses: &[String]) -> Result<Vec<u8>> {
        let base_text = Self::roundtrip_text(base_text)?;
        let document = MergedDocument::assemble(fixture_text, &base_text, clauses);

        let bytes = document.to_docx()?;
        tracing::debug!(
            "Rendered merged document: {} clauses, {} bytes",
            clauses.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Wrap text in a single-section DOCX, serialize it, and read the text back
    pub fn roundtrip_text(text: &str) -> Result<String> {
        let wrapped = MergedDocument {
            sections: vec![Section {
                heading: String::new(),
                body: SectionBody::Text(text.to_string()),
            }],
        };
        let bytes = wrapped.to_docx()?;

        extract_docx_text(&bytes).map_err(|failure| {
            Error::merge(match failure.details {
                Some(details) => format!("{}: {}", failure.message, details),
                None => failure.message,
            })
        })
    }
}
