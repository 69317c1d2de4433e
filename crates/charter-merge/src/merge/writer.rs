//! DOCX serialization of a merged document

use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use std::io::Cursor;

use super::{MergedDocument, SectionBody};
use crate::error::{Error, Result};

const HEADING_STYLE_ID: &str = "Heading1";
/// Half-points
const HEADING_SIZE: usize = 28;

/// Render sections as DOCX: a `Heading1` paragraph per non-empty heading,
/// then the section body.
pub fn render_docx(document: &MergedDocument) -> Result<Vec<u8>> {
    let mut docx = Docx::new().add_style(
        Style::new(HEADING_STYLE_ID, StyleType::Paragraph)
            .name("Heading 1")
            .size(HEADING_SIZE)
            .bold(),
    );

    for section in &document.sections {
        if !section.heading.is_empty() {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .style(HEADING_STYLE_ID)
                    .add_run(Run::new().add_text(sanitize_xml_text(&section.heading))),
            );
        }

        match &section.body {
            SectionBody::Text(text) => {
                for line in text.lines().filter(|line| !line.trim().is_empty()) {
                    docx = docx.add_paragraph(
                        Paragraph::new().add_run(Run::new().add_text(sanitize_xml_text(line))),
                    );
                }
            }
            SectionBody::Paragraphs(paragraphs) => {
                for paragraph in paragraphs {
                    docx = docx.add_paragraph(multiline_paragraph(paragraph.trim_end()));
                }
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| Error::merge(format!("DOCX packaging failed: {}", e)))?;

    Ok(buf.into_inner())
}

/// One paragraph, with line breaks where the text has newlines
fn multiline_paragraph(text: &str) -> Paragraph {
    let mut run = Run::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(sanitize_xml_text(line));
    }
    Paragraph::new().add_run(run)
}

/// Drop characters XML 1.0 cannot carry (C0 controls other than tab/newline,
/// U+FFFE, U+FFFF)
pub fn sanitize_xml_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .collect()
}
