//! Raw text extraction from Word documents
//!
//! Only paragraph text is kept; styling, tables and embedded objects are
//! skipped. Each paragraph is followed by a blank line.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::{Cursor, Read};

use super::ExtractFailure;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Extract raw text from DOCX bytes.
///
/// docx-rs is tried first; packages it rejects are scanned directly with
/// zip + quick-xml.
pub fn extract_docx_text(data: &[u8]) -> Result<String, ExtractFailure> {
    match docx_rs::read_docx(data) {
        Ok(docx) => Ok(text_from_document(&docx.document)),
        Err(e) => {
            tracing::warn!("docx-rs could not read document: {}, scanning document.xml", e);
            scan_document_xml(data).map_err(|scan_err| {
                ExtractFailure::new(
                    "Could not read Word document",
                    Some(format!("{}; {}", e, scan_err)),
                )
            })
        }
    }
}

fn text_from_document(document: &docx_rs::Document) -> String {
    let mut content = String::new();

    for child in &document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for child in &p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in &run.children {
                        match child {
                            docx_rs::RunChild::Text(t) => content.push_str(&unescape_run_text(&t.text)),
                            docx_rs::RunChild::Tab(_) => content.push('\t'),
                            docx_rs::RunChild::Break(_) => content.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            content.push_str(PARAGRAPH_BREAK);
        }
    }

    content
}

/// docx-rs may hold run text in escaped form; text that is not valid
/// escaped XML is taken literally
fn unescape_run_text(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    quick_xml::escape::unescape(text).unwrap_or(Cow::Borrowed(text))
}

/// Walk `word/document.xml` for `<w:t>` text outside tables
fn scan_document_xml(data: &[u8]) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| format!("zip: {}", e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| format!("word/document.xml: {}", e))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("word/document.xml: {}", e))?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut content = String::new();
    let mut table_depth = 0usize;
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"t" => in_text_element = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if table_depth == 0 => match e.local_name().as_ref() {
                b"tab" => content.push('\t'),
                b"br" | b"cr" => content.push('\n'),
                b"p" => content.push_str(PARAGRAPH_BREAK),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_element && table_depth == 0 => {
                let text = e.unescape().map_err(|e| format!("xml: {}", e))?;
                content.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"t" => in_text_element = false,
                b"p" if table_depth == 0 => content.push_str(PARAGRAPH_BREAK),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("xml: {}", e)),
            _ => {}
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
    use std::io::Write;

    fn build_docx(docx: Docx) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let bytes = build_docx(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Vessel: MV OCEAN STAR")))
                .add_paragraph(
                    Paragraph::new()
                        .add_run(Run::new().add_text("Cargo"))
                        .add_run(Run::new().add_text(": 50,000 mt coal").bold()),
                ),
        );

        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "Vessel: MV OCEAN STAR\n\nCargo: 50,000 mt coal\n\n");
    }

    #[test]
    fn test_tables_are_skipped() {
        let table = Table::new(vec![TableRow::new(vec![TableCell::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("cell text")))])]);
        let bytes = build_docx(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Before")))
                .add_table(table),
        );

        let text = extract_docx_text(&bytes).unwrap();
        assert!(text.contains("Before"));
        assert!(!text.contains("cell text"));
    }

    #[test]
    fn test_empty_document() {
        let bytes = build_docx(Docx::new());
        assert_eq!(extract_docx_text(&bytes).unwrap(), "");
    }

    #[test]
    fn test_scan_document_xml_directly() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t xml:space="preserve">Laytime: </w:t></w:r><w:r><w:tab/><w:t>72 hours &amp; SHINC</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>hidden</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p/>
</w:body></w:document>"#;

        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        let text = scan_document_xml(buf.get_ref()).unwrap();
        assert_eq!(text, "Laytime: \t72 hours & SHINC\n\n\n\n");
    }

    #[test]
    fn test_unescape_run_text() {
        assert_eq!(unescape_run_text("P&amp;I Club"), "P&I Club");
        assert_eq!(unescape_run_text("P&I Club"), "P&I Club");
        assert_eq!(unescape_run_text("no entities"), "no entities");
    }

    #[test]
    fn test_not_a_zip() {
        let err = extract_docx_text(b"plain bytes").unwrap_err();
        assert_eq!(err.message, "Could not read Word document");
        assert!(err.details.unwrap().contains("zip"));
    }
}
