//! PDF text extraction, page by page

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::ExtractFailure;

/// Glyph names some fonts leak into extracted text, e.g. `uni2019`
static GLYPH_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"uni([0-9A-F]{4})").expect("valid glyph regex"));

/// Extract text from a PDF: runs within a page are joined with a space,
/// pages are joined with a newline.
///
/// pdf-extract runs on a worker thread bounded by `timeout`. If it errors,
/// panics or times out, lopdf is used instead.
pub fn extract_pdf_text(data: &[u8], timeout: Duration) -> Result<String, ExtractFailure> {
    let pages = match extract_pages_with_timeout(data, timeout) {
        Ok(pages) => pages,
        Err(reason) => {
            tracing::warn!("pdf-extract failed: {}, trying lopdf fallback", reason);
            extract_pages_fallback(data).map_err(|e| {
                ExtractFailure::new("Could not read PDF document", Some(format!("{}; {}", reason, e)))
            })?
        }
    };

    Ok(cleanup_pdf_text(&join_pages(&pages)))
}

/// Collapse a page's text into its runs joined by single spaces
pub fn join_page_runs(page: &str) -> String {
    page.lines()
        .map(str::trim)
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| join_page_runs(page))
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_pages_with_timeout(data: &[u8], timeout: Duration) -> Result<Vec<String>, String> {
    let data_vec = data.to_vec();
    let (tx, rx) = mpsc::channel();

    let handle = thread::spawn(move || {
        let result = pdf_extract::extract_text_from_mem_by_pages(&data_vec);
        let _ = tx.send(result.map_err(|e| e.to_string()));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            let _ = handle.join();
            result
        }
        // The worker cannot be killed; it is left to finish on its own.
        Err(mpsc::RecvTimeoutError::Timeout) => {
            Err(format!("timed out after {}s", timeout.as_secs()))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = handle.join();
            Err("extraction thread panicked".to_string())
        }
    }
}

/// Page-wise extraction with lopdf, scanning raw content streams when
/// lopdf's own text extraction rejects a page
fn extract_pages_fallback(data: &[u8]) -> Result<Vec<String>, String> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| format!("lopdf: {}", e))?;

    let mut pages = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let text = match doc.extract_text(&[page_num]) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("lopdf text extraction failed on page {}: {}", page_num, e);
                match doc.get_page_content(page_id) {
                    Ok(content) => scan_content_stream(&content),
                    Err(e) => {
                        tracing::debug!("Could not get content for page {}: {}", page_num, e);
                        String::new()
                    }
                }
            }
        };
        pages.push(text);
    }

    Ok(pages)
}

/// Pull string operands of `Tj`/`TJ` out of a content stream, one run per line
fn scan_content_stream(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut runs = Vec::new();
    let mut in_text_block = false;

    for line in content_str.lines() {
        let line = line.trim();

        match line {
            "BT" => in_text_block = true,
            "ET" => in_text_block = false,
            _ if in_text_block && (line.ends_with("Tj") || line.ends_with("TJ")) => {
                if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
                    if start < end {
                        runs.push(unescape_pdf_string(&line[start + 1..end]));
                    }
                }
            }
            _ => {}
        }
    }

    runs.join("\n")
}

fn unescape_pdf_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

/// Replace leaked glyph names and typographic ligatures, drop NULs
fn cleanup_pdf_text(text: &str) -> String {
    let text = GLYPH_NAME.replace_all(text, |caps: &regex::Captures<'_>| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    text.replace('\0', "")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
}
