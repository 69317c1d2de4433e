//! Shared fixtures for integration tests: DOCX/PDF builders and multipart bodies

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{Cursor, Write};
use tower::ServiceExt; // For oneshot

use charter_merge::config::MergeConfig;
use charter_merge::server::{build_router, state::AppState};

pub const BOUNDARY: &str = "----charter-merge-test-boundary";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// One multipart file part
pub struct Part<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn new(field: &'a str, filename: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
        Self {
            field,
            filename,
            content_type,
            data,
        }
    }
}

pub fn test_router() -> Router {
    test_router_with(MergeConfig::default())
}

pub fn test_router_with(config: MergeConfig) -> Router {
    build_router(AppState::new(config))
}

/// Build a DOCX with one paragraph per entry
pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });

    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

/// Build a PDF with one Courier text line per page
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Encode parts as `multipart/form-data`, returning (content type, body)
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        write!(body, "--{}\r\n", BOUNDARY).unwrap();
        write!(
            body,
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            part.field, part.filename
        )
        .unwrap();
        write!(body, "Content-Type: {}\r\n\r\n", part.content_type).unwrap();
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    write!(body, "--{}--\r\n", BOUNDARY).unwrap();

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// POST parts to `/api/merge`, returning status and parsed JSON body
pub async fn post_merge(app: Router, parts: &[Part<'_>]) -> (StatusCode, serde_json::Value) {
    let (content_type, body) = multipart_body(parts);
    let request = Request::builder()
        .method("POST")
        .uri("/api/merge")
        .header("content-type", content_type)
        .body(Body::from(body))
        .unwrap();

    send(app, request).await
}

/// Send a request and parse the JSON response
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("Failed to send request");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
