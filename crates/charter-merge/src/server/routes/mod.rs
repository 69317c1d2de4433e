//! API routes for the merge server

pub mod merge;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/merge",
            post(merge::merge_documents).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "charter-merge",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Assembles a Charter Party from a fixture recap, a base CP and negotiated clauses",
        "endpoints": {
            "POST /api/merge": "Multipart upload of fixture, baseCP and clauses; returns the merged DOCX as base64",
            "GET /api/info": "This document",
            "GET /health": "Liveness check"
        },
        "fields": ["fixture", "baseCP", "clauses"],
        "input_formats": ["application/pdf", "application/vnd.openxmlformats-officedocument.wordprocessingml.document", "text/plain"],
        "output_format": "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    }))
}
