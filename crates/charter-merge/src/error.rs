//! Error types for the merge service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::types::DocumentRole;

/// Result type alias for merge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Merge service errors
#[derive(Debug, Error)]
pub enum Error {
    /// One or more of the three required uploads is absent
    #[error("Missing required file(s): {}", format_roles(.0))]
    MissingInput(Vec<DocumentRole>),

    /// An uploaded file could not be turned into text
    #[error("Failed to extract text from {role} file: {message}")]
    Extraction {
        role: DocumentRole,
        message: String,
        details: Option<String>,
    },

    /// The merged document could not be serialized
    #[error("Failed to build merged document: {0}")]
    Merge(String),

    /// Malformed multipart request body
    #[error("Invalid multipart request: {0}")]
    Multipart(String),

    /// Request body exceeded the configured upload limit
    #[error("Upload exceeds the maximum request size of {0} bytes")]
    PayloadTooLarge(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction error for the given role
    pub fn extraction(
        role: DocumentRole,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self::Extraction {
            role,
            message: message.into(),
            details,
        }
    }

    /// Create a merge error
    pub fn merge(message: impl Into<String>) -> Self {
        Self::Merge(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingInput(_) | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Extraction { .. }
            | Error::Merge(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error type used in the JSON envelope
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::MissingInput(_) => "missing_input",
            Error::Extraction { .. } => "extraction_error",
            Error::Merge(_) => "merge_error",
            Error::Multipart(_) => "multipart_error",
            Error::PayloadTooLarge(_) => "payload_too_large",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

fn format_roles(roles: &[DocumentRole]) -> String {
    roles
        .iter()
        .map(|r| r.field_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut error = Map::new();
        error.insert("type".into(), json!(self.error_type()));
        error.insert("message".into(), json!(self.to_string()));

        match &self {
            Error::Extraction { role, details, .. } => {
                error.insert("role".into(), json!(role.field_name()));
                if let Some(details) = details {
                    error.insert("details".into(), json!(details));
                }
            }
            Error::MissingInput(roles) => {
                let missing: Vec<&str> = roles.iter().map(|r| r.field_name()).collect();
                error.insert("missing".into(), json!(missing));
            }
            _ => {}
        }

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = Json(json!({ "error": Value::Object(error) }));

        (status, body).into_response()
    }
}
