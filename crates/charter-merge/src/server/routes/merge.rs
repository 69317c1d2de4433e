//! Charter Party merge endpoint

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{DocumentRole, MergeResponse, UploadSet, UploadedFile};

/// POST /api/merge - Merge fixture recap, base CP and clauses into one DOCX
pub async fn merge_documents(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<MergeResponse>> {
    let multipart = multipart.map_err(|e| Error::Multipart(e.body_text()))?;
    let limit = state.config().server.max_upload_size;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("merge", %request_id);

    async move {
        let start = Instant::now();

        let uploads = read_uploads(multipart, limit).await?;
        let inputs = uploads.into_inputs()?;

        tracing::info!(
            "Merging fixture '{}', base CP '{}', clauses '{}'",
            inputs.fixture.display_name(),
            inputs.base_cp.display_name(),
            inputs.clauses.display_name()
        );

        let output = state.pipeline().run(inputs).await?;

        tracing::info!(
            "Merge completed in {:.1}s ({} clauses)",
            start.elapsed().as_secs_f64(),
            output.clause_count
        );

        Ok(Json(MergeResponse::from_bytes(&output.document)))
    }
    .instrument(span)
    .await
}

/// Collect the three role fields from the form; other fields are ignored
async fn read_uploads(mut multipart: Multipart, limit: usize) -> Result<UploadSet> {
    let mut uploads = UploadSet::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart field", limit))?
    {
        let name = field.name().unwrap_or("").to_string();

        let Some(role) = DocumentRole::from_field_name(&name) else {
            tracing::debug!("Ignoring unexpected form field '{}'", name);
            continue;
        };

        let filename = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, &format!("Failed to read {} file", role), limit))?;

        tracing::debug!(
            "Received {} file: {} ({} bytes, {})",
            role,
            filename.as_deref().unwrap_or("<unnamed>"),
            data.len(),
            content_type.as_deref().unwrap_or("no content type")
        );

        if !uploads.insert(UploadedFile::new(role, filename, content_type, data)) {
            tracing::warn!("Duplicate {} field ignored", role);
        }
    }

    Ok(uploads)
}

/// Body-limit failures keep their 413; everything else is a malformed form
fn multipart_error(err: MultipartError, context: &str, limit: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(limit)
    } else {
        Error::Multipart(format!("{}: {}", context, err.body_text()))
    }
}
