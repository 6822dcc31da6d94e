//! Axum route handler for the job-description analysis API.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::analysis::saga::{JobDetails, UploadedDocument};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

/// POST /api/v1/job-descriptions/analyze
///
/// Multipart form: `document` (the job-description file), `title`, and an
/// optional `company`. Returns the generated analysis text.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut document: Option<UploadedDocument> = None;
    let mut title: Option<String> = None;
    let mut company: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("document") => {
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let media_type = field
                    .content_type()
                    .unwrap_or("application/pdf")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read document: {e}")))?;
                document = Some(UploadedDocument {
                    filename,
                    media_type,
                    bytes,
                });
            }
            Some("title") => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read title field: {e}"))
                })?);
            }
            Some("company") => {
                company = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read company field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let document = document
        .ok_or_else(|| AppError::Validation("missing 'document' file part".to_string()))?;
    if document.bytes.is_empty() {
        return Err(AppError::Validation(
            "uploaded document is empty".to_string(),
        ));
    }
    if document.bytes.len() > state.config.max_document_bytes {
        return Err(AppError::Validation(format!(
            "document exceeds the {} byte limit",
            state.config.max_document_bytes
        )));
    }
    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("missing 'title' field".to_string()))?;
    let company = company.filter(|c| !c.trim().is_empty());

    let job = JobDetails { title, company };

    // The saga runs on its own task: if the client disconnects, this
    // handler's future is dropped, the guard cancels the token, and the
    // detached saga still compensates whatever it created before exiting.
    let cancel = CancellationToken::new();
    let task = {
        let saga = state.analysis.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { saga.analyze(document, job, cancel).await })
    };
    let _guard = cancel.drop_guard();

    let analysis = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("analysis task panicked: {e}")))??;

    Ok(Json(AnalyzeResponse { analysis }))
}
