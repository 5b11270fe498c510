//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::analysis::extract::extract_text;
use crate::analysis::suggestions::{analyze_resume, Suggestion};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub suggestions: Vec<Suggestion>,
}

/// An uploaded file as read off the multipart stream.
struct Upload {
    filename: Option<String>,
    bytes: Bytes,
}

const MIB: usize = 1024 * 1024;

/// Whole megabytes (rounded up) from 1 MiB, bytes below that.
fn upload_limit_message(limit: usize) -> String {
    if limit < MIB {
        format!("File too large (max {limit} bytes)")
    } else {
        format!("File too large (max {} MB)", limit.div_ceil(MIB))
    }
}

/// POST /api/v1/analyze
///
/// Multipart form: `resume` (file) and `job_description` (text).
/// Extracts the resume text and scores it against the job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut resume: Option<Upload> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                resume = Some(Upload { filename, bytes });
            }
            Some("job_description") => job_description = Some(field.text().await?),
            _ => {}
        }
    }

    let upload = resume.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;

    let limit = state.config.max_upload_bytes;
    if upload.bytes.len() > limit {
        return Err(AppError::PayloadTooLarge(upload_limit_message(limit)));
    }

    info!(
        "Analyzing resume {:?} ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    // PDF decoding is CPU bound and may panic on hostile input
    let text = tokio::task::spawn_blocking(move || {
        extract_text(&upload.bytes, upload.filename.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("resume extraction task failed: {e}")))?
    .map_err(|e| AppError::UnprocessableEntity(format!("Failed to extract resume text: {e}")))?;

    let suggestions = analyze_resume(&text, &job_description);

    Ok(Json(AnalyzeResponse {
        success: true,
        suggestions,
    }))
}
