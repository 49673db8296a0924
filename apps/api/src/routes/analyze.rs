use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ingest;
use crate::models::report::AnalysisReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub candidate_text: Option<String>,
    pub target_text: Option<String>,
}

/// POST /api/v1/analyze
/// Candidate document and target role description as pasted text.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let candidate = req.candidate_text.ok_or_else(|| {
        AppError::Validation("Provide candidate_text or use the upload endpoint".to_string())
    })?;
    let target = req
        .target_text
        .ok_or_else(|| AppError::Validation("target_text is required".to_string()))?;

    let candidate = ingest::clean_text(&candidate);
    let report = state.engine.analyze(&candidate, &target).await?;
    Ok(Json(report))
}

/// POST /api/v1/analyze/upload
/// Multipart form: `document` (binary file) + `target_text` (text field).
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut candidate_text: Option<String> = None;
    let mut target_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("document") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::Validation("document field must carry a filename".to_string())
                    })?;
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read document field: {e}"))
                })?;
                candidate_text = Some(ingest::extract_text(&filename, &bytes)?);
            }
            Some("target_text") => {
                target_text = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read target_text field: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let candidate = candidate_text.ok_or_else(|| {
        AppError::Validation("A document file is required in the 'document' field".to_string())
    })?;
    let target = target_text
        .ok_or_else(|| AppError::Validation("target_text is required".to_string()))?;

    let report = state.engine.analyze(&candidate, &target).await?;
    Ok(Json(report))
}
