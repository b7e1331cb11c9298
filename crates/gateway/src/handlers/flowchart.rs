//! Flowchart generation handler

use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use papergraph_common::errors::{AppError, Result};
use serde::Deserialize;
use validator::Validate;

/// Request to generate a flowchart from paper content
#[derive(Debug, Deserialize, Validate)]
pub struct FlowchartRequest {
    #[validate(length(min = 1, message = "No content provided"))]
    pub content: String,
}

/// Generate Mermaid flowchart source for the supplied content
///
/// The source is returned as text; rendering happens on the caller's side.
pub async fn generate_flowchart(
    State(state): State<AppState>,
    Json(request): Json<FlowchartRequest>,
) -> Result<Response> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("content".to_string()),
    })?;

    let code = state.outline.generate_flowchart(&request.content).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        code,
    )
        .into_response())
}
