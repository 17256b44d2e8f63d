//! # Receipt Routes
//!
//! Standalone extraction endpoint: the frontend previews candidates before
//! merging them into a bill (see the bill routes for the merge variant).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use patungan_core::ReceiptLine;

/// A receipt image, base64-encoded with its MIME type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub image_base64: String,
    pub mime_type: String,
}

/// `POST /api/receipts/extract`
pub async fn extract(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Vec<ReceiptLine>>, ApiError> {
    debug!(user_id = %user.id, mime_type = %req.mime_type, "extract receipt");

    if req.image_base64.is_empty() {
        return Err(ApiError::validation("imageBase64 is required"));
    }

    let lines = state
        .extractor()?
        .extract(&req.image_base64, &req.mime_type)
        .await?;

    Ok(Json(lines))
}
