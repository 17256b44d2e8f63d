//! # Bill Routes
//!
//! Bill CRUD plus the two engine-backed endpoints: calculation and
//! receipt-merge.
//!
//! ## Request Flow
//! ```text
//! GET  /api/bills                  ──► list_for_user (date desc)
//! POST /api/bills                  ──► validate ──► insert (assign real id)
//! GET  /api/bills/{id}             ──► owner-scoped fetch
//! PUT  /api/bills/{id}             ──► validate ──► owner-scoped update
//! GET  /api/bills/{id}/calculation ──► fetch ──► calculate ──► breakdown
//! POST /api/bills/{id}/receipt     ──► fetch ──► extract ──► merge ──► save
//! ```
//!
//! Bills are validated here, at the boundary; the engine trusts what the
//! store hands back.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::receipt::ExtractRequest;
use crate::state::AppState;
use patungan_core::validation::validate_bill;
use patungan_core::{calculate, Bill, BillCalculation, CoreError};

/// `GET /api/bills`
pub async fn list_bills(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Bill>>, ApiError> {
    let bills = state.db.bills().list_for_user(&user.id).await?;
    Ok(Json(bills))
}

/// `POST /api/bills`
///
/// Accepts a full bill payload. A `temp_`-prefixed id marks a bill the
/// frontend has not saved before; the store replaces it with a real one and
/// the persisted bill is returned.
pub async fn create_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(bill): Json<Bill>,
) -> Result<(StatusCode, Json<Bill>), ApiError> {
    debug!(user_id = %user.id, title = %bill.title, "create bill");

    validate_bill(&bill).map_err(CoreError::from)?;
    let stored = state.db.bills().insert(&user.id, &bill).await?;

    info!(bill_id = %stored.id, user_id = %user.id, "Bill created");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /api/bills/{id}`
pub async fn get_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Bill>, ApiError> {
    let bill = state
        .db
        .bills()
        .get_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", &id))?;
    Ok(Json(bill))
}

/// `PUT /api/bills/{id}`
pub async fn update_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(mut bill): Json<Bill>,
) -> Result<Json<Bill>, ApiError> {
    debug!(bill_id = %id, user_id = %user.id, "update bill");

    // The path wins over whatever id the payload carries
    bill.id = id;

    validate_bill(&bill).map_err(CoreError::from)?;
    state.db.bills().update(&user.id, &bill).await?;

    Ok(Json(bill))
}

/// `GET /api/bills/{id}/calculation`
///
/// Runs the calculation engine on the stored snapshot. The breakdown is
/// derived on every call and never persisted.
pub async fn get_calculation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BillCalculation>, ApiError> {
    let bill = state
        .db
        .bills()
        .get_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", &id))?;

    let breakdown = calculate(&bill)?;
    Ok(Json(breakdown))
}

/// `POST /api/bills/{id}/receipt`
///
/// Extracts line items from a receipt image and merges them into the bill
/// as fresh, unassigned items. Returns the updated bill.
pub async fn merge_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Bill>, ApiError> {
    let mut bill = state
        .db
        .bills()
        .get_for_user(&id, &user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bill", &id))?;

    let lines = state
        .extractor()?
        .extract(&req.image_base64, &req.mime_type)
        .await?;

    let appended = bill.merge_receipt_lines(lines)?;
    state.db.bills().update(&user.id, &bill).await?;

    info!(bill_id = %bill.id, appended = appended, "Receipt items merged");

    Ok(Json(bill))
}
