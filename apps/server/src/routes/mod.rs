//! # Route Layer
//!
//! All HTTP routes, grouped by concern. Handlers stay thin: validate at the
//! boundary, call core/db, map errors.

pub mod auth;
pub mod bill;
pub mod receipt;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/bills", get(bill::list_bills).post(bill::create_bill))
        .route("/api/bills/{id}", get(bill::get_bill).put(bill::update_bill))
        .route("/api/bills/{id}/calculation", get(bill::get_calculation))
        .route("/api/bills/{id}/receipt", post(bill::merge_receipt))
        .route("/api/receipts/extract", post(receipt::extract))
        .with_state(state)
}

/// `GET /health` - liveness plus a database round-trip.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = state.db.health_check().await;
    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
    }))
}
