//! Health check endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, HealthResponse};
use crate::db;

/// `GET /api/health` — liveness plus a row count, which proves the
/// database is reachable.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    let total_patients = db::count_patients(&conn)?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        total_patients,
    }))
}
