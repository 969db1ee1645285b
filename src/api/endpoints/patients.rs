//! Patient collection endpoints.
//!
//! - `GET    /api/patients`     — all patients, name-ordered
//! - `POST   /api/patients`     — create
//! - `PUT    /api/patients/:id` — partial update
//! - `DELETE /api/patients/:id` — hard delete

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::{NewPatient, Patient, PatientUpdate};

/// `GET /api/patients` — list every patient.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let patients = db::list_patients(&conn)?;
    Ok(Json(patients))
}

/// `POST /api/patients` — create a patient, 201 with the stored record.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(new) = payload?;

    let conn = ctx.core.open_db()?;
    let patient = db::insert_patient(&conn, &new)?;

    tracing::info!(id = patient.id, "Patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `PUT /api/patients/:id` — apply the provided fields.
pub async fn update(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PatientUpdate>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Path(id) = id?;
    let Json(update) = payload?;

    let conn = ctx.core.open_db()?;
    let patient = db::update_patient(&conn, id, &update)?;

    tracing::info!(id, "Patient updated");
    Ok(Json(patient))
}

/// `DELETE /api/patients/:id` — 204 on success.
pub async fn remove(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    let conn = ctx.core.open_db()?;
    db::delete_patient(&conn, id)?;

    tracing::info!(id, "Patient deleted");
    Ok(StatusCode::NO_CONTENT)
}
