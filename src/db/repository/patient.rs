use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::patient::normalize_optional;
use crate::models::*;

const PATIENT_COLUMNS: &str = "id, first_name, middle_name, last_name, date_of_birth, status,
     address, created_at, updated_at";

struct PatientRow {
    id: i64,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    date_of_birth: String,
    status: String,
    address: String,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        middle_name: row.get(2)?,
        last_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        status: row.get(5)?,
        address: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: row.id,
        first_name: row.first_name,
        middle_name: row.middle_name,
        last_name: row.last_name,
        date_of_birth: NaiveDate::parse_from_str(&row.date_of_birth, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(format!("date_of_birth: {e}")))?,
        status: PatientStatus::from_str(&row.status)?,
        address: serde_json::from_str(&row.address)
            .map_err(|e| DatabaseError::ConstraintViolation(format!("address: {e}")))?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("timestamp {value}: {e}")))
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn encode_address(address: &Address) -> Result<String, DatabaseError> {
    serde_json::to_string(address)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("address: {e}")))
}

fn not_found(id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "Patient".into(),
        id: id.to_string(),
    }
}

/// All patients ordered by last name, then first name, using the same
/// `name_order` comparison as client-side views. Equal names keep id order.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map([], read_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    // SQLite NOCASE folds ASCII only; sort here so non-ASCII names agree.
    patients.sort_by(name_order);
    Ok(patients)
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id], read_row) {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

/// Insert a new patient. Storage assigns `id` and both timestamps.
pub fn insert_patient(conn: &Connection, new: &NewPatient) -> Result<Patient, DatabaseError> {
    new.validate()?;

    let now = now_timestamp();
    conn.execute(
        "INSERT INTO patients (first_name, middle_name, last_name, date_of_birth, status,
         address, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new.first_name.trim(),
            normalize_optional(new.middle_name.clone()),
            new.last_name.trim(),
            new.date_of_birth.to_string(),
            new.status.as_str(),
            encode_address(&new.address)?,
            now,
            now,
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(id, "Inserted patient");
    get_patient(conn, id)?.ok_or_else(|| not_found(id))
}

/// Apply a partial update. `id` and `created_at` are never written.
pub fn update_patient(
    conn: &Connection,
    id: i64,
    update: &PatientUpdate,
) -> Result<Patient, DatabaseError> {
    let mut patient = get_patient(conn, id)?.ok_or_else(|| not_found(id))?;
    update.apply_to(&mut patient);
    patient.validate()?;

    let rows = conn.execute(
        "UPDATE patients SET first_name = ?2, middle_name = ?3, last_name = ?4,
         date_of_birth = ?5, status = ?6, address = ?7, updated_at = ?8
         WHERE id = ?1",
        params![
            id,
            patient.first_name,
            patient.middle_name,
            patient.last_name,
            patient.date_of_birth.to_string(),
            patient.status.as_str(),
            encode_address(&patient.address)?,
            now_timestamp(),
        ],
    )?;
    if rows == 0 {
        return Err(not_found(id));
    }

    get_patient(conn, id)?.ok_or_else(|| not_found(id))
}

/// Hard delete.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let rows = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
