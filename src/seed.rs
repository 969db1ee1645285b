//! Demo data for an empty database.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::models::{Address, NewPatient, PatientStatus};

/// (first, middle, last, date_of_birth, status, street, city, state, zip)
type DemoRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    PatientStatus,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const DEMO_PATIENTS: &[DemoRow] = &[
    ("John", "Jacob", "Doe", "1990-01-01", PatientStatus::Active, "123 Main St", "Anytown", "CA", "12345"),
    ("Emily", "Rose", "Smith", "1985-06-12", PatientStatus::Churned, "456 Oak Ave", "Springfield", "IL", "62704"),
    ("Michael", "James", "Johnson", "1978-03-23", PatientStatus::Active, "789 Pine Ln", "Greenville", "TX", "75401"),
    ("Sophia", "Lynn", "Brown", "1992-11-30", PatientStatus::Inquiry, "321 Maple Rd", "Fairview", "NY", "10001"),
    ("David", "Alan", "Williams", "1980-07-04", PatientStatus::Onboarding, "654 Cedar Blvd", "Hawthorne", "NV", "89415"),
    ("Olivia", "Grace", "Miller", "1995-05-15", PatientStatus::Churned, "987 Birch St", "Lakeside", "FL", "32065"),
    ("Daniel", "Thomas", "Davis", "1988-08-08", PatientStatus::Active, "213 Walnut Ave", "Mountain View", "CA", "94040"),
    ("Ava", "Marie", "Garcia", "2000-02-29", PatientStatus::Onboarding, "333 Aspen Ct", "Boulder", "CO", "80301"),
    ("Matthew", "Lee", "Martinez", "1975-12-17", PatientStatus::Active, "888 Elm St", "Phoenix", "AZ", "85001"),
    ("Isabella", "Jane", "Hernandez", "1998-10-05", PatientStatus::Inquiry, "444 Palm Dr", "Miami", "FL", "33101"),
    ("Joseph", "Alexander", "Lopez", "1983-01-19", PatientStatus::Active, "159 Sycamore St", "Denver", "CO", "80202"),
    ("Mia", "Faith", "Gonzalez", "1991-09-09", PatientStatus::Churned, "777 Redwood Blvd", "Portland", "OR", "97201"),
];

/// The demo records as create payloads.
pub fn demo_patients() -> Result<Vec<NewPatient>, DatabaseError> {
    DEMO_PATIENTS
        .iter()
        .map(|&(first, middle, last, dob, status, street, city, state, zip)| {
            let date_of_birth = NaiveDate::parse_from_str(dob, "%Y-%m-%d")
                .map_err(|e| DatabaseError::Validation(format!("dateOfBirth {dob}: {e}")))?;
            Ok(NewPatient {
                first_name: first.into(),
                middle_name: Some(middle.into()),
                last_name: last.into(),
                date_of_birth,
                status,
                address: Address {
                    street: street.into(),
                    city: city.into(),
                    state: state.into(),
                    zip_code: zip.into(),
                },
            })
        })
        .collect()
}

/// Insert the demo patients unless the table already has rows.
/// Returns the number of rows inserted.
pub fn seed_if_empty(conn: &Connection) -> Result<usize, DatabaseError> {
    if db::count_patients(conn)? > 0 {
        tracing::info!("Database already seeded");
        return Ok(0);
    }

    let patients = demo_patients()?;
    tracing::info!(count = patients.len(), "Seeding database with demo patients");
    // All or nothing: a partial seed would block reseeding forever.
    let tx = conn.unchecked_transaction()?;
    for patient in &patients {
        db::insert_patient(&tx, patient)?;
    }
    tx.commit()?;
    tracing::info!("Database seeded successfully");
    Ok(patients.len())
}
