//! Client side of the patient API: a transport trait, its HTTP
//! implementation, and the in-memory `PatientStore` cache that
//! presentation code reads from.

pub mod http;
pub mod store;

use thiserror::Error;

use crate::models::{NewPatient, Patient, PatientUpdate};

pub use http::HttpPatientApi;
pub use store::PatientStore;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Patient {0} not found")]
    NotFound(i64),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Cannot reach patient API at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    ResponseParsing(String),
}

/// The four CRUD calls the store makes against the backend.
pub trait PatientApi {
    fn list_patients(&self) -> Result<Vec<Patient>, ClientError>;

    fn create_patient(&self, data: &NewPatient) -> Result<Patient, ClientError>;

    fn update_patient(&self, id: i64, data: &PatientUpdate) -> Result<Patient, ClientError>;

    fn delete_patient(&self, id: i64) -> Result<(), ClientError>;
}
