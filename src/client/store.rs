//! In-memory patient cache for presentation code.
//!
//! The store is a disposable replica of the server's list. Every action
//! calls the backend first and only touches the local list after the
//! call succeeds. Failures are recorded in `error` and returned to the
//! caller; nothing is retried.

use super::{ClientError, PatientApi};
use crate::models::{name_order, NewPatient, Patient, PatientUpdate};

pub const FETCH_ERROR: &str = "Failed to fetch patients.";
pub const CREATE_ERROR: &str = "Failed to create patient.";
pub const UPDATE_ERROR: &str = "Failed to update patient.";
pub const DELETE_ERROR: &str = "Failed to delete patient.";

pub struct PatientStore<A: PatientApi> {
    api: A,
    patients: Vec<Patient>,
    is_loading: bool,
    error: Option<String>,
}

impl<A: PatientApi> PatientStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            patients: Vec::new(),
            is_loading: false,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Local list in cache order (newly created records first).
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Copy of the local list, stably sorted by last then first name.
    pub fn patients_sorted_by_name(&self) -> Vec<Patient> {
        let mut sorted = self.patients.clone();
        sorted.sort_by(name_order);
        sorted
    }

    pub fn total_patients(&self) -> usize {
        self.patients.len()
    }

    /// Replace the local list with the server's.
    pub fn fetch_patients(&mut self) -> Result<(), ClientError> {
        self.begin();
        let result = self.api.list_patients();
        let patients = self.finish(result, FETCH_ERROR)?;
        self.patients = patients;
        Ok(())
    }

    /// Create on the server, then insert the returned record at the head
    /// of the local list.
    pub fn create_patient(&mut self, data: &NewPatient) -> Result<Patient, ClientError> {
        self.begin();
        let result = self.api.create_patient(data);
        let created = self.finish(result, CREATE_ERROR)?;
        self.patients.insert(0, created.clone());
        Ok(created)
    }

    /// Update on the server, then replace the local entry with the same
    /// id. Records not in the cache are left alone.
    pub fn update_patient(
        &mut self,
        id: i64,
        data: &PatientUpdate,
    ) -> Result<Patient, ClientError> {
        self.begin();
        let result = self.api.update_patient(id, data);
        let updated = self.finish(result, UPDATE_ERROR)?;
        if let Some(slot) = self.patients.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Delete on the server, then drop the local entry with that id.
    pub fn delete_patient(&mut self, id: i64) -> Result<(), ClientError> {
        self.begin();
        let result = self.api.delete_patient(id);
        self.finish(result, DELETE_ERROR)?;
        self.patients.retain(|p| p.id != id);
        Ok(())
    }

    fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Runs on every exit path of an action.
    fn finish<T>(
        &mut self,
        result: Result<T, ClientError>,
        message: &str,
    ) -> Result<T, ClientError> {
        self.is_loading = false;
        result.map_err(|e| {
            tracing::warn!(error = %e, "{message}");
            self.error = Some(message.to_string());
            e
        })
    }
}
