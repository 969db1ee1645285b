use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::PatientStatus;
use crate::db::DatabaseError;

/// Postal address, persisted as a single JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require_text("address.street", &self.street)?;
        require_text("address.city", &self.city)?;
        require_text("address.state", &self.state)?;
        require_text("address.zipCode", &self.zip_code)?;
        Ok(())
    }
}

/// A persisted patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub status: PatientStatus,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload: every patient field except the storage-assigned ones.
///
/// `id`, `createdAt` and `updatedAt` are not part of the type, so any
/// values a caller sends for them are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub status: PatientStatus,
    pub address: Address,
}

impl NewPatient {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        self.address.validate()
    }
}

/// Partial update payload. Absent fields are left untouched.
///
/// `middleName` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub middle_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl PatientUpdate {
    /// Update that only changes the status.
    pub fn status(status: PatientStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merge the provided fields into `patient`. Identity and timestamps
    /// are never touched here.
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(first_name) = &self.first_name {
            patient.first_name = first_name.trim().to_string();
        }
        if let Some(middle_name) = &self.middle_name {
            patient.middle_name = normalize_optional(middle_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            patient.last_name = last_name.trim().to_string();
        }
        if let Some(date_of_birth) = self.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
        if let Some(status) = self.status {
            patient.status = status;
        }
        if let Some(address) = &self.address {
            patient.address = address.clone();
        }
    }
}

impl Patient {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        self.address.validate()
    }
}

/// Ordering used for every name-sorted view: last name, then first name,
/// compared case-insensitively with the exact spelling as tie-breaker.
pub fn name_order(a: &Patient, b: &Patient) -> Ordering {
    a.last_name
        .to_lowercase()
        .cmp(&b.last_name.to_lowercase())
        .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.first_name.cmp(&b.first_name))
}

/// Middle names are stored trimmed; blank ones are stored as absent.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn require_text(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(DatabaseError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
