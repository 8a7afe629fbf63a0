use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::PatientId;

/// Default page size for patient listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Default page offset for patient listings.
pub const DEFAULT_PAGE_OFFSET: i64 = 0;

/// A stored patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: PatientId,
    pub firstname: String,
    pub lastname: String,
    /// Registration identifier, unique across patients.
    pub register: String,
    pub age: i32,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub phonenumber: String,
    pub email: String,
}

/// Field values for creating a patient or fully replacing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub firstname: String,
    pub lastname: String,
    pub register: String,
    pub age: i32,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub phonenumber: String,
    pub email: String,
}

impl NewPatient {
    /// Materialize the payload as a stored row with the given id.
    pub fn into_patient(self, patient_id: PatientId) -> Patient {
        Patient {
            patient_id,
            firstname: self.firstname,
            lastname: self.lastname,
            register: self.register,
            age: self.age,
            gender: self.gender,
            birthdate: self.birthdate,
            address: self.address,
            phonenumber: self.phonenumber,
            email: self.email,
        }
    }
}

/// Patient summary as produced by the store.
///
/// The two aggregates are comma-delimited name lists built by the summary
/// query; `None` when the patient has no related rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummaryRow {
    pub patient_id: PatientId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub general_symptoms_list: Option<String>,
    pub distinct_diseases_list: Option<String>,
}

/// Patient summary with the aggregates parsed into lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: PatientId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub general_symptoms_list: Vec<String>,
    pub distinct_diseases_list: Vec<String>,
}

/// Limit/offset window over the patient listing, ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: DEFAULT_PAGE_OFFSET,
        }
    }
}

impl Pagination {
    /// Build a window from raw query-string values.
    ///
    /// Values must parse as 32-bit integers. A missing, unparsable or
    /// non-positive limit falls back to the default; so does a missing,
    /// unparsable or negative offset.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|s| s.parse::<i32>().ok())
            .filter(|v| *v > 0)
            .map(i64::from)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = offset
            .and_then(|s| s.parse::<i32>().ok())
            .filter(|v| *v >= 0)
            .map(i64::from)
            .unwrap_or(DEFAULT_PAGE_OFFSET);
        Self { limit, offset }
    }
}
