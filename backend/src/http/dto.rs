//! Data Transfer Objects for the HTTP API.
//!
//! Stored entities serialize directly from [`crate::api`]; this module holds
//! the request payloads and their validation into repository write types.
//! Every payload field is optional at the serde level so a missing field is
//! reported as a 400 with a readable message instead of a decode failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{
    DiseaseId, DiseaseInstanceId, NewDisease, NewDiseaseInstance, NewDiseaseInstanceSymptom,
    NewPatient, NewPatientSymptom, NewSymptom, Pagination, PatientId, SymptomId,
};
use crate::models::{normalize_treatment, parse_optional_calendar_date};

/// Treat `None` and `""` alike.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn missing_fields_message(missing: &[&str]) -> String {
    format!("Missing required fields: {}", missing.join(", "))
}

/// Body of `POST /patients` and `PUT /patients/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientPayload {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub register: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub phonenumber: Option<String>,
    pub email: Option<String>,
}

impl PatientPayload {
    /// Validate and convert into the repository write type.
    pub fn into_new_patient(self) -> Result<NewPatient, String> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("register", &self.register),
        ] {
            if present(value).is_none() {
                missing.push(name);
            }
        }
        if self.age.is_none() {
            missing.push("age");
        }
        for (name, value) in [
            ("gender", &self.gender),
            ("phonenumber", &self.phonenumber),
            ("email", &self.email),
        ] {
            if present(value).is_none() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            return Err(missing_fields_message(&missing));
        }

        let age = self.age.unwrap_or_default();
        if age < 0 {
            return Err("Invalid age (must be zero or greater)".to_string());
        }

        let birthdate = parse_optional_calendar_date(self.birthdate.as_deref())
            .map_err(|_| "Invalid birthdate format (use YYYY-MM-DD)".to_string())?;

        Ok(NewPatient {
            firstname: self.firstname.unwrap_or_default(),
            lastname: self.lastname.unwrap_or_default(),
            register: self.register.unwrap_or_default(),
            age,
            gender: self.gender.unwrap_or_default(),
            birthdate,
            address: present(&self.address).map(str::to_string),
            phonenumber: self.phonenumber.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
        })
    }
}

/// Body of `POST /symptoms` and `PUT /symptoms/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomPayload {
    pub symptom_name: Option<String>,
    pub symptom_description: Option<String>,
}

impl SymptomPayload {
    pub fn into_new_symptom(self) -> Result<NewSymptom, String> {
        let symptom_name = present(&self.symptom_name)
            .map(str::to_string)
            .ok_or_else(|| "Missing required field: symptom_name".to_string())?;
        Ok(NewSymptom {
            symptom_name,
            symptom_description: present(&self.symptom_description).map(str::to_string),
        })
    }
}

/// Body of `POST /diseases` and `PUT /diseases/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiseasePayload {
    pub disease_name: Option<String>,
    pub disease_code: Option<String>,
    pub disease_description: Option<String>,
    #[serde(default)]
    pub disease_treatment: Option<Value>,
}

impl DiseasePayload {
    pub fn into_new_disease(self) -> Result<NewDisease, String> {
        if present(&self.disease_name).is_none() || present(&self.disease_code).is_none() {
            return Err(missing_fields_message(&["disease_name", "disease_code"]));
        }
        let disease_treatment = normalize_treatment(self.disease_treatment)
            .map_err(|_| "Invalid JSON format for disease_treatment".to_string())?;
        Ok(NewDisease {
            disease_name: self.disease_name.unwrap_or_default(),
            disease_code: self.disease_code.unwrap_or_default(),
            disease_description: present(&self.disease_description).map(str::to_string),
            disease_treatment,
        })
    }
}

/// Body of `POST /patients/{id}/general-symptoms`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientSymptomPayload {
    pub symptom_id: Option<i32>,
    pub reported_date: Option<String>,
}

impl PatientSymptomPayload {
    pub fn into_new_report(self, patient_id: PatientId) -> Result<NewPatientSymptom, String> {
        let symptom_id = positive_id(self.symptom_id)
            .ok_or_else(|| "Missing or invalid symptom_id".to_string())?;
        let reported_date = parse_optional_calendar_date(self.reported_date.as_deref())
            .map_err(|_| "Invalid reported_date format (use YYYY-MM-DD)".to_string())?;
        Ok(NewPatientSymptom {
            patient_id,
            symptom_id: SymptomId::new(symptom_id),
            reported_date,
        })
    }
}

/// Body of `POST /patients/{id}/disease-instances`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiseaseInstancePayload {
    pub disease_id: Option<i32>,
    pub diagnosis_date: Option<String>,
    pub notes: Option<String>,
}

impl DiseaseInstancePayload {
    pub fn into_new_instance(self, patient_id: PatientId) -> Result<NewDiseaseInstance, String> {
        let disease_id = positive_id(self.disease_id)
            .ok_or_else(|| "Missing or invalid disease_id".to_string())?;
        let diagnosis_date = parse_optional_calendar_date(self.diagnosis_date.as_deref())
            .map_err(|_| "Invalid diagnosis_date format (use YYYY-MM-DD)".to_string())?;
        Ok(NewDiseaseInstance {
            patient_id,
            disease_id: DiseaseId::new(disease_id),
            diagnosis_date,
            notes: self.notes,
        })
    }
}

/// Body of `POST /disease-instances/{id}/symptoms`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceSymptomPayload {
    pub symptom_id: Option<i32>,
}

impl InstanceSymptomPayload {
    pub fn into_new_link(
        self,
        instance_id: DiseaseInstanceId,
    ) -> Result<NewDiseaseInstanceSymptom, String> {
        let symptom_id = positive_id(self.symptom_id)
            .ok_or_else(|| "Missing or invalid symptom_id".to_string())?;
        Ok(NewDiseaseInstanceSymptom {
            patient_disease_id: instance_id,
            symptom_id: SymptomId::new(symptom_id),
        })
    }
}

fn positive_id(id: Option<i32>) -> Option<i32> {
    id.filter(|id| *id > 0)
}

/// Query string of `GET /patients`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PaginationQuery {
    /// Build from decoded query pairs; the first occurrence of a key wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        Self {
            limit: first("limit"),
            offset: first("offset"),
        }
    }
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Self {
        Pagination::from_raw(query.limit.as_deref(), query.offset.as_deref())
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}
