//! Junction rows linking patients, symptoms and diseases.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::{
    DiseaseId, DiseaseInstanceId, DiseaseInstanceSymptomId, PatientId, PatientSymptomId,
    SymptomId,
};

// ==================== General symptom reports ====================

/// One general symptom report, not tied to a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSymptom {
    pub id: PatientSymptomId,
    pub patient_id: PatientId,
    pub symptom_id: SymptomId,
    pub reported_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatientSymptom {
    pub patient_id: PatientId,
    pub symptom_id: SymptomId,
    pub reported_date: Option<NaiveDate>,
}

/// A general symptom report joined with the symptom definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSymptomEntry {
    pub id: PatientSymptomId,
    pub patient_id: PatientId,
    pub symptom_id: SymptomId,
    pub symptom_name: String,
    pub symptom_description: Option<String>,
    pub reported_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

// ==================== Diagnosis instances ====================

/// One recorded diagnosis of a disease for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInstance {
    pub patient_disease_id: DiseaseInstanceId,
    pub patient_id: PatientId,
    pub disease_id: DiseaseId,
    pub diagnosis_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDiseaseInstance {
    pub patient_id: PatientId,
    pub disease_id: DiseaseId,
    pub diagnosis_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// A diagnosis instance joined with the disease name and code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInstanceEntry {
    pub patient_disease_id: DiseaseInstanceId,
    pub patient_id: PatientId,
    pub disease_id: DiseaseId,
    pub disease_name: String,
    pub disease_code: String,
    pub diagnosis_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==================== Symptoms observed in a diagnosis ====================

/// Link between a diagnosis instance and a symptom observed in it.
///
/// A symptom links to a given diagnosis instance at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInstanceSymptom {
    pub id: DiseaseInstanceSymptomId,
    pub patient_disease_id: DiseaseInstanceId,
    pub symptom_id: SymptomId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiseaseInstanceSymptom {
    pub patient_disease_id: DiseaseInstanceId,
    pub symptom_id: SymptomId,
}

/// A linked symptom joined with the symptom definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedSymptom {
    pub id: DiseaseInstanceSymptomId,
    pub patient_disease_id: DiseaseInstanceId,
    pub symptom_id: SymptomId,
    pub symptom_name: String,
    pub symptom_description: Option<String>,
    pub created_at: NaiveDateTime,
}
