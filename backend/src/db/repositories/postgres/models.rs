use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use diesel::sql_types::{Int4, Nullable, Text};
use serde_json::Value;

use super::schema::{
    diseases, patient_disease, patient_disease_symptom, patient_symptoms, patients, symptoms,
};
use crate::api::*;

// ==================== patients ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PatientRow {
    pub patient_id: i32,
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

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Patient {
            patient_id: PatientId::new(row.patient_id),
            firstname: row.firstname,
            lastname: row.lastname,
            register: row.register,
            age: row.age,
            gender: row.gender,
            birthdate: row.birthdate,
            address: row.address,
            phonenumber: row.phonenumber,
            email: row.email,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patients)]
pub struct NewPatientRow<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub register: &'a str,
    pub age: i32,
    pub gender: &'a str,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<&'a str>,
    pub phonenumber: &'a str,
    pub email: &'a str,
}

impl<'a> From<&'a NewPatient> for NewPatientRow<'a> {
    fn from(p: &'a NewPatient) -> Self {
        NewPatientRow {
            firstname: &p.firstname,
            lastname: &p.lastname,
            register: &p.register,
            age: p.age,
            gender: &p.gender,
            birthdate: p.birthdate,
            address: p.address.as_deref(),
            phonenumber: &p.phonenumber,
            email: &p.email,
        }
    }
}

/// Full-replace payload. `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
#[diesel(treat_none_as_null = true)]
pub struct PatientChanges<'a> {
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub register: &'a str,
    pub age: i32,
    pub gender: &'a str,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<&'a str>,
    pub phonenumber: &'a str,
    pub email: &'a str,
}

impl<'a> From<&'a NewPatient> for PatientChanges<'a> {
    fn from(p: &'a NewPatient) -> Self {
        PatientChanges {
            firstname: &p.firstname,
            lastname: &p.lastname,
            register: &p.register,
            age: p.age,
            gender: &p.gender,
            birthdate: p.birthdate,
            address: p.address.as_deref(),
            phonenumber: &p.phonenumber,
            email: &p.email,
        }
    }
}

/// Output of the summary query.
#[derive(Debug, Clone, QueryableByName)]
pub struct PatientSummarySqlRow {
    #[diesel(sql_type = Int4)]
    pub patient_id: i32,
    #[diesel(sql_type = Text)]
    pub firstname: String,
    #[diesel(sql_type = Text)]
    pub lastname: String,
    #[diesel(sql_type = Text)]
    pub email: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub general_symptoms_list: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub distinct_diseases_list: Option<String>,
}

impl From<PatientSummarySqlRow> for PatientSummaryRow {
    fn from(row: PatientSummarySqlRow) -> Self {
        PatientSummaryRow {
            patient_id: PatientId::new(row.patient_id),
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            general_symptoms_list: row.general_symptoms_list,
            distinct_diseases_list: row.distinct_diseases_list,
        }
    }
}

// ==================== symptoms ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = symptoms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SymptomRow {
    pub symptom_id: i32,
    pub symptom_name: String,
    pub symptom_description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<SymptomRow> for Symptom {
    fn from(row: SymptomRow) -> Self {
        Symptom {
            symptom_id: SymptomId::new(row.symptom_id),
            symptom_name: row.symptom_name,
            symptom_description: row.symptom_description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = symptoms)]
pub struct NewSymptomRow<'a> {
    pub symptom_name: &'a str,
    pub symptom_description: Option<&'a str>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = symptoms)]
#[diesel(treat_none_as_null = true)]
pub struct SymptomChanges<'a> {
    pub symptom_name: &'a str,
    pub symptom_description: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

// ==================== diseases ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = diseases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiseaseRow {
    pub disease_id: i32,
    pub disease_name: String,
    pub disease_code: String,
    pub disease_description: Option<String>,
    pub disease_treatment: Option<Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DiseaseRow> for Disease {
    fn from(row: DiseaseRow) -> Self {
        Disease {
            disease_id: DiseaseId::new(row.disease_id),
            disease_name: row.disease_name,
            disease_code: row.disease_code,
            disease_description: row.disease_description,
            disease_treatment: row.disease_treatment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = diseases)]
pub struct NewDiseaseRow<'a> {
    pub disease_name: &'a str,
    pub disease_code: &'a str,
    pub disease_description: Option<&'a str>,
    pub disease_treatment: Option<&'a Value>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = diseases)]
#[diesel(treat_none_as_null = true)]
pub struct DiseaseChanges<'a> {
    pub disease_name: &'a str,
    pub disease_code: &'a str,
    pub disease_description: Option<&'a str>,
    pub disease_treatment: Option<&'a Value>,
    pub updated_at: NaiveDateTime,
}

// ==================== patient_symptoms ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patient_symptoms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PatientSymptomRow {
    pub id: i32,
    pub patient_id: i32,
    pub symptom_id: i32,
    pub reported_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PatientSymptomRow> for PatientSymptom {
    fn from(row: PatientSymptomRow) -> Self {
        PatientSymptom {
            id: PatientSymptomId::new(row.id),
            patient_id: PatientId::new(row.patient_id),
            symptom_id: SymptomId::new(row.symptom_id),
            reported_date: row.reported_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PatientSymptomRow {
    pub fn into_entry(
        self,
        symptom_name: String,
        symptom_description: Option<String>,
    ) -> PatientSymptomEntry {
        PatientSymptomEntry {
            id: PatientSymptomId::new(self.id),
            patient_id: PatientId::new(self.patient_id),
            symptom_id: SymptomId::new(self.symptom_id),
            symptom_name,
            symptom_description,
            reported_date: self.reported_date,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patient_symptoms)]
pub struct NewPatientSymptomRow {
    pub patient_id: i32,
    pub symptom_id: i32,
    pub reported_date: Option<NaiveDate>,
}

// ==================== patient_disease ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patient_disease)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiseaseInstanceRow {
    pub patient_disease_id: i32,
    pub patient_id: i32,
    pub disease_id: i32,
    pub diagnosis_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DiseaseInstanceRow> for DiseaseInstance {
    fn from(row: DiseaseInstanceRow) -> Self {
        DiseaseInstance {
            patient_disease_id: DiseaseInstanceId::new(row.patient_disease_id),
            patient_id: PatientId::new(row.patient_id),
            disease_id: DiseaseId::new(row.disease_id),
            diagnosis_date: row.diagnosis_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl DiseaseInstanceRow {
    pub fn into_entry(self, disease_name: String, disease_code: String) -> DiseaseInstanceEntry {
        DiseaseInstanceEntry {
            patient_disease_id: DiseaseInstanceId::new(self.patient_disease_id),
            patient_id: PatientId::new(self.patient_id),
            disease_id: DiseaseId::new(self.disease_id),
            disease_name,
            disease_code,
            diagnosis_date: self.diagnosis_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patient_disease)]
pub struct NewDiseaseInstanceRow<'a> {
    pub patient_id: i32,
    pub disease_id: i32,
    pub diagnosis_date: Option<NaiveDate>,
    pub notes: Option<&'a str>,
}

// ==================== patient_disease_symptom ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patient_disease_symptom)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InstanceSymptomRow {
    pub id: i32,
    pub patient_disease_id: i32,
    pub symptom_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<InstanceSymptomRow> for DiseaseInstanceSymptom {
    fn from(row: InstanceSymptomRow) -> Self {
        DiseaseInstanceSymptom {
            id: DiseaseInstanceSymptomId::new(row.id),
            patient_disease_id: DiseaseInstanceId::new(row.patient_disease_id),
            symptom_id: SymptomId::new(row.symptom_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl InstanceSymptomRow {
    pub fn into_linked(
        self,
        symptom_name: String,
        symptom_description: Option<String>,
    ) -> LinkedSymptom {
        LinkedSymptom {
            id: DiseaseInstanceSymptomId::new(self.id),
            patient_disease_id: DiseaseInstanceId::new(self.patient_disease_id),
            symptom_id: SymptomId::new(self.symptom_id),
            symptom_name,
            symptom_description,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patient_disease_symptom)]
pub struct NewInstanceSymptomRow {
    pub patient_disease_id: i32,
    pub symptom_id: i32,
}
