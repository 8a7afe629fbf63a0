//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers. Most are thin
//! pass-throughs; the patient summary additionally turns the store's
//! delimited aggregate strings into lists.
//!
//! Every function takes `R: FullRepository + ?Sized` so it works with a
//! concrete repository as well as with `&dyn FullRepository`.
//!
//! # Usage
//!
//! ```no_run
//! use patient_registry::db::{services, repositories::LocalRepository};
//! use patient_registry::api::Pagination;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let patients = services::list_patients(&repo, Pagination::default()).await?;
//!     println!("Found {} patients", patients.len());
//!     Ok(())
//! }
//! ```

use log::debug;

use super::repository::{FullRepository, RepositoryResult};
use crate::api::*;

/// Split a comma-delimited aggregate into trimmed, non-empty names.
///
/// `None` and blank input both yield an empty list.
pub fn parse_aggregated_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

// ==================== Health & Connection ====================

/// Check if the store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Patients ====================

pub async fn list_patients<R: FullRepository + ?Sized>(
    repo: &R,
    page: Pagination,
) -> RepositoryResult<Vec<Patient>> {
    debug!(
        "Service layer: listing patients (limit={}, offset={})",
        page.limit, page.offset
    );
    repo.list_patients(page).await
}

pub async fn create_patient<R: FullRepository + ?Sized>(
    repo: &R,
    patient: &NewPatient,
) -> RepositoryResult<Patient> {
    let created = repo.create_patient(patient).await?;
    debug!("Service layer: created patient {}", created.patient_id);
    Ok(created)
}

pub async fn get_patient<R: FullRepository + ?Sized>(
    repo: &R,
    patient_id: PatientId,
) -> RepositoryResult<Patient> {
    repo.get_patient(patient_id).await
}

pub async fn update_patient<R: FullRepository + ?Sized>(
    repo: &R,
    patient_id: PatientId,
    patient: &NewPatient,
) -> RepositoryResult<Patient> {
    repo.update_patient(patient_id, patient).await
}

pub async fn delete_patient<R: FullRepository + ?Sized>(
    repo: &R,
    patient_id: PatientId,
) -> RepositoryResult<bool> {
    let removed = repo.delete_patient(patient_id).await?;
    debug!(
        "Service layer: delete patient {} (removed={})",
        patient_id, removed
    );
    Ok(removed)
}

/// Fetch a patient's summary with both aggregates parsed into lists.
pub async fn get_patient_summary<R: FullRepository + ?Sized>(
    repo: &R,
    patient_id: PatientId,
) -> RepositoryResult<PatientSummary> {
    let row = repo.get_patient_summary(patient_id).await?;
    Ok(PatientSummary {
        general_symptoms_list: parse_aggregated_list(row.general_symptoms_list.as_deref()),
        distinct_diseases_list: parse_aggregated_list(row.distinct_diseases_list.as_deref()),
        patient_id: row.patient_id,
        firstname: row.firstname,
        lastname: row.lastname,
        email: row.email,
    })
}

// ==================== Symptoms ====================

pub async fn list_symptoms<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Symptom>> {
    repo.list_symptoms().await
}

pub async fn create_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    symptom: &NewSymptom,
) -> RepositoryResult<Symptom> {
    repo.create_symptom(symptom).await
}

pub async fn get_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    symptom_id: SymptomId,
) -> RepositoryResult<Symptom> {
    repo.get_symptom(symptom_id).await
}

pub async fn update_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    symptom_id: SymptomId,
    symptom: &NewSymptom,
) -> RepositoryResult<Symptom> {
    repo.update_symptom(symptom_id, symptom).await
}

pub async fn delete_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    symptom_id: SymptomId,
) -> RepositoryResult<bool> {
    repo.delete_symptom(symptom_id).await
}

// ==================== Diseases ====================

pub async fn list_diseases<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Disease>> {
    repo.list_diseases().await
}

pub async fn create_disease<R: FullRepository + ?Sized>(
    repo: &R,
    disease: &NewDisease,
) -> RepositoryResult<Disease> {
    repo.create_disease(disease).await
}

pub async fn get_disease<R: FullRepository + ?Sized>(
    repo: &R,
    disease_id: DiseaseId,
) -> RepositoryResult<Disease> {
    repo.get_disease(disease_id).await
}

pub async fn update_disease<R: FullRepository + ?Sized>(
    repo: &R,
    disease_id: DiseaseId,
    disease: &NewDisease,
) -> RepositoryResult<Disease> {
    repo.update_disease(disease_id, disease).await
}

pub async fn delete_disease<R: FullRepository + ?Sized>(
    repo: &R,
    disease_id: DiseaseId,
) -> RepositoryResult<bool> {
    repo.delete_disease(disease_id).await
}

// ==================== Relationships ====================

pub async fn list_patient_symptoms<R: FullRepository + ?Sized>(
    repo: &R,
    patient_id: PatientId,
) -> RepositoryResult<Vec<PatientSymptomEntry>> {
    repo.list_patient_symptoms(patient_id).await
}

pub async fn report_patient_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    report: &NewPatientSymptom,
) -> RepositoryResult<PatientSymptom> {
    repo.create_patient_symptom(report).await
}

pub async fn delete_patient_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    id: PatientSymptomId,
) -> RepositoryResult<bool> {
    repo.delete_patient_symptom(id).await
}

pub async fn list_disease_instances<R: FullRepository + ?Sized>(
    repo: &R,
    patient_id: PatientId,
) -> RepositoryResult<Vec<DiseaseInstanceEntry>> {
    repo.list_disease_instances(patient_id).await
}

pub async fn record_disease_instance<R: FullRepository + ?Sized>(
    repo: &R,
    instance: &NewDiseaseInstance,
) -> RepositoryResult<DiseaseInstance> {
    repo.create_disease_instance(instance).await
}

pub async fn delete_disease_instance<R: FullRepository + ?Sized>(
    repo: &R,
    id: DiseaseInstanceId,
) -> RepositoryResult<bool> {
    repo.delete_disease_instance(id).await
}

pub async fn list_instance_symptoms<R: FullRepository + ?Sized>(
    repo: &R,
    instance_id: DiseaseInstanceId,
) -> RepositoryResult<Vec<LinkedSymptom>> {
    repo.list_instance_symptoms(instance_id).await
}

pub async fn link_instance_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    link: &NewDiseaseInstanceSymptom,
) -> RepositoryResult<DiseaseInstanceSymptom> {
    repo.link_instance_symptom(link).await
}

pub async fn unlink_instance_symptom<R: FullRepository + ?Sized>(
    repo: &R,
    instance_id: DiseaseInstanceId,
    symptom_id: SymptomId,
) -> RepositoryResult<bool> {
    repo.unlink_instance_symptom(instance_id, symptom_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_aggregated_list_trims_and_drops_empty() {
        assert_eq!(
            parse_aggregated_list(Some(" Fever ,Cough,, ,")),
            vec!["Fever".to_string(), "Cough".to_string()]
        );
    }

    #[test]
    fn test_parse_aggregated_list_absent_is_empty() {
        assert!(parse_aggregated_list(None).is_empty());
        assert!(parse_aggregated_list(Some("")).is_empty());
        assert!(parse_aggregated_list(Some("  ,  ")).is_empty());
    }

    proptest! {
        #[test]
        fn prop_parsed_items_are_trimmed_and_non_empty(raw in "[a-zA-Z ,]{0,40}") {
            for item in parse_aggregated_list(Some(&raw)) {
                prop_assert!(!item.is_empty());
                prop_assert_eq!(item.trim(), item.as_str());
                prop_assert!(!item.contains(','));
            }
        }

        #[test]
        fn prop_joined_names_round_trip(names in prop::collection::vec("[A-Za-z]{1,12}", 0..8)) {
            let joined = names.join(", ");
            prop_assert_eq!(parse_aggregated_list(Some(&joined)), names);
        }
    }
}
