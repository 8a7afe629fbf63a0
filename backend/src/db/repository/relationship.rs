//! Junction-table repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{
    DiseaseInstance, DiseaseInstanceEntry, DiseaseInstanceId, DiseaseInstanceSymptom,
    LinkedSymptom, NewDiseaseInstance, NewDiseaseInstanceSymptom, NewPatientSymptom, PatientId,
    PatientSymptom, PatientSymptomEntry, PatientSymptomId, SymptomId,
};

/// Repository trait for the rows that relate patients, symptoms and diseases.
///
/// Creates fail with `InvalidReference` when a referenced row is missing.
/// List operations return an empty list for unknown parents.
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
    // ==================== General symptom reports ====================

    /// Reports for a patient, joined with the symptom definition, ordered by id.
    async fn list_patient_symptoms(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<Vec<PatientSymptomEntry>>;

    /// Record one report. The same symptom may be reported repeatedly.
    async fn create_patient_symptom(
        &self,
        report: &NewPatientSymptom,
    ) -> RepositoryResult<PatientSymptom>;

    async fn delete_patient_symptom(&self, id: PatientSymptomId) -> RepositoryResult<bool>;

    // ==================== Diagnosis instances ====================

    /// Diagnoses for a patient joined with disease name and code, ordered by id.
    async fn list_disease_instances(
        &self,
        patient_id: PatientId,
    ) -> RepositoryResult<Vec<DiseaseInstanceEntry>>;

    async fn create_disease_instance(
        &self,
        instance: &NewDiseaseInstance,
    ) -> RepositoryResult<DiseaseInstance>;

    /// Delete a diagnosis instance and its linked symptoms.
    async fn delete_disease_instance(&self, id: DiseaseInstanceId) -> RepositoryResult<bool>;

    // ==================== Symptoms linked to a diagnosis ====================

    async fn list_instance_symptoms(
        &self,
        instance_id: DiseaseInstanceId,
    ) -> RepositoryResult<Vec<LinkedSymptom>>;

    /// # Errors
    /// * `Conflict` - the symptom is already linked to this instance
    async fn link_instance_symptom(
        &self,
        link: &NewDiseaseInstanceSymptom,
    ) -> RepositoryResult<DiseaseInstanceSymptom>;

    async fn unlink_instance_symptom(
        &self,
        instance_id: DiseaseInstanceId,
        symptom_id: SymptomId,
    ) -> RepositoryResult<bool>;
}
