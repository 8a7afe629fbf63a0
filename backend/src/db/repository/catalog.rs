//! Symptom and disease catalog repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Disease, DiseaseId, NewDisease, NewSymptom, Symptom, SymptomId};

/// Repository trait for the symptom and disease definitions.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ==================== Symptoms ====================

    /// All symptoms ordered by id.
    async fn list_symptoms(&self) -> RepositoryResult<Vec<Symptom>>;

    /// # Errors
    /// * `Conflict` - a symptom with this name exists
    async fn create_symptom(&self, symptom: &NewSymptom) -> RepositoryResult<Symptom>;

    /// # Errors
    /// * `NotFound` - no symptom with this id
    async fn get_symptom(&self, symptom_id: SymptomId) -> RepositoryResult<Symptom>;

    /// Replace name and description; refreshes `updated_at`.
    async fn update_symptom(
        &self,
        symptom_id: SymptomId,
        symptom: &NewSymptom,
    ) -> RepositoryResult<Symptom>;

    /// Delete a symptom and every report or diagnosis link that references it.
    async fn delete_symptom(&self, symptom_id: SymptomId) -> RepositoryResult<bool>;

    // ==================== Diseases ====================

    /// All diseases ordered by id.
    async fn list_diseases(&self) -> RepositoryResult<Vec<Disease>>;

    /// # Errors
    /// * `Conflict` - a disease with this code exists
    async fn create_disease(&self, disease: &NewDisease) -> RepositoryResult<Disease>;

    /// # Errors
    /// * `NotFound` - no disease with this id
    async fn get_disease(&self, disease_id: DiseaseId) -> RepositoryResult<Disease>;

    async fn update_disease(
        &self,
        disease_id: DiseaseId,
        disease: &NewDisease,
    ) -> RepositoryResult<Disease>;

    /// Delete a disease definition.
    ///
    /// # Errors
    /// * `Conflict` - diagnosis instances still reference the disease
    async fn delete_disease(&self, disease_id: DiseaseId) -> RepositoryResult<bool>;
}
