//! Patient repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{NewPatient, Pagination, Patient, PatientId, PatientSummaryRow};

/// Repository trait for patients and the store health check.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the connection is healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Patient Operations ====================

    /// List patients ordered by id within the given window.
    async fn list_patients(&self, page: Pagination) -> RepositoryResult<Vec<Patient>>;

    /// Insert a patient and return the stored row.
    ///
    /// # Errors
    /// * `Conflict` - register or email already in use
    async fn create_patient(&self, patient: &NewPatient) -> RepositoryResult<Patient>;

    /// Fetch one patient.
    ///
    /// # Errors
    /// * `NotFound` - no patient with this id
    async fn get_patient(&self, patient_id: PatientId) -> RepositoryResult<Patient>;

    /// Replace every mutable field of a patient.
    ///
    /// Optional fields absent from `patient` are cleared.
    ///
    /// # Errors
    /// * `NotFound` - no patient with this id
    /// * `Conflict` - register or email already used by another patient
    async fn update_patient(
        &self,
        patient_id: PatientId,
        patient: &NewPatient,
    ) -> RepositoryResult<Patient>;

    /// Delete a patient together with its general symptom reports and
    /// diagnosis instances (and their linked symptoms).
    ///
    /// Returns whether a row was removed.
    async fn delete_patient(&self, patient_id: PatientId) -> RepositoryResult<bool>;

    /// Patient core fields plus the raw aggregate name lists.
    ///
    /// # Errors
    /// * `NotFound` - no patient with this id
    async fn get_patient_summary(&self, patient_id: PatientId)
        -> RepositoryResult<PatientSummaryRow>;
}
