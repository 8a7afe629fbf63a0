//! Repository trait definitions for database operations.
//!
//! Responsibilities are split across focused traits so each backend can be
//! implemented and tested piecewise:
//!
//! - [`error`]: Error types for repository operations
//! - [`patient`]: Health check, patient CRUD and the patient summary
//! - [`catalog`]: Symptom and disease definitions
//! - [`relationship`]: General symptom reports, diagnosis instances and the
//!   symptoms linked to each diagnosis
//!
//! # Convenience Trait Bound
//!
//! Code that needs every capability should take a [`FullRepository`]:
//!
//! ```ignore
//! async fn register<R: FullRepository + ?Sized>(repo: &R, p: &NewPatient) -> RepositoryResult<()> {
//!     let patient = repo.create_patient(p).await?;
//!     let _ = repo.list_patient_symptoms(patient.patient_id).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod patient;
pub mod relationship;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use catalog::CatalogRepository;
pub use patient::PatientRepository;
pub use relationship::RelationshipRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all three
/// repository traits.
pub trait FullRepository: PatientRepository + CatalogRepository + RelationshipRepository {}

impl<T> FullRepository for T where T: PatientRepository + CatalogRepository + RelationshipRepository
{}
