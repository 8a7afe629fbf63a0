//! Public API surface for the Rust backend.
//!
//! Typed identifiers for every table plus re-exports of the domain types
//! returned by the repository and HTTP layers.

pub use crate::models::{
    Disease, DiseaseInstance, DiseaseInstanceEntry, DiseaseInstanceSymptom, LinkedSymptom,
    NewDisease, NewDiseaseInstance, NewDiseaseInstanceSymptom, NewPatient, NewPatientSymptom,
    NewSymptom, Pagination, Patient, PatientSummary, PatientSummaryRow, PatientSymptom,
    PatientSymptomEntry, Symptom,
};

use crate::define_id_type;

define_id_type!(i32, PatientId);
define_id_type!(i32, SymptomId);
define_id_type!(i32, DiseaseId);
define_id_type!(i32, PatientSymptomId);
define_id_type!(i32, DiseaseInstanceId);
define_id_type!(i32, DiseaseInstanceSymptomId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_through_inner() {
        let id = PatientId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(PatientId::from(42), id);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(DiseaseInstanceId::new(7).to_string(), "7");
    }

    #[test]
    fn test_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&SymptomId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: SymptomId = serde_json::from_str("3").unwrap();
        assert_eq!(back, SymptomId::new(3));
    }
}
