//! Symptom and disease catalog entries.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{DiseaseId, SymptomId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub symptom_id: SymptomId,
    pub symptom_name: String,
    pub symptom_description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSymptom {
    pub symptom_name: String,
    pub symptom_description: Option<String>,
}

/// A disease definition.
///
/// `disease_treatment` is an opaque JSON document: it is validated for
/// well-formedness on the way in and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub disease_id: DiseaseId,
    pub disease_name: String,
    pub disease_code: String,
    pub disease_description: Option<String>,
    pub disease_treatment: Option<Value>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDisease {
    pub disease_name: String,
    pub disease_code: String,
    pub disease_description: Option<String>,
    pub disease_treatment: Option<Value>,
}

/// A treatment payload that is not well-formed JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid JSON format for disease_treatment: {reason}")]
pub struct TreatmentFormatError {
    pub reason: String,
}

/// Normalize an incoming treatment value.
///
/// `null` and the empty string mean "no treatment". Any other JSON string is
/// taken as a stringified document and must itself parse as JSON; the parsed
/// document is what gets stored. Objects, arrays, numbers and booleans pass
/// through unchanged.
pub fn normalize_treatment(
    value: Option<Value>,
) -> Result<Option<Value>, TreatmentFormatError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => {
            if raw.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str::<Value>(&raw)
                .map(Some)
                .map_err(|e| TreatmentFormatError {
                    reason: e.to_string(),
                })
        }
        Some(other) => Ok(Some(other)),
    }
}
