//! HTTP handlers for the REST API.
//!
//! Each handler parses path ids and the JSON body, delegates to the service
//! layer and maps the outcome onto a status code.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use super::dto::{
    DiseaseInstancePayload, DiseasePayload, HealthResponse, InstanceSymptomPayload,
    PaginationQuery, PatientPayload, PatientSymptomPayload, SymptomPayload,
};
use super::error::AppError;
use super::extract::PathParams;
use super::state::AppState;
use crate::api::*;
use crate::db::services as db_services;
use crate::prediction::validate_prediction_request;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a row.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn parse_id(raw: &str, what: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
}

/// Decode a JSON body, naming the offending field on failure.
fn decode_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, AppError> {
    let body = body?;
    let de = &mut serde_json::Deserializer::from_slice(&body);
    serde_path_to_error::deserialize(de).map_err(|e| {
        let path = e.path().to_string();
        if path == "." {
            AppError::BadRequest(format!("Invalid JSON body: {}", e.inner()))
        } else {
            AppError::BadRequest(format!("Invalid value for '{}': {}", path, e.inner()))
        }
    })
}

fn created<T>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Always 200; the body reports whether the store answered.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected",
        Ok(false) => "disconnected",
        Err(e) => {
            tracing::warn!(error = %e, "database health check failed");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
    })
}

// =============================================================================
// Patients
// =============================================================================

/// GET /patients?limit=&offset=
pub async fn list_patients(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> HandlerResult<Vec<Patient>> {
    // An unreadable query string falls back to the default window.
    let pairs = query.map(|Query(pairs)| pairs).unwrap_or_default();
    let page = PaginationQuery::from_pairs(&pairs).into();
    let patients = db_services::list_patients(state.repository.as_ref(), page)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to retrieve patients"))?;
    Ok(Json(patients))
}

/// POST /patients
pub async fn create_patient(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> CreatedResult<Patient> {
    let payload: PatientPayload = decode_body(body)?;
    let new_patient = payload.into_new_patient().map_err(AppError::BadRequest)?;
    let patient = db_services::create_patient(state.repository.as_ref(), &new_patient)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to create patient"))?;
    tracing::info!(patient_id = %patient.patient_id, "patient created");
    Ok(created(patient))
}

/// GET /patients/{id}
pub async fn get_patient(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<Patient> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let patient = db_services::get_patient(state.repository.as_ref(), patient_id)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to retrieve patient"))?;
    Ok(Json(patient))
}

/// PUT /patients/{id}
///
/// Full replace: optional fields left out of the body are cleared.
pub async fn update_patient(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult<Patient> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let payload: PatientPayload = decode_body(body)?;
    let changes = payload.into_new_patient().map_err(AppError::BadRequest)?;
    let patient = db_services::update_patient(state.repository.as_ref(), patient_id, &changes)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to update patient"))?;
    Ok(Json(patient))
}

/// DELETE /patients/{id}
pub async fn delete_patient(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> Result<StatusCode, AppError> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    db_services::delete_patient(state.repository.as_ref(), patient_id)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to delete patient"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /patients/{id}/details
pub async fn get_patient_details(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<PatientSummary> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let summary = db_services::get_patient_summary(state.repository.as_ref(), patient_id)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to retrieve patient details"))?;
    Ok(Json(summary))
}

// =============================================================================
// General symptom reports
// =============================================================================

/// GET /patients/{id}/general-symptoms
pub async fn list_patient_symptoms(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<Vec<PatientSymptomEntry>> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let reports = db_services::list_patient_symptoms(state.repository.as_ref(), patient_id)
        .await
        .map_err(|e| {
            AppError::from_store(e, "Patient", "Failed to retrieve patient symptoms")
        })?;
    Ok(Json(reports))
}

/// POST /patients/{id}/general-symptoms
pub async fn create_patient_symptom(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<Bytes, BytesRejection>,
) -> CreatedResult<PatientSymptom> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let payload: PatientSymptomPayload = decode_body(body)?;
    let report = payload
        .into_new_report(patient_id)
        .map_err(AppError::BadRequest)?;
    let stored = db_services::report_patient_symptom(state.repository.as_ref(), &report)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to report patient symptom"))?;
    Ok(created(stored))
}

/// DELETE /patient-symptoms/{id}
pub async fn delete_patient_symptom(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> Result<StatusCode, AppError> {
    let record_id = PatientSymptomId::new(parse_id(&id, "patient symptom")?);
    db_services::delete_patient_symptom(state.repository.as_ref(), record_id)
        .await
        .map_err(|e| {
            AppError::from_store(e, "Patient symptom", "Failed to delete patient symptom")
        })?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Diagnosis instances
// =============================================================================

/// GET /patients/{id}/disease-instances
pub async fn list_disease_instances(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<Vec<DiseaseInstanceEntry>> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let instances = db_services::list_disease_instances(state.repository.as_ref(), patient_id)
        .await
        .map_err(|e| {
            AppError::from_store(e, "Patient", "Failed to retrieve disease instances")
        })?;
    Ok(Json(instances))
}

/// POST /patients/{id}/disease-instances
pub async fn create_disease_instance(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<Bytes, BytesRejection>,
) -> CreatedResult<DiseaseInstance> {
    let patient_id = PatientId::new(parse_id(&id, "patient")?);
    let payload: DiseaseInstancePayload = decode_body(body)?;
    let instance = payload
        .into_new_instance(patient_id)
        .map_err(AppError::BadRequest)?;
    let stored = db_services::record_disease_instance(state.repository.as_ref(), &instance)
        .await
        .map_err(|e| AppError::from_store(e, "Patient", "Failed to record disease instance"))?;
    Ok(created(stored))
}

/// DELETE /disease-instances/{id}
pub async fn delete_disease_instance(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> Result<StatusCode, AppError> {
    let instance_id = DiseaseInstanceId::new(parse_id(&id, "disease instance")?);
    db_services::delete_disease_instance(state.repository.as_ref(), instance_id)
        .await
        .map_err(|e| {
            AppError::from_store(e, "Disease instance", "Failed to delete disease instance")
        })?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /disease-instances/{id}/symptoms
pub async fn list_instance_symptoms(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<Vec<LinkedSymptom>> {
    let instance_id = DiseaseInstanceId::new(parse_id(&id, "disease instance")?);
    let symptoms = db_services::list_instance_symptoms(state.repository.as_ref(), instance_id)
        .await
        .map_err(|e| {
            AppError::from_store(
                e,
                "Disease instance",
                "Failed to retrieve disease instance symptoms",
            )
        })?;
    Ok(Json(symptoms))
}

/// POST /disease-instances/{id}/symptoms
pub async fn link_instance_symptom(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<Bytes, BytesRejection>,
) -> CreatedResult<DiseaseInstanceSymptom> {
    let instance_id = DiseaseInstanceId::new(parse_id(&id, "disease instance")?);
    let payload: InstanceSymptomPayload = decode_body(body)?;
    let link = payload
        .into_new_link(instance_id)
        .map_err(AppError::BadRequest)?;
    let stored = db_services::link_instance_symptom(state.repository.as_ref(), &link)
        .await
        .map_err(|e| {
            AppError::from_store(e, "Disease instance", "Failed to link symptom")
        })?;
    Ok(created(stored))
}

/// DELETE /disease-instances/{id}/symptoms/{symptom_id}
pub async fn unlink_instance_symptom(
    State(state): State<AppState>,
    PathParams((id, symptom_id)): PathParams<(String, String)>,
) -> Result<StatusCode, AppError> {
    let instance_id = DiseaseInstanceId::new(parse_id(&id, "disease instance")?);
    let symptom_id = SymptomId::new(parse_id(&symptom_id, "symptom")?);
    db_services::unlink_instance_symptom(state.repository.as_ref(), instance_id, symptom_id)
        .await
        .map_err(|e| {
            AppError::from_store(e, "Disease instance", "Failed to unlink symptom")
        })?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Symptoms
// =============================================================================

/// GET /symptoms
pub async fn list_symptoms(State(state): State<AppState>) -> HandlerResult<Vec<Symptom>> {
    let symptoms = db_services::list_symptoms(state.repository.as_ref())
        .await
        .map_err(|e| AppError::from_store(e, "Symptom", "Failed to retrieve symptoms"))?;
    Ok(Json(symptoms))
}

/// POST /symptoms
pub async fn create_symptom(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> CreatedResult<Symptom> {
    let payload: SymptomPayload = decode_body(body)?;
    let new_symptom = payload.into_new_symptom().map_err(AppError::BadRequest)?;
    let symptom = db_services::create_symptom(state.repository.as_ref(), &new_symptom)
        .await
        .map_err(|e| AppError::from_store(e, "Symptom", "Failed to create symptom"))?;
    Ok(created(symptom))
}

/// GET /symptoms/{id}
pub async fn get_symptom(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<Symptom> {
    let symptom_id = SymptomId::new(parse_id(&id, "symptom")?);
    let symptom = db_services::get_symptom(state.repository.as_ref(), symptom_id)
        .await
        .map_err(|e| AppError::from_store(e, "Symptom", "Failed to retrieve symptom"))?;
    Ok(Json(symptom))
}

/// PUT /symptoms/{id}
pub async fn update_symptom(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult<Symptom> {
    let symptom_id = SymptomId::new(parse_id(&id, "symptom")?);
    let payload: SymptomPayload = decode_body(body)?;
    let changes = payload.into_new_symptom().map_err(AppError::BadRequest)?;
    let symptom = db_services::update_symptom(state.repository.as_ref(), symptom_id, &changes)
        .await
        .map_err(|e| AppError::from_store(e, "Symptom", "Failed to update symptom"))?;
    Ok(Json(symptom))
}

/// DELETE /symptoms/{id}
pub async fn delete_symptom(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> Result<StatusCode, AppError> {
    let symptom_id = SymptomId::new(parse_id(&id, "symptom")?);
    db_services::delete_symptom(state.repository.as_ref(), symptom_id)
        .await
        .map_err(|e| AppError::from_store(e, "Symptom", "Failed to delete symptom"))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Diseases
// =============================================================================

/// GET /diseases
pub async fn list_diseases(State(state): State<AppState>) -> HandlerResult<Vec<Disease>> {
    let diseases = db_services::list_diseases(state.repository.as_ref())
        .await
        .map_err(|e| AppError::from_store(e, "Disease", "Failed to retrieve diseases"))?;
    Ok(Json(diseases))
}

/// POST /diseases
pub async fn create_disease(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> CreatedResult<Disease> {
    let payload: DiseasePayload = decode_body(body)?;
    let new_disease = payload.into_new_disease().map_err(AppError::BadRequest)?;
    let disease = db_services::create_disease(state.repository.as_ref(), &new_disease)
        .await
        .map_err(|e| AppError::from_store(e, "Disease", "Failed to create disease"))?;
    Ok(created(disease))
}

/// GET /diseases/{id}
pub async fn get_disease(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> HandlerResult<Disease> {
    let disease_id = DiseaseId::new(parse_id(&id, "disease")?);
    let disease = db_services::get_disease(state.repository.as_ref(), disease_id)
        .await
        .map_err(|e| AppError::from_store(e, "Disease", "Failed to retrieve disease"))?;
    Ok(Json(disease))
}

/// PUT /diseases/{id}
pub async fn update_disease(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
    body: Result<Bytes, BytesRejection>,
) -> HandlerResult<Disease> {
    let disease_id = DiseaseId::new(parse_id(&id, "disease")?);
    let payload: DiseasePayload = decode_body(body)?;
    let changes = payload.into_new_disease().map_err(AppError::BadRequest)?;
    let disease = db_services::update_disease(state.repository.as_ref(), disease_id, &changes)
        .await
        .map_err(|e| AppError::from_store(e, "Disease", "Failed to update disease"))?;
    Ok(Json(disease))
}

/// DELETE /diseases/{id}
///
/// 409 while diagnosis instances still reference the disease.
pub async fn delete_disease(
    State(state): State<AppState>,
    PathParams(id): PathParams<String>,
) -> Result<StatusCode, AppError> {
    let disease_id = DiseaseId::new(parse_id(&id, "disease")?);
    db_services::delete_disease(state.repository.as_ref(), disease_id)
        .await
        .map_err(|e| AppError::from_store(e, "Disease", "Failed to delete disease"))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Prediction proxy
// =============================================================================

/// POST /predict
///
/// Forwards the raw body to the prediction service and relays its reply.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let body = body.map_err(|e| {
        tracing::error!(error = %e, "failed to read predict request body");
        AppError::Internal("Could not read request body".to_string())
    })?;

    validate_prediction_request(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let upstream = state.predictor.forward(body).await?;
    let status = StatusCode::from_u16(upstream.status).map_err(|_| {
        tracing::error!(status = upstream.status, "prediction service sent invalid status");
        AppError::BadGateway("Invalid response from prediction service".to_string())
    })?;

    Ok((
        status,
        [(header::CONTENT_TYPE, upstream.content_type)],
        upstream.body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_i32_only() {
        assert_eq!(parse_id("42", "patient").unwrap(), 42);
        assert!(parse_id("abc", "patient").is_err());
        assert!(parse_id("2147483648", "patient").is_err());
        assert!(parse_id("", "patient").is_err());
    }

    #[test]
    fn test_decode_body_names_field() {
        let err = decode_body::<PatientPayload>(Ok(Bytes::from_static(br#"{"age":"old"}"#))).unwrap_err();
        assert!(err.message().contains("age"), "{}", err.message());
    }

    #[test]
    fn test_decode_body_rejects_garbage() {
        let err = decode_body::<SymptomPayload>(Ok(Bytes::from_static(b"not json"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
