//! Router configuration for the HTTP API.
//!
//! Sets up all routes plus middleware: request ids, tracing, panic recovery,
//! CORS and a body size limit. Responses are not compressed so the predict
//! relay stays byte-exact.

use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::HeaderName,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::error::AppError;
use super::handlers;
use super::state::AppState;

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    AppError::Internal("Internal server error".to_string()).into_response()
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/health", get(handlers::health_check))
        // Patients
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/{id}",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route("/patients/{id}/details", get(handlers::get_patient_details))
        // General symptom reports
        .route(
            "/patients/{id}/general-symptoms",
            get(handlers::list_patient_symptoms).post(handlers::create_patient_symptom),
        )
        .route(
            "/patient-symptoms/{id}",
            delete(handlers::delete_patient_symptom),
        )
        // Diagnosis instances
        .route(
            "/patients/{id}/disease-instances",
            get(handlers::list_disease_instances).post(handlers::create_disease_instance),
        )
        .route(
            "/disease-instances/{id}",
            delete(handlers::delete_disease_instance),
        )
        .route(
            "/disease-instances/{id}/symptoms",
            get(handlers::list_instance_symptoms).post(handlers::link_instance_symptom),
        )
        .route(
            "/disease-instances/{id}/symptoms/{symptom_id}",
            delete(handlers::unlink_instance_symptom),
        )
        // Catalog
        .route(
            "/symptoms",
            get(handlers::list_symptoms).post(handlers::create_symptom),
        )
        .route(
            "/symptoms/{id}",
            get(handlers::get_symptom)
                .put(handlers::update_symptom)
                .delete(handlers::delete_symptom),
        )
        .route(
            "/diseases",
            get(handlers::list_diseases).post(handlers::create_disease),
        )
        .route(
            "/diseases/{id}",
            get(handlers::get_disease)
                .put(handlers::update_disease)
                .delete(handlers::delete_disease),
        )
        // Prediction proxy
        .route("/predict", post(handlers::predict))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(trace)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
