//! End-to-end tests for the HTTP routes over the in-memory repository.

#![cfg(feature = "http-server")]

mod support;

use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

use patient_registry::db::LocalRepository;
use patient_registry::http::router::MAX_BODY_BYTES;
use support::http::{app, delete, get, post, put, send_raw};

fn patient_body(n: u32) -> Value {
    json!({
        "firstname": format!("First{}", n),
        "lastname": format!("Last{}", n),
        "register": format!("REG-{:04}", n),
        "age": 40,
        "gender": "M",
        "phonenumber": format!("555-{:04}", n),
        "email": format!("patient{}@example.org", n),
    })
}

async fn create_patient(router: &Router, n: u32) -> i64 {
    let res = post(router, "/patients", patient_body(n)).await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.json()["patient_id"].as_i64().expect("patient_id")
}

async fn create_symptom(router: &Router, name: &str) -> i64 {
    let res = post(router, "/symptoms", json!({ "symptom_name": name })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.json()["symptom_id"].as_i64().expect("symptom_id")
}

async fn create_disease(router: &Router, name: &str, code: &str) -> i64 {
    let res = post(
        router,
        "/diseases",
        json!({ "disease_name": name, "disease_code": code }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    res.json()["disease_id"].as_i64().expect("disease_id")
}

// ==================== Health ====================

#[tokio::test]
async fn test_health_connected() {
    let router = app(LocalRepository::new());
    let res = get(&router, "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"status": "ok", "database": "connected"}));
}

#[tokio::test]
async fn test_health_reports_unreachable_store_with_200() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    let router = app(repo);
    let res = get(&router, "/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["database"], "disconnected");
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let router = app(LocalRepository::new());
    let res = get(&router, "/health").await;
    let id = res.request_id.expect("x-request-id header");
    assert!(!id.is_empty());
}

// ==================== Patients ====================

#[tokio::test]
async fn test_patient_crud_roundtrip() {
    let router = app(LocalRepository::new());

    let mut body = patient_body(1);
    body["birthdate"] = json!("1990-05-17");
    let res = post(&router, "/patients", body).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let created = res.json();
    assert_eq!(created["patient_id"], 1);
    assert_eq!(created["birthdate"], "1990-05-17");
    assert_eq!(created["address"], Value::Null);

    let res = get(&router, "/patients/1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), created);

    let mut replacement = patient_body(1);
    replacement["firstname"] = json!("Ada");
    replacement["birthdate"] = json!("");
    let res = put(&router, "/patients/1", replacement).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["firstname"], "Ada");
    assert_eq!(res.json()["birthdate"], Value::Null);

    let res = delete(&router, "/patients/1").await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());

    let res = get(&router, "/patients/1").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"error": "Patient not found"}));
}

#[tokio::test]
async fn test_empty_optional_text_is_stored_as_null() {
    let router = app(LocalRepository::new());

    let mut body = patient_body(1);
    body["address"] = json!("");
    let res = post(&router, "/patients", body).await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["address"], Value::Null);

    let res = post(
        &router,
        "/symptoms",
        json!({ "symptom_name": "Fever", "symptom_description": "" }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["symptom_description"], Value::Null);

    let res = post(
        &router,
        "/diseases",
        json!({ "disease_name": "Influenza", "disease_code": "J10", "disease_description": "" }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["disease_description"], Value::Null);
}

#[tokio::test]
async fn test_list_patients_pagination() {
    let router = app(LocalRepository::new());
    for n in 1..=12 {
        create_patient(&router, n).await;
    }

    let ids = |v: Value| -> Vec<i64> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|p| p["patient_id"].as_i64().unwrap())
            .collect()
    };

    let res = get(&router, "/patients?limit=2&offset=1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(ids(res.json()), vec![2, 3]);

    // Defaults: limit 10, offset 0.
    let res = get(&router, "/patients").await;
    assert_eq!(ids(res.json()), (1..=10i64).collect::<Vec<_>>());

    for query in ["limit=0", "limit=-3", "limit=abc", "offset=-1"] {
        let res = get(&router, &format!("/patients?{}", query)).await;
        assert_eq!(res.status, StatusCode::OK, "{}", query);
        assert_eq!(ids(res.json()), (1..=10i64).collect::<Vec<_>>(), "{}", query);
    }

    let res = get(&router, "/patients?offset=10").await;
    assert_eq!(ids(res.json()), vec![11, 12]);
}

#[tokio::test]
async fn test_list_patients_odd_query_strings_use_defaults() {
    let router = app(LocalRepository::new());
    for n in 1..=3 {
        create_patient(&router, n).await;
    }

    // Repeated keys: the first value counts.
    let res = get(&router, "/patients?limit=1&limit=2").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json().as_array().map(Vec::len), Some(1));

    for query in ["limit=%202", "limit=2%20", "offset", "limit=&offset=", "%FF=1"] {
        let res = get(&router, &format!("/patients?{}", query)).await;
        assert_eq!(res.status, StatusCode::OK, "{}", query);
        assert_eq!(res.json().as_array().map(Vec::len), Some(3), "{}", query);
    }
}

#[tokio::test]
async fn test_oversized_body_is_413_json() {
    let router = app(LocalRepository::new());
    let body = vec![b' '; MAX_BODY_BYTES + 1];
    let res = send_raw(&router, Method::POST, "/patients", body).await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(res.content_type.as_deref(), Some("application/json"));
    assert_eq!(res.json()["error"], "Request body too large");
}

#[tokio::test]
async fn test_undecodable_path_segment_is_400_json() {
    let router = app(LocalRepository::new());
    let res = get(&router, "/patients/%FF").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.content_type.as_deref(), Some("application/json"));
    assert!(res.json()["error"]
        .as_str()
        .is_some_and(|msg| msg.starts_with("Invalid path")));
}

#[tokio::test]
async fn test_create_patient_missing_fields() {
    let router = app(LocalRepository::new());
    let res = post(&router, "/patients", json!({ "firstname": "Solo" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Missing required fields: lastname, register, age, gender, phonenumber, email"
    );
}

#[tokio::test]
async fn test_create_patient_bad_birthdate() {
    let router = app(LocalRepository::new());
    let mut body = patient_body(1);
    body["birthdate"] = json!("17/05/1990");
    let res = post(&router, "/patients", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Invalid birthdate format (use YYYY-MM-DD)"
    );
}

#[tokio::test]
async fn test_create_patient_rejects_negative_age() {
    let router = app(LocalRepository::new());
    let mut body = patient_body(1);
    body["age"] = json!(-1);
    let res = post(&router, "/patients", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_patient_malformed_json() {
    let router = app(LocalRepository::new());
    let res = send_raw(&router, Method::POST, "/patients", b"{not json".to_vec()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());
}

#[tokio::test]
async fn test_duplicate_patient_conflict() {
    let router = app(LocalRepository::new());
    create_patient(&router, 1).await;
    let res = post(&router, "/patients", patient_body(1)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_and_unknown_patient_ids() {
    let router = app(LocalRepository::new());

    let res = get(&router, "/patients/abc").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Invalid patient ID");

    let res = put(&router, "/patients/77", patient_body(1)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // Deleting a missing row is not an error.
    let res = delete(&router, "/patients/77").await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

// ==================== Patient details ====================

#[tokio::test]
async fn test_patient_details_lists() {
    let router = app(LocalRepository::new());
    let patient = create_patient(&router, 1).await;
    let fever = create_symptom(&router, "Fever").await;
    let cough = create_symptom(&router, "Cough").await;
    let flu = create_disease(&router, "Influenza", "J10").await;

    for symptom in [fever, cough] {
        let res = post(
            &router,
            &format!("/patients/{}/general-symptoms", patient),
            json!({ "symptom_id": symptom }),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    for _ in 0..2 {
        let res = post(
            &router,
            &format!("/patients/{}/disease-instances", patient),
            json!({ "disease_id": flu }),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = get(&router, &format!("/patients/{}/details", patient)).await;
    assert_eq!(res.status, StatusCode::OK);
    let details = res.json();
    assert_eq!(details["email"], "patient1@example.org");
    assert_eq!(details["general_symptoms_list"], json!(["Fever", "Cough"]));
    assert_eq!(details["distinct_diseases_list"], json!(["Influenza"]));
}

#[tokio::test]
async fn test_patient_details_empty_lists() {
    let router = app(LocalRepository::new());
    let patient = create_patient(&router, 1).await;
    let res = get(&router, &format!("/patients/{}/details", patient)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["general_symptoms_list"], json!([]));
    assert_eq!(res.json()["distinct_diseases_list"], json!([]));

    let res = get(&router, "/patients/99/details").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

// ==================== Symptoms & diseases ====================

#[tokio::test]
async fn test_symptom_crud() {
    let router = app(LocalRepository::new());

    let res = post(&router, "/symptoms", json!({ "symptom_description": "no name" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Missing required field: symptom_name");

    let id = create_symptom(&router, "Headache").await;
    let res = post(&router, "/symptoms", json!({ "symptom_name": "Headache" })).await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = put(
        &router,
        &format!("/symptoms/{}", id),
        json!({ "symptom_name": "Migraine", "symptom_description": "Severe" }),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["symptom_name"], "Migraine");

    let res = get(&router, "/symptoms").await;
    assert_eq!(res.json().as_array().unwrap().len(), 1);

    let res = delete(&router, &format!("/symptoms/{}", id)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = get(&router, &format!("/symptoms/{}", id)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "Symptom not found");
}

#[tokio::test]
async fn test_update_unknown_catalog_id_is_404_even_with_taken_name() {
    let router = app(LocalRepository::new());
    create_symptom(&router, "Fever").await;
    create_disease(&router, "Influenza", "J10").await;

    let res = put(&router, "/symptoms/999", json!({ "symptom_name": "Fever" })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "Symptom not found");

    let res = put(
        &router,
        "/diseases/999",
        json!({ "disease_name": "Influenza", "disease_code": "J10" }),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "Disease not found");
}

#[tokio::test]
async fn test_disease_treatment_handling() {
    let router = app(LocalRepository::new());

    let res = post(
        &router,
        "/diseases",
        json!({
            "disease_name": "Influenza",
            "disease_code": "J10",
            "disease_treatment": "{\"drug\": \"oseltamivir\"}",
        }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["disease_treatment"], json!({"drug": "oseltamivir"}));

    let res = post(
        &router,
        "/diseases",
        json!({
            "disease_name": "Asthma",
            "disease_code": "J45",
            "disease_treatment": {"inhaler": true},
        }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["disease_treatment"], json!({"inhaler": true}));

    let res = post(
        &router,
        "/diseases",
        json!({
            "disease_name": "Broken",
            "disease_code": "X00",
            "disease_treatment": "{not json",
        }),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Invalid JSON format for disease_treatment"
    );

    let res = get(&router, "/diseases").await;
    assert_eq!(res.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_disease_missing_fields() {
    let router = app(LocalRepository::new());
    let res = post(&router, "/diseases", json!({ "disease_name": "Nameless" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()["error"],
        "Missing required fields: disease_name, disease_code"
    );
}

#[tokio::test]
async fn test_referenced_disease_cannot_be_deleted() {
    let router = app(LocalRepository::new());
    let patient = create_patient(&router, 1).await;
    let flu = create_disease(&router, "Influenza", "J10").await;
    let res = post(
        &router,
        &format!("/patients/{}/disease-instances", patient),
        json!({ "disease_id": flu }),
    )
    .await;
    let instance = res.json()["patient_disease_id"].as_i64().unwrap();

    let res = delete(&router, &format!("/diseases/{}", flu)).await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = delete(&router, &format!("/disease-instances/{}", instance)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = delete(&router, &format!("/diseases/{}", flu)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

// ==================== Junctions ====================

#[tokio::test]
async fn test_general_symptom_reports() {
    let router = app(LocalRepository::new());
    let patient = create_patient(&router, 1).await;
    let fever = create_symptom(&router, "Fever").await;
    let uri = format!("/patients/{}/general-symptoms", patient);

    let res = post(&router, &uri, json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Missing or invalid symptom_id");

    let res = post(&router, &uri, json!({ "symptom_id": 999 })).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = post(
        &router,
        &uri,
        json!({ "symptom_id": fever, "reported_date": "2024-02-29" }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let report_id = res.json()["id"].as_i64().unwrap();

    let res = get(&router, &uri).await;
    assert_eq!(res.status, StatusCode::OK);
    let entries = res.json();
    assert_eq!(entries[0]["symptom_name"], "Fever");
    assert_eq!(entries[0]["reported_date"], "2024-02-29");

    let res = delete(&router, &format!("/patient-symptoms/{}", report_id)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(get(&router, &uri).await.json(), json!([]));
}

#[tokio::test]
async fn test_reports_for_unknown_patient() {
    let router = app(LocalRepository::new());
    let fever = create_symptom(&router, "Fever").await;

    let res = get(&router, "/patients/42/general-symptoms").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!([]));

    let res = post(
        &router,
        "/patients/42/general-symptoms",
        json!({ "symptom_id": fever }),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disease_instance_symptom_links() {
    let router = app(LocalRepository::new());
    let patient = create_patient(&router, 1).await;
    let cough = create_symptom(&router, "Cough").await;
    let flu = create_disease(&router, "Influenza", "J10").await;

    let res = post(
        &router,
        &format!("/patients/{}/disease-instances", patient),
        json!({ "disease_id": flu, "diagnosis_date": "2024-01-15", "notes": "mild" }),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let instance = res.json()["patient_disease_id"].as_i64().unwrap();

    let res = get(&router, &format!("/patients/{}/disease-instances", patient)).await;
    let entries = res.json();
    assert_eq!(entries[0]["disease_name"], "Influenza");
    assert_eq!(entries[0]["disease_code"], "J10");
    assert_eq!(entries[0]["notes"], "mild");

    let links = format!("/disease-instances/{}/symptoms", instance);
    let res = post(&router, &links, json!({ "symptom_id": cough })).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let res = post(&router, &links, json!({ "symptom_id": cough })).await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = get(&router, &links).await;
    assert_eq!(res.json()[0]["symptom_name"], "Cough");

    let res = delete(&router, &format!("{}/{}", links, cough)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(get(&router, &links).await.json(), json!([]));
}

#[tokio::test]
async fn test_instance_for_unknown_disease() {
    let router = app(LocalRepository::new());
    let patient = create_patient(&router, 1).await;
    let res = post(
        &router,
        &format!("/patients/{}/disease-instances", patient),
        json!({ "disease_id": 5 }),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = post(
        &router,
        &format!("/patients/{}/disease-instances", patient),
        json!({ "disease_id": 0 }),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Missing or invalid disease_id");
}

#[tokio::test]
async fn test_deleting_patient_removes_its_reports() {
    let repo = LocalRepository::new();
    let router = app(repo.clone());
    let patient = create_patient(&router, 1).await;
    let fever = create_symptom(&router, "Fever").await;
    post(
        &router,
        &format!("/patients/{}/general-symptoms", patient),
        json!({ "symptom_id": fever }),
    )
    .await;
    assert_eq!(repo.patient_symptom_count(), 1);

    let res = delete(&router, &format!("/patients/{}", patient)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert_eq!(repo.patient_symptom_count(), 0);
}

#[tokio::test]
async fn test_store_outage_maps_to_500() {
    let repo = LocalRepository::new();
    let router = app(repo.clone());
    repo.set_healthy(false);
    let res = get(&router, "/patients").await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["error"], "Failed to retrieve patients");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let router = app(LocalRepository::new());
    let res = get(&router, "/nope").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
