#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use patient_registry::api::{NewDisease, NewPatient, NewSymptom};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Fixtures ====================

/// A valid patient whose unique columns derive from `n`.
pub fn new_patient(n: u32) -> NewPatient {
    NewPatient {
        firstname: format!("First{}", n),
        lastname: format!("Last{}", n),
        register: format!("REG-{:04}", n),
        age: 30 + n as i32,
        gender: "F".to_string(),
        birthdate: None,
        address: None,
        phonenumber: format!("555-{:04}", n),
        email: format!("patient{}@example.org", n),
    }
}

pub fn new_symptom(name: &str) -> NewSymptom {
    NewSymptom {
        symptom_name: name.to_string(),
        symptom_description: None,
    }
}

pub fn new_disease(name: &str, code: &str) -> NewDisease {
    NewDisease {
        disease_name: name.to_string(),
        disease_code: code.to_string(),
        disease_description: None,
        disease_treatment: None,
    }
}

// ==================== HTTP helpers ====================

#[cfg(feature = "http-server")]
pub mod http {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use patient_registry::db::repository::FullRepository;
    use patient_registry::db::LocalRepository;
    use patient_registry::http::{create_router, AppState};
    use patient_registry::prediction::PredictionClient;

    /// Nothing listens on the discard port, so predict calls fail fast.
    pub const UNREACHABLE_MODEL_URL: &str = "http://127.0.0.1:9/predict";

    pub fn app_with(repo: LocalRepository, model_url: &str) -> Router {
        let repository = Arc::new(repo) as Arc<dyn FullRepository>;
        let predictor = PredictionClient::new(model_url).expect("prediction client");
        create_router(AppState::new(repository, predictor))
    }

    pub fn app(repo: LocalRepository) -> Router {
        app_with(repo, UNREACHABLE_MODEL_URL)
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub content_type: Option<String>,
        pub request_id: Option<String>,
        pub body: Vec<u8>,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap_or(Value::Null)
        }
    }

    pub async fn send_raw(router: &Router, method: Method, uri: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request");

        let response = router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header("content-type");
        let request_id = header("x-request-id");
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            content_type,
            request_id,
            body,
        }
    }

    pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let bytes = body.map(|v| v.to_string().into_bytes()).unwrap_or_default();
        send_raw(router, method, uri, bytes).await
    }

    pub async fn get(router: &Router, uri: &str) -> TestResponse {
        send(router, Method::GET, uri, None).await
    }

    pub async fn post(router: &Router, uri: &str, body: Value) -> TestResponse {
        send(router, Method::POST, uri, Some(body)).await
    }

    pub async fn put(router: &Router, uri: &str, body: Value) -> TestResponse {
        send(router, Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(router: &Router, uri: &str) -> TestResponse {
        send(router, Method::DELETE, uri, None).await
    }
}
