//! Integration tests for the clinical record API.
//!
//! These tests drive the full Axum router (middleware included) through
//! `tower::ServiceExt::oneshot`, with in-memory stand-ins for the patient
//! store and the FHIR server.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use hcd_core::{Demographics, FhirPatient, Patient, to_fhir};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use hcd_server::auth::{ClaimSet, TokenService};
use hcd_server::config::Config;
use hcd_server::db::{PatientFilter, PatientStore, PgPatientStore, StorageError, create_pool};
use hcd_server::fhir::{
    ConnectionStatus, CreatedPatient, FhirClientError, FhirGateway, UpdatedPatient,
};
use hcd_server::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEST_SECRET: &str = "test-secret-key";

/// In-memory patient table
#[derive(Default)]
struct MemoryStore {
    patients: Vec<Patient>,
    unreachable: bool,
    calls: AtomicUsize,
}

impl MemoryStore {
    fn with_patients(patients: Vec<Patient>) -> Self {
        Self {
            patients,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(StorageError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn ping(&self) -> Result<(), StorageError> {
        self.check()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Patient>, StorageError> {
        self.check()?;
        Ok(self.patients.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Patient>, StorageError> {
        self.check()?;
        let mut sorted = self.patients.clone();
        sorted.sort_by_key(|p| p.id);
        Ok(sorted
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn search(&self, filter: &PatientFilter) -> Result<Vec<Patient>, StorageError> {
        self.check()?;
        let name = filter.name.as_deref().map(str::to_lowercase);
        Ok(self
            .patients
            .iter()
            .filter(|p| {
                name.as_deref().is_none_or(|n| {
                    p.demographics.given_name.to_lowercase().contains(n)
                        || p.demographics.family_name.to_lowercase().contains(n)
                })
            })
            .filter(|p| {
                filter
                    .document
                    .as_deref()
                    .is_none_or(|d| p.demographics.document_id == d)
            })
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }
}

/// FHIR server stand-in that keeps created resources in memory
#[derive(Default)]
struct FakeFhir {
    resources: Mutex<HashMap<String, FhirPatient>>,
    failure: Option<String>,
    creates: AtomicUsize,
}

impl FakeFhir {
    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn fail(&self) -> Result<(), FhirClientError> {
        match &self.failure {
            Some(msg) => Err(FhirClientError::Failure(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FhirGateway for FakeFhir {
    async fn create(&self, record: &Demographics) -> Result<CreatedPatient, FhirClientError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.fail()?;
        let mut resources = self.resources.lock().unwrap();
        let fhir_id = format!("{}", 1000 + resources.len());
        let mut resource = to_fhir(record);
        resource.id = Some(fhir_id.clone());
        let data = serde_json::to_value(&resource).unwrap();
        resources.insert(fhir_id.clone(), resource);
        Ok(CreatedPatient { fhir_id, data })
    }

    async fn get(&self, fhir_id: &str) -> Result<FhirPatient, FhirClientError> {
        self.fail()?;
        self.resources
            .lock()
            .unwrap()
            .get(fhir_id)
            .cloned()
            .ok_or_else(|| FhirClientError::NotFound(format!("FHIR Patient {} not found", fhir_id)))
    }

    async fn update(
        &self,
        fhir_id: &str,
        record: &Demographics,
    ) -> Result<UpdatedPatient, FhirClientError> {
        self.fail()?;
        let mut resource = to_fhir(record);
        resource.id = Some(fhir_id.to_string());
        let data = serde_json::to_value(&resource).unwrap();
        self.resources
            .lock()
            .unwrap()
            .insert(fhir_id.to_string(), resource);
        Ok(UpdatedPatient { data })
    }

    async fn search(&self, params: &[(String, String)]) -> Result<Vec<FhirPatient>, FhirClientError> {
        self.fail()?;
        let family = params
            .iter()
            .find(|(k, _)| k == "family")
            .map(|(_, v)| v.clone());
        let mut found: Vec<FhirPatient> = self
            .resources
            .lock()
            .unwrap()
            .values()
            .filter(|r| {
                family
                    .as_deref()
                    .is_none_or(|f| r.name.first().and_then(|n| n.family.as_deref()) == Some(f))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn test_connection(&self) -> ConnectionStatus {
        ConnectionStatus {
            status: "connected".into(),
            server: "memory://fhir".into(),
            fhir_version: Some("4.0.1".into()),
            error: None,
        }
    }
}

fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("SECRET_KEY".to_string(), TEST_SECRET.to_string()),
        ("RATE_LIMIT_RPS".to_string(), "1000".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|name| vars.get(name).cloned()).expect("valid test config")
}

fn patient(id: i64, document: &str, given: &str, family: &str) -> Patient {
    Patient {
        id,
        demographics: Demographics {
            document_id: document.to_string(),
            given_name: given.to_string(),
            family_name: family.to_string(),
            birth_date: Some("1990-05-15".to_string()),
            phone: Some("3001234567".to_string()),
            address: Some("Calle 10 # 5-20".to_string()),
            email: Some(format!("{}@example.org", given.to_lowercase())),
            gender: None,
        },
    }
}

fn sample_patients() -> Vec<Patient> {
    vec![
        patient(42, "1010", "Ana", "Rojas"),
        patient(3, "0077", "Luis", "Perez"),
        patient(17, "2020", "Maria", "Rojas"),
    ]
}

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    fhir: Arc<FakeFhir>,
    tokens: TokenService,
}

fn build(store: MemoryStore, fhir: FakeFhir, config: &Config) -> TestApp {
    let store = Arc::new(store);
    let fhir = Arc::new(fhir);
    let state = AppState::new(store.clone(), fhir.clone(), config.paging);
    TestApp {
        router: hcd_server::build_app(state, config),
        store,
        fhir,
        tokens: TokenService::new(&config.auth),
    }
}

fn test_app() -> TestApp {
    build(
        MemoryStore::with_patients(sample_patients()),
        FakeFhir::default(),
        &test_config(&[]),
    )
}

impl TestApp {
    fn token(&self) -> String {
        self.tokens
            .issue(ClaimSet::new("admin", "admin"))
            .unwrap()
            .token
    }

    /// Send a request and return (status, body as JSON).
    async fn request(&self, req: Request<Body>) -> (StatusCode, JsonValue) {
        let response = self.router.clone().oneshot(req).await.expect("Request failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        (status, body)
    }

    /// Build an authenticated GET request.
    fn get(&self, uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token()))
            .body(Body::empty())
            .unwrap()
    }

    /// Build an authenticated request with a JSON body.
    fn send_json(&self, method: &str, uri: &str, body: JsonValue) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token()))
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }
}

fn anonymous(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn login(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({"username": username, "password": password});
    Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// A local port with nothing listening on it.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ---------------------------------------------------------------------------
// Public routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_root() {
    let app = test_app();
    let (status, body) = app.request(anonymous("GET", "/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = app.request(anonymous("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let store = MemoryStore {
        unreachable: true,
        ..MemoryStore::default()
    };
    let app = build(store, FakeFhir::default(), &test_config(&[]));

    let (status, body) = app.request(anonymous("GET", "/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["detail"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_health_with_unreachable_postgres() {
    let port = closed_port().to_string();
    let config = test_config(&[
        ("POSTGRES_HOST", "127.0.0.1"),
        ("POSTGRES_PORT", port.as_str()),
        ("DB_CONNECT_TIMEOUT", "2"),
    ]);
    let pool = create_pool(&config.database).unwrap();
    let state = AppState::new(
        Arc::new(PgPatientStore::new(pool)),
        Arc::new(FakeFhir::default()),
        config.paging,
    );
    let router = hcd_server::build_app(state, &config);

    let response = router.oneshot(anonymous("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Database connection failed")
    );
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = test_app();

    let req = Request::builder()
        .uri("/")
        .header("X-Request-ID", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.headers()["X-Request-ID"], "abc-123");

    let response = app.router.clone().oneshot(anonymous("GET", "/")).await.unwrap();
    let generated = response.headers()["X-Request-ID"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = test_app();

    let (status, body) = app.request(login("admin", "admin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 30 * 60);

    let token = body["access_token"].as_str().unwrap();
    let req = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, me) = app.request(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["sub"], "admin");
    assert_eq!(me["role"], "admin");
    assert!(me["exp"].as_i64().unwrap() > Utc::now().timestamp());
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(login("admin", "wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn test_missing_header_is_401_not_403() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(anonymous("GET", "/pacientes"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"], "missing header");
}

#[tokio::test]
async fn test_rejected_credentials_never_reach_storage() {
    let app = test_app();

    let basic = Request::builder()
        .uri("/paciente/42")
        .header(header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4=")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.request(basic).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "invalid scheme");

    let empty = Request::builder()
        .uri("/paciente/42")
        .header(header::AUTHORIZATION, "Bearer ")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.request(empty).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "missing token");

    let forged = TokenService::new(&test_config(&[("SECRET_KEY", "someone-else")]).auth)
        .issue(ClaimSet::new("admin", "admin"))
        .unwrap();
    let req = Request::builder()
        .uri("/paciente/42")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged.token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.request(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "invalid token");

    assert_eq!(app.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token() {
    let app = test_app();
    let stale = app
        .tokens
        .issue_at(
            ClaimSet::new("admin", "admin"),
            Utc::now() - Duration::minutes(31),
        )
        .unwrap();

    let req = Request::builder()
        .uri("/pacientes")
        .header(header::AUTHORIZATION, format!("Bearer {}", stale.token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.request(req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "token expired");
}

#[tokio::test]
async fn test_rate_limit_applies_to_protected_routes() {
    let app = build(
        MemoryStore::with_patients(sample_patients()),
        FakeFhir::default(),
        &test_config(&[("RATE_LIMIT_RPS", "1")]),
    );

    let (first, _) = app.request(app.get("/pacientes")).await;
    let (second, _) = app.request(app.get("/pacientes")).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);

    // Public routes are not limited
    let (status, _) = app.request(anonymous("GET", "/")).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_read_patient() {
    let app = test_app();

    let (status, body) = app.request(app.get("/paciente/42")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 42);
    assert_eq!(body["documento_id"], "1010");
    assert_eq!(body["nombre"], "Ana");
    assert_eq!(body["apellido"], "Rojas");
    assert_eq!(body["fecha_nacimiento"], "1990-05-15");
    assert_eq!(body["correo"], "ana@example.org");

    let (status, body) = app.request(app.get("/paciente/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("9999"));
}

#[tokio::test]
async fn test_list_patients_in_id_order() {
    let app = test_app();

    let (status, body) = app.request(app.get("/pacientes")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 17, 42]);

    let (status, body) = app.request(app.get("/pacientes?limit=1&offset=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 17);
}

#[tokio::test]
async fn test_list_rejects_bad_paging() {
    let app = test_app();

    let (status, _) = app.request(app.get("/pacientes?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(app.get("/pacientes?offset=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_patients() {
    let app = test_app();

    let (status, body) = app.request(app.get("/pacientes/buscar?nombre=rojas")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app
        .request(app.get("/pacientes/buscar?nombre=rojas&documento=2020"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["nombre"], "Maria");

    let (status, body) = app.request(app.get("/pacientes/buscar?documento=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_storage_outage_on_protected_route() {
    let store = MemoryStore {
        unreachable: true,
        ..MemoryStore::default()
    };
    let app = build(store, FakeFhir::default(), &test_config(&[]));

    let (status, body) = app.request(app.get("/paciente/1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_malformed_path_and_query_get_json_detail() {
    let app = test_app();

    let (status, body) = app.request(app.get("/paciente/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("abc"));

    let (status, body) = app.request(app.get("/pacientes?limit=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = app
        .request(app.send_json("POST", "/fhir/pacientes/abc", JsonValue::Null))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_malformed_bodies_get_json_detail() {
    let app = test_app();

    let wrong_type = Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username": 1}"#))
        .unwrap();
    let (status, body) = app.request(wrong_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/token")
        .body(Body::from(r#"{"username": "admin", "password": "admin"}"#))
        .unwrap();
    let (status, body) = app.request(no_content_type).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let truncated = Request::builder()
        .method("PUT")
        .uri("/fhir/Patient/1000")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token()))
        .body(Body::from(r#"{"nombre": "#))
        .unwrap();
    let (status, body) = app.request(truncated).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_metrics_label_routes_not_raw_paths() {
    let app = test_app();

    app.request(app.get("/paciente/42")).await;
    let (status, _) = app.request(anonymous("GET", "/wp-admin/setup-config.php")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(anonymous("GET", "/metrics"))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains(r#"route="/paciente/{id}""#));
    assert!(text.contains(r#"route="unmatched""#));
    assert!(!text.contains("wp-admin"));
    assert!(!text.contains("/paciente/42"));
}

// ---------------------------------------------------------------------------
// FHIR
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fhir_export_read_update_search() {
    let app = test_app();

    let (status, created) = app
        .request(app.send_json("POST", "/fhir/pacientes/42", JsonValue::Null))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let fhir_id = created["fhir_id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["identifier"][0]["value"], "1010");
    assert_eq!(created["data"]["gender"], "unknown");

    let (status, linked) = app.request(app.get(&format!("/fhir/Patient/{}", fhir_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(linked["fhir_id"], fhir_id.as_str());
    assert_eq!(linked["nombre"], "Ana");
    assert_eq!(linked["telefono"], "3001234567");

    let update = serde_json::json!({
        "documento_id": "1010",
        "nombre": "Ana Lucia",
        "apellido": "Rojas",
        "genero": "F"
    });
    let (status, updated) = app
        .request(app.send_json("PUT", &format!("/fhir/Patient/{}", fhir_id), update))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["id"], fhir_id.as_str());
    assert_eq!(updated["data"]["gender"], "female");
    assert!(updated["data"].get("telecom").is_none());

    let (status, found) = app.request(app.get("/fhir/Patient?family=Rojas")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["nombre"], "Ana Lucia");
    assert_eq!(found[0]["genero"], "F");

    let (status, found) = app.request(app.get("/fhir/Patient?family=Nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_fhir_export_of_missing_patient() {
    let app = test_app();

    let (status, _) = app
        .request(app.send_json("POST", "/fhir/pacientes/9999", JsonValue::Null))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.fhir.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fhir_failure_is_500_with_upstream_text() {
    let app = build(
        MemoryStore::with_patients(sample_patients()),
        FakeFhir::failing("HTTP request failed: connection refused"),
        &test_config(&[]),
    );

    let (status, body) = app
        .request(app.send_json("POST", "/fhir/pacientes/42", JsonValue::Null))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_fhir_read_not_found() {
    let app = test_app();
    let (status, _) = app.request(app.get("/fhir/Patient/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_fhir_status() {
    let app = test_app();

    let (status, _) = app.request(anonymous("GET", "/fhir/status")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.request(app.get("/fhir/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
    assert_eq!(body["fhir_version"], "4.0.1");
}
