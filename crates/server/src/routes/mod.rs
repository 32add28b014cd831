pub mod fhir;
pub mod health;
pub mod metrics;
pub mod patient;
pub mod root;
pub mod token;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Routes open to anonymous callers
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root::get))
        .route("/health", get(health::check))
        .route("/token", post(token::login))
        .route("/metrics", get(metrics::get))
}

/// Routes that require a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(token::me))
        .route("/paciente/{id}", get(patient::read))
        .route("/pacientes", get(patient::list))
        .route("/pacientes/buscar", get(patient::search))
        .route("/fhir/status", get(fhir::status))
        .route("/fhir/pacientes/{id}", post(fhir::export))
        .route("/fhir/Patient", get(fhir::search))
        .route("/fhir/Patient/{fhir_id}", get(fhir::read).put(fhir::update))
}
