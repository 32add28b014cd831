//! FHIR interoperability handlers
//!
//! Local records go out through the injected [`crate::fhir::FhirGateway`];
//! nothing here writes to the local database.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use hcd_core::{Demographics, FhirPatient, from_fhir};
use serde::Serialize;

use crate::auth::Claims;
use crate::error::AppError;
use crate::extract::{self, Path, Query};
use crate::fhir::{ConnectionStatus, UpdatedPatient};
use crate::state::AppState;

/// Local projection of a FHIR Patient, tagged with its FHIR id
#[derive(Debug, Serialize)]
pub struct LinkedPatient {
    pub fhir_id: Option<String>,
    #[serde(flatten)]
    pub demographics: Demographics,
}

impl From<FhirPatient> for LinkedPatient {
    fn from(resource: FhirPatient) -> Self {
        Self {
            demographics: from_fhir(&resource),
            fhir_id: resource.id,
        }
    }
}

/// GET /fhir/status - Probe the FHIR server
pub async fn status(State(state): State<AppState>) -> Json<ConnectionStatus> {
    Json(state.fhir.test_connection().await)
}

/// POST /fhir/pacientes/{id} - Publish a local patient to the FHIR server
pub async fn export(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let patient = state
        .patients
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Patient with ID {} not found", id)))?;

    let created = state.fhir.create(&patient.demographics).await?;
    tracing::info!(
        subject = %claims.claims.sub,
        patient_id = id,
        fhir_id = %created.fhir_id,
        "Exported patient to FHIR"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /fhir/Patient/{fhir_id} - Read a Patient from the FHIR server
pub async fn read(
    State(state): State<AppState>,
    Path(fhir_id): Path<String>,
) -> Result<Json<LinkedPatient>, AppError> {
    let resource = state.fhir.get(&fhir_id).await?;
    Ok(Json(resource.into()))
}

/// PUT /fhir/Patient/{fhir_id} - Replace a Patient on the FHIR server
pub async fn update(
    State(state): State<AppState>,
    Path(fhir_id): Path<String>,
    extract::Json(record): extract::Json<Demographics>,
) -> Result<Json<UpdatedPatient>, AppError> {
    let updated = state.fhir.update(&fhir_id, &record).await?;
    Ok(Json(updated))
}

/// GET /fhir/Patient - Search the FHIR server, forwarding query parameters as-is
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<LinkedPatient>>, AppError> {
    let found = state.fhir.search(&params).await?;
    Ok(Json(found.into_iter().map(LinkedPatient::from).collect()))
}
