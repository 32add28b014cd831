//! Local patient HTTP handlers

use axum::{Extension, Json, extract::State};
use hcd_core::Patient;
use serde::Deserialize;

use crate::auth::Claims;
use crate::db::PatientFilter;
use crate::error::AppError;
use crate::extract::{Path, Query};
use crate::state::AppState;

/// Query parameters for patient listing
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for patient search
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub nombre: Option<String>,
    pub documento: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /paciente/{id} - Read one patient
pub async fn read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, AppError> {
    tracing::debug!(subject = %claims.claims.sub, patient_id = id, "Reading patient");

    state
        .patients
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Patient with ID {} not found", id)))
}

/// GET /pacientes - List patients in id order
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let limit = params.limit.unwrap_or(state.paging.default_limit);
    let offset = params.offset.unwrap_or(0);
    if limit < 1 {
        return Err(AppError::BadRequest("limit must be at least 1".into()));
    }
    if offset < 0 {
        return Err(AppError::BadRequest("offset must not be negative".into()));
    }
    let limit = limit.min(state.paging.max_limit);

    tracing::debug!(subject = %claims.claims.sub, limit, offset, "Listing patients");
    let patients = state.patients.list(limit, offset).await?;
    Ok(Json(patients))
}

/// GET /pacientes/buscar - Search patients by name and/or document
pub async fn search(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let filter = PatientFilter {
        name: non_blank(params.nombre),
        document: non_blank(params.documento),
        limit: state.paging.max_limit,
    };

    tracing::debug!(subject = %claims.claims.sub, ?filter, "Searching patients");
    let patients = state.patients.search(&filter).await?;
    Ok(Json(patients))
}
