//! External FHIR server integration

mod client;

pub use client::FhirClient;

use async_trait::async_trait;
use hcd_core::{Demographics, FhirPatient};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// FHIR round-trip failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum FhirClientError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Failure(String),
}

/// Result of creating a Patient upstream
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPatient {
    pub fhir_id: String,
    pub data: JsonValue,
}

/// Result of updating a Patient upstream
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedPatient {
    pub data: JsonValue,
}

/// Outcome of a connectivity probe; never an error.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    /// `connected` or `error`
    pub status: String,
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fhir_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Operations against an external FHIR server.
///
/// Each call is a single round trip: no retries and no caching.
#[async_trait]
pub trait FhirGateway: Send + Sync {
    /// Map `record` to a Patient and create it upstream.
    async fn create(&self, record: &Demographics) -> Result<CreatedPatient, FhirClientError>;

    async fn get(&self, fhir_id: &str) -> Result<FhirPatient, FhirClientError>;

    /// Map `record` to a Patient carrying `fhir_id` and replace the upstream resource.
    async fn update(
        &self,
        fhir_id: &str,
        record: &Demographics,
    ) -> Result<UpdatedPatient, FhirClientError>;

    /// Search the Patient collection; an empty bundle yields an empty list.
    async fn search(&self, params: &[(String, String)]) -> Result<Vec<FhirPatient>, FhirClientError>;

    async fn test_connection(&self) -> ConnectionStatus;
}
