//! HTTP client for a FHIR R4 server (HAPI or compatible)

use std::time::Duration;

use async_trait::async_trait;
use hcd_core::{
    Bundle, CapabilityStatement, Demographics, FHIR_JSON, FhirPatient, OperationOutcome, to_fhir,
};
use reqwest::{
    RequestBuilder, Response, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, LOCATION},
};
use serde_json::Value as JsonValue;

use super::{ConnectionStatus, CreatedPatient, FhirClientError, FhirGateway, UpdatedPatient};
use crate::config::FhirConfig;

/// Client for the configured FHIR server
///
/// Holds only configuration; every call is an independent round trip
/// bounded by the configured timeout.
#[derive(Clone)]
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
}

/// FHIR ids are 1-64 characters of `[A-Za-z0-9\-\.]`.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
}

/// Extract the Patient id from a `Location` such as `.../Patient/123/_history/1`.
fn id_from_location(location: &str) -> Option<String> {
    let mut segments = location.split('/');
    segments.find(|s| *s == "Patient")?;
    segments
        .next()
        .filter(|id| is_valid_id(id))
        .map(str::to_string)
}

impl FhirClient {
    /// Create a client for `config.server_url`
    pub fn new(config: &FhirConfig) -> Result<Self, FhirClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FhirClientError::Failure(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn patient_url(&self, fhir_id: &str) -> Result<String, FhirClientError> {
        if !is_valid_id(fhir_id) {
            return Err(FhirClientError::NotFound(format!(
                "Invalid FHIR Patient id: {:?}",
                fhir_id
            )));
        }
        Ok(self.url(&format!("Patient/{}", fhir_id)))
    }

    fn with_body(
        &self,
        request: RequestBuilder,
        resource: &FhirPatient,
    ) -> Result<RequestBuilder, FhirClientError> {
        let body = serde_json::to_vec(resource)
            .map_err(|e| FhirClientError::Failure(format!("Failed to encode Patient: {}", e)))?;
        Ok(request.header(CONTENT_TYPE, FHIR_JSON).body(body))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, FhirClientError> {
        request
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(|e| FhirClientError::Failure(format!("HTTP request failed: {}", e)))
    }

    /// Describe a non-2xx response, preferring OperationOutcome diagnostics.
    async fn upstream_error(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let detail = match OperationOutcome::parse(&body) {
            Some(outcome) if !outcome.issue.is_empty() => outcome.summary(),
            _ => body,
        };
        if detail.is_empty() {
            format!("FHIR server returned {}", status)
        } else {
            format!("FHIR server returned {}: {}", status, detail)
        }
    }

    async fn read_json(response: Response) -> Result<JsonValue, FhirClientError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FhirClientError::Failure(format!("Failed to read response: {}", e)))?;
        if bytes.is_empty() {
            return Ok(JsonValue::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| FhirClientError::Failure(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl FhirGateway for FhirClient {
    async fn create(&self, record: &Demographics) -> Result<CreatedPatient, FhirClientError> {
        let resource = to_fhir(record);
        let request = self.with_body(self.http.post(self.url("Patient")), &resource)?;
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(FhirClientError::Failure(Self::upstream_error(response).await));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = Self::read_json(response).await?;

        let fhir_id = data
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .or_else(|| location.as_deref().and_then(id_from_location))
            .ok_or_else(|| {
                FhirClientError::Failure("FHIR server did not return a Patient id".into())
            })?;

        tracing::info!(fhir_id = %fhir_id, "Created Patient on FHIR server");
        Ok(CreatedPatient { fhir_id, data })
    }

    async fn get(&self, fhir_id: &str) -> Result<FhirPatient, FhirClientError> {
        let response = self.send(self.http.get(self.patient_url(fhir_id)?)).await?;

        match response.status() {
            status if status.is_success() => response
                .json::<FhirPatient>()
                .await
                .map_err(|e| FhirClientError::Failure(format!("Failed to parse Patient: {}", e))),
            StatusCode::NOT_FOUND | StatusCode::GONE => Err(FhirClientError::NotFound(format!(
                "FHIR Patient {} not found",
                fhir_id
            ))),
            _ => Err(FhirClientError::Failure(Self::upstream_error(response).await)),
        }
    }

    async fn update(
        &self,
        fhir_id: &str,
        record: &Demographics,
    ) -> Result<UpdatedPatient, FhirClientError> {
        let url = self.patient_url(fhir_id)?;
        let mut resource = to_fhir(record);
        resource.id = Some(fhir_id.to_string());

        let request = self.with_body(self.http.put(url), &resource)?;
        let response = self.send(request).await?;

        match response.status() {
            status if status.is_success() => Ok(UpdatedPatient {
                data: Self::read_json(response).await?,
            }),
            StatusCode::NOT_FOUND => Err(FhirClientError::NotFound(format!(
                "FHIR Patient {} not found",
                fhir_id
            ))),
            _ => Err(FhirClientError::Failure(Self::upstream_error(response).await)),
        }
    }

    async fn search(&self, params: &[(String, String)]) -> Result<Vec<FhirPatient>, FhirClientError> {
        let request = self.http.get(self.url("Patient")).query(params);
        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(FhirClientError::Failure(Self::upstream_error(response).await));
        }

        let bundle = response
            .json::<Bundle>()
            .await
            .map_err(|e| FhirClientError::Failure(format!("Failed to parse Bundle: {}", e)))?;
        Ok(bundle.patients())
    }

    async fn test_connection(&self) -> ConnectionStatus {
        let probe = async {
            let response = self.send(self.http.get(self.url("metadata"))).await?;
            if !response.status().is_success() {
                return Err(FhirClientError::Failure(Self::upstream_error(response).await));
            }
            response
                .json::<CapabilityStatement>()
                .await
                .map_err(|e| FhirClientError::Failure(format!("Failed to parse metadata: {}", e)))
        };

        match probe.await {
            Ok(capability) => ConnectionStatus {
                status: "connected".to_string(),
                server: self.base_url.clone(),
                fhir_version: Some(
                    capability
                        .fhir_version
                        .unwrap_or_else(|| "unknown".to_string()),
                ),
                error: None,
            },
            Err(e) => {
                tracing::warn!(server = %self.base_url, error = %e, "FHIR server unreachable");
                ConnectionStatus {
                    status: "error".to_string(),
                    server: self.base_url.clone(),
                    fhir_version: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
