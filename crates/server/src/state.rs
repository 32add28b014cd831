//! Shared handler state

use std::sync::Arc;

use crate::config::Paging;
use crate::db::PatientStore;
use crate::fhir::FhirGateway;

/// Dependencies handed to every handler
///
/// Built once at startup; nothing in here is mutated while serving.
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<dyn PatientStore>,
    pub fhir: Arc<dyn FhirGateway>,
    pub paging: Paging,
}

impl AppState {
    pub fn new(patients: Arc<dyn PatientStore>, fhir: Arc<dyn FhirGateway>, paging: Paging) -> Self {
        Self {
            patients,
            fhir,
            paging,
        }
    }
}
