//! hcd-core: patient record and FHIR interoperability types
//!
//! Transport-free types shared by the middleware: the local patient record,
//! its FHIR `Patient` projection and the mapping between them, plus the
//! upstream Bundle, OperationOutcome and CapabilityStatement shapes the FHIR
//! client reads.

pub mod bundle;
pub mod capability;
pub mod fhir;
pub mod outcome;
pub mod patient;

pub use bundle::{Bundle, BundleEntry, BundleType};
pub use capability::{CapabilitySoftware, CapabilityStatement};
pub use fhir::{
    AdministrativeGender, FHIR_JSON, FhirPatient, PATIENT_IDENTIFIER_SYSTEM, from_fhir, map_gender,
    map_gender_from_fhir, to_fhir,
};
pub use outcome::{IssueSeverity, OperationOutcome, OperationOutcomeIssue};
pub use patient::{Demographics, Patient};
