use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::fhir::FhirPatient;

/// FHIR Bundle types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
    #[serde(other)]
    Other,
}

/// FHIR Bundle resource (simplified for search responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<BundleType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// Entry in a Bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<JsonValue>,
}

impl Bundle {
    /// Patient resources carried by the entries, in bundle order.
    ///
    /// Entries without a resource, or with a resource of another type (such
    /// as an `OperationOutcome` attached to a searchset), are skipped.
    pub fn patients(&self) -> Vec<FhirPatient> {
        self.entry
            .iter()
            .filter_map(|entry| entry.resource.as_ref())
            .filter(|resource| resource.get("resourceType").and_then(|t| t.as_str()) == Some("Patient"))
            .filter_map(|resource| serde_json::from_value(resource.clone()).ok())
            .collect()
    }
}
