use serde::{Deserialize, Serialize};

/// The parts of an upstream CapabilityStatement used for connection checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,
    #[serde(default)]
    pub fhir_version: Option<String>,
    #[serde(default)]
    pub software: Option<CapabilitySoftware>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitySoftware {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}
