//! FHIR R4 `Patient` projection of the local patient record.
//!
//! The structures here model only the elements this middleware reads or
//! writes. Every element is optional on input so that resources produced by
//! third-party servers deserialize even when sparsely populated.

use serde::{Deserialize, Serialize};

use crate::patient::Demographics;

/// Identifier system under which local document numbers are published.
pub const PATIENT_IDENTIFIER_SYSTEM: &str = "http://hospital.example.org/identifiers/patient";

/// Media type for FHIR JSON payloads.
pub const FHIR_JSON: &str = "application/fhir+json";

/// FHIR administrative gender value set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// Map a local code (`M`, `F`, `O`). Absent or unrecognized codes map to `Unknown`.
    pub fn from_local(code: Option<&str>) -> Self {
        match code {
            Some("M") => Self::Male,
            Some("F") => Self::Female,
            Some("O") => Self::Other,
            _ => Self::Unknown,
        }
    }

    /// Parse a FHIR code. Returns `None` for anything outside the value set.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            "other" => Some(Self::Other),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }

    /// Local code for this gender; `Unknown` has none.
    pub fn to_local(self) -> Option<&'static str> {
        match self {
            Self::Male => Some("M"),
            Self::Female => Some("F"),
            Self::Other => Some("O"),
            Self::Unknown => None,
        }
    }
}

/// Local gender code to FHIR code. Total: anything unrecognized is `"unknown"`.
pub fn map_gender(code: Option<&str>) -> &'static str {
    AdministrativeGender::from_local(code).as_code()
}

/// FHIR gender code to local code. Total: anything unrecognized is `None`.
pub fn map_gender_from_fhir(code: Option<&str>) -> Option<&'static str> {
    code.and_then(AdministrativeGender::from_code)
        .and_then(AdministrativeGender::to_local)
}

/// FHIR Patient resource (subset)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FhirPatient {
    #[serde(default = "FhirPatient::resource_type_name")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
}

impl FhirPatient {
    fn resource_type_name() -> String {
        "Patient".to_string()
    }
}

impl Default for FhirPatient {
    fn default() -> Self {
        Self {
            resource_type: Self::resource_type_name(),
            id: None,
            identifier: Vec::new(),
            active: None,
            name: Vec::new(),
            telecom: Vec::new(),
            gender: None,
            birth_date: None,
            address: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HumanName {
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Project a local record onto a FHIR Patient. Never fails.
///
/// Telecom entries and the address block are only emitted when the
/// corresponding local field holds a non-empty value.
pub fn to_fhir(record: &Demographics) -> FhirPatient {
    let mut telecom = Vec::new();
    if let Some(phone) = present(&record.phone) {
        telecom.push(ContactPoint {
            system: Some("phone".into()),
            value: Some(phone.into()),
            use_: Some("mobile".into()),
        });
    }
    if let Some(email) = present(&record.email) {
        telecom.push(ContactPoint {
            system: Some("email".into()),
            value: Some(email.into()),
            use_: Some("home".into()),
        });
    }

    let address = present(&record.address)
        .map(|text| {
            vec![Address {
                use_: Some("home".into()),
                text: Some(text.into()),
                type_: Some("physical".into()),
            }]
        })
        .unwrap_or_default();

    FhirPatient {
        identifier: vec![Identifier {
            use_: Some("official".into()),
            system: Some(PATIENT_IDENTIFIER_SYSTEM.into()),
            value: Some(record.document_id.clone()),
        }],
        active: Some(true),
        name: vec![HumanName {
            use_: Some("official".into()),
            family: Some(record.family_name.clone()),
            given: vec![record.given_name.clone()],
        }],
        telecom,
        gender: Some(map_gender(record.gender.as_deref()).to_string()),
        birth_date: record.birth_date.clone(),
        address,
        ..FhirPatient::default()
    }
}

/// Inverse of [`to_fhir`]. Missing elements become empty or absent fields.
pub fn from_fhir(resource: &FhirPatient) -> Demographics {
    let document_id = resource
        .identifier
        .first()
        .and_then(|i| i.value.clone())
        .unwrap_or_default();

    let name = resource.name.first();
    let family_name = name.and_then(|n| n.family.clone()).unwrap_or_default();
    let given_name = name
        .and_then(|n| n.given.first().cloned())
        .unwrap_or_default();

    let mut phone = None;
    let mut email = None;
    for contact in &resource.telecom {
        match contact.system.as_deref() {
            Some("phone") => phone = contact.value.clone(),
            Some("email") => email = contact.value.clone(),
            _ => {}
        }
    }

    Demographics {
        document_id,
        given_name,
        family_name,
        birth_date: resource.birth_date.clone(),
        phone,
        address: resource.address.first().and_then(|a| a.text.clone()),
        email,
        gender: map_gender_from_fhir(resource.gender.as_deref()).map(str::to_string),
    }
}
