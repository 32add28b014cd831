use serde::{Deserialize, Serialize};

/// Clinical subject as stored in the `pacientes` table.
///
/// The numeric `id` is assigned by storage and never reused. Everything else
/// lives in [`Demographics`], which is also the shape exchanged with the FHIR
/// translator, since a FHIR resource carries no local id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    #[serde(flatten)]
    pub demographics: Demographics,
}

/// Patient fields that exist independently of the local storage id.
///
/// Wire names follow the `pacientes` columns consumed by the browser frontend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Demographics {
    /// External document number. Kept as text so leading zeros survive.
    #[serde(rename = "documento_id")]
    pub document_id: String,

    #[serde(rename = "nombre")]
    pub given_name: String,

    #[serde(rename = "apellido")]
    pub family_name: String,

    /// ISO-8601 date, e.g. `1990-05-15`.
    #[serde(rename = "fecha_nacimiento")]
    pub birth_date: Option<String>,

    #[serde(rename = "telefono")]
    pub phone: Option<String>,

    #[serde(rename = "direccion")]
    pub address: Option<String>,

    #[serde(rename = "correo")]
    pub email: Option<String>,

    /// Local gender code: `M`, `F` or `O`. Not stored in `pacientes`.
    #[serde(rename = "genero", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}
