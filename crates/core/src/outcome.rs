use serde::{Deserialize, Serialize};

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// FHIR OperationOutcome, as returned by upstream servers on failure.
///
/// Only read, never produced: this middleware reports its own errors as
/// plain `{"detail": ...}` bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    /// Issue type code, kept as text since servers extend the value set.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl OperationOutcome {
    /// Parse an upstream response body. Returns `None` unless it is an OperationOutcome.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body)
            .ok()
            .filter(|o| o.resource_type == "OperationOutcome")
    }

    /// Join the issue diagnostics (or codes, when no diagnostics are given).
    pub fn summary(&self) -> String {
        self.issue
            .iter()
            .map(|i| i.diagnostics.clone().unwrap_or_else(|| i.code.clone()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prefers_diagnostics() {
        let body = r#"{
            "resourceType": "OperationOutcome",
            "issue": [
                {"severity": "error", "code": "processing", "diagnostics": "HAPI-0450: bad birthDate"},
                {"severity": "warning", "code": "informational"}
            ]
        }"#;

        let outcome = OperationOutcome::parse(body).unwrap();
        assert_eq!(outcome.summary(), "HAPI-0450: bad birthDate; informational");
    }

    #[test]
    fn test_parse_rejects_other_bodies() {
        assert!(OperationOutcome::parse("<html>502</html>").is_none());
        assert!(OperationOutcome::parse(r#"{"resourceType": "Patient"}"#).is_none());
    }
}
