//! Recommended action items as returned by the investigation backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a recommended action.
///
/// Identifiers are opaque strings chosen by the backend (`"rec-001"` in
/// practice). They are only meaningful within the list that carries them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    /// Create an identifier from anything string-like.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ActionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One unit of remediation work recommended by the backend.
///
/// `dependencies` lists the identifiers of actions that must complete
/// before this one becomes eligible. An empty list marks an entry action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Unique identifier within the containing list.
    pub id: ActionId,
    /// Action kind, e.g. `"restart-pod"` or `"scale-deployment"`.
    pub action: String,
    /// Human-readable rationale. Optional on the wire.
    #[serde(default)]
    pub description: String,
    /// Identifiers of prerequisite actions in the same list.
    #[serde(default)]
    pub dependencies: Vec<ActionId>,
    /// Backend confidence for this individual action, when reported.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Action-specific parameters, passed through untouched.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl Recommendation {
    /// Create a recommendation with no dependencies.
    #[must_use]
    pub fn new(id: impl Into<ActionId>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            description: String::new(),
            dependencies: Vec::new(),
            confidence: None,
            parameters: serde_json::Value::Null,
        }
    }

    /// Add prerequisite identifiers.
    #[must_use]
    pub fn depends_on<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ActionId>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Set the per-action confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Parse a JSON array of recommendations.
///
/// # Errors
/// Returns [`crate::PlanError::Parse`] when the payload is not a valid
/// recommendation list.
pub fn parse_recommendations(json: &str) -> Result<Vec<Recommendation>, crate::PlanError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_wire_shape() {
        let json = r#"[
            {"id": "rec-001", "action": "restart-pod"},
            {"id": "rec-002", "action": "scale-deployment", "dependencies": ["rec-001"]}
        ]"#;

        let recs = parse_recommendations(json).unwrap();
        assert_eq!(recs.len(), 2);
        assert!(recs[0].dependencies.is_empty());
        assert_eq!(recs[1].dependencies, vec![ActionId::new("rec-001")]);
        assert!(recs[0].confidence.is_none());
    }

    #[test]
    fn parses_optional_fields() {
        let json = r#"[
            {
                "id": "rec-001",
                "action": "increase-memory-limit",
                "description": "OOMKilled twice in 10m",
                "confidence": 0.92,
                "parameters": {"limit": "512Mi"}
            }
        ]"#;

        let recs = parse_recommendations(json).unwrap();
        assert_eq!(recs[0].confidence, Some(0.92));
        assert_eq!(recs[0].parameters["limit"], "512Mi");
    }

    #[test]
    fn rejects_non_list_payload() {
        assert!(parse_recommendations(r#"{"id": "rec-001"}"#).is_err());
    }
}
