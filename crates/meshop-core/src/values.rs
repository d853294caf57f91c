//! Legacy values documents
//!
//! A values document is the Helm-chart-style tree an installation was
//! configured with. It has no fixed shape: each chart release adds, renames
//! or drops fields, and most documents only carry the handful of fields that
//! were overridden.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::path::{self, ValuePath, kind_name};

/// Read-only source document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Load values from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        checked_root(value).map(Self)
    }

    /// Parse values from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        checked_root(value).map(Self)
    }

    /// Get the value at `path`
    ///
    /// An explicit `null` counts as absent: legacy documents write `key:`
    /// with no value to mean "not set".
    pub fn get(&self, path: &ValuePath) -> Option<&JsonValue> {
        path::get(&self.0, path).filter(|v| !v.is_null())
    }

    /// Get the value at a path expression, ignoring malformed expressions
    pub fn lookup(&self, expr: &str) -> Option<&JsonValue> {
        ValuePath::parse(expr).ok().and_then(|p| path::get(&self.0, &p).filter(|v| !v.is_null()))
    }

    /// Set the value at a path expression
    pub fn set(&mut self, expr: &str, value: JsonValue) -> Result<()> {
        let parsed = ValuePath::parse(expr)?;
        path::set(&mut self.0, &parsed, value)
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Convert to JSON value
    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}

impl From<JsonValue> for Values {
    fn from(value: JsonValue) -> Self {
        Self(normalize_root(value))
    }
}

/// An empty YAML document parses as null; treat it as an empty map
fn normalize_root(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
        other => other,
    }
}

fn checked_root(value: JsonValue) -> Result<JsonValue> {
    match normalize_root(value) {
        map @ JsonValue::Object(_) => Ok(map),
        other => Err(CoreError::NotAMapping {
            found: kind_name(&other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_yaml_nested() {
        let values = Values::from_yaml(
            r#"
mixer:
  policy:
    enabled: true
    replicaCount: 2
gateways:
  istio-ingressgateway:
    enabled: false
"#,
        )
        .unwrap();

        assert_eq!(values.lookup("mixer.policy.enabled").unwrap(), true);
        assert_eq!(values.lookup("mixer.policy.replicaCount").unwrap(), 2);
        assert_eq!(values.lookup("gateways.istio-ingressgateway.enabled").unwrap(), false);
        assert!(values.lookup("mixer.telemetry").is_none());
    }

    #[test]
    fn test_explicit_null_is_absent() {
        let values = Values::from_yaml("pilot:\n  image:\n").unwrap();
        assert!(values.lookup("pilot.image").is_none());
        assert!(values.lookup("pilot").is_some());
    }

    #[test]
    fn test_empty_document() {
        let values = Values::from_yaml("").unwrap();
        assert!(values.is_empty());
        assert_eq!(values.inner(), &json!({}));
    }

    #[test]
    fn test_set_then_lookup() {
        let mut values = Values::new();
        values.set("global.hub", json!("docker.io/istio")).unwrap();
        values.set("pilot.env.GODEBUG", json!("gctrace=1")).unwrap();

        assert_eq!(values.lookup("global.hub").unwrap(), "docker.io/istio");
        assert_eq!(values.lookup("pilot.env.GODEBUG").unwrap(), "gctrace=1");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("values.yaml");
        std::fs::write(&file, "global:\n  tag: 1.2.3\n").unwrap();

        let values = Values::from_file(&file).unwrap();
        assert_eq!(values.lookup("global.tag").unwrap(), "1.2.3");
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Values::from_yaml("pilot: [unclosed").is_err());
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = Values::from_yaml("- pilot\n- galley\n").unwrap_err();
        assert!(matches!(err, CoreError::NotAMapping { found: "a list" }));
    }
}
