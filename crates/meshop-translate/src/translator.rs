//! Reverse translation: legacy values → control plane spec
//!
//! The translator owns the expanded rule set for one version. A translation
//! walks the rules in order, copying every value that is present in the
//! legacy document, then runs the enablement aggregator and decodes the
//! result into the typed spec. The destination tree is local to one call and
//! is dropped on the first error, so callers either get a complete spec or
//! nothing.

use meshop_core::{ControlPlaneSpec, MinorVersion, Values, path};
use serde_json::{Map, Value as JsonValue};

use crate::enablement::{AreaEnablement, EnablementAggregator};
use crate::error::{Result, TranslateError};
use crate::mapping::{MappingRule, RuleSet};

/// Outcome of a translation with diagnostics
#[derive(Debug, Clone)]
pub struct TranslationReport {
    pub spec: ControlPlaneSpec,
    /// Enablement of every feature area, in spec order
    pub areas: Vec<AreaEnablement>,
    /// Rules whose source value was present and written
    pub applied: Vec<MappingRule>,
    /// Rules whose source was absent, or whose transform chose to emit nothing
    pub skipped: Vec<MappingRule>,
}

/// Translates legacy values documents of one schema version
#[derive(Debug, Clone)]
pub struct ReverseTranslator {
    rules: RuleSet,
}

impl ReverseTranslator {
    /// Create a translator for `version`
    ///
    /// Fails with [`TranslateError::UnsupportedVersion`] if no mapping table
    /// is registered for it.
    pub fn new(version: MinorVersion) -> Result<Self> {
        let rules = RuleSet::for_version(version)?;
        tracing::info!(version = %version, rules = rules.len(), "translator ready");
        Ok(Self { rules })
    }

    /// Create a translator from an already expanded rule set
    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn version(&self) -> MinorVersion {
        self.rules.version()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Translate a values document into a spec
    pub fn translate(&self, values: &Values) -> Result<ControlPlaneSpec> {
        self.translate_with_report(values).map(|report| report.spec)
    }

    /// Translate a values document, also returning which rules fired and how
    /// each area's enablement was decided
    pub fn translate_with_report(&self, values: &Values) -> Result<TranslationReport> {
        let mut tree = JsonValue::Object(Map::new());
        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for rule in self.rules.rules() {
            let Some(raw) = values.get(&rule.source) else {
                tracing::debug!(rule = %rule, "source absent, skipping");
                skipped.push(rule.clone());
                continue;
            };

            match rule.transform.apply(&rule.source, raw)? {
                Some(value) => {
                    path::set(&mut tree, &rule.destination, value)?;
                    tracing::debug!(rule = %rule, "applied");
                    applied.push(rule.clone());
                }
                None => {
                    tracing::debug!(rule = %rule, "transform produced no output");
                    skipped.push(rule.clone());
                }
            }
        }

        let areas = EnablementAggregator::new(&self.rules).aggregate(values, &mut tree)?;

        let spec: ControlPlaneSpec =
            serde_json::from_value(tree).map_err(|e| TranslateError::Schema {
                message: e.to_string(),
            })?;

        Ok(TranslationReport {
            spec,
            areas,
            applied,
            skipped,
        })
    }
}

/// Translate `values` with the table registered for `version`
pub fn translate(version: MinorVersion, values: &Values) -> Result<ControlPlaneSpec> {
    ReverseTranslator::new(version)?.translate(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshop_core::{CoreError, FeatureArea};

    fn translator() -> ReverseTranslator {
        ReverseTranslator::new(MinorVersion::new(1, 3)).unwrap()
    }

    fn to_json(spec: &ControlPlaneSpec) -> JsonValue {
        serde_json::to_value(spec).unwrap()
    }

    #[test]
    fn test_unsupported_version() {
        let err = ReverseTranslator::new(MinorVersion::new(1, 1)).unwrap_err();
        assert!(matches!(err, TranslateError::UnsupportedVersion { .. }));
        assert!(!err.is_mapping_defect());
    }

    #[test]
    fn test_global_scalars_copied_verbatim() {
        let values = Values::from_yaml(
            r#"
global:
  hub: docker.io/istio
  tag: 1.2.3
"#,
        )
        .unwrap();

        let spec = translator().translate(&values).unwrap();
        assert_eq!(spec.hub.as_deref(), Some("docker.io/istio"));
        assert_eq!(spec.tag.as_deref(), Some("1.2.3"));
        assert!(spec.default_namespace.is_none());
    }

    #[test]
    fn test_autoscale_scenario() {
        let values = Values::from_yaml(
            r#"
pilot:
  enabled: true
  replicaCount: 1
  autoscaleEnabled: true
  autoscaleMax: 3
  autoscaleMin: 1
"#,
        )
        .unwrap();

        let spec = translator().translate(&values).unwrap();
        let json = to_json(&spec);
        assert_eq!(
            json["trafficManagement"]["components"]["pilot"]["common"]["k8s"]["hpaSpec"],
            serde_json::json!({"minReplicas": 1, "maxReplicas": 3, "scaleTargetRef": {}})
        );
        assert_eq!(json["trafficManagement"]["enabled"], serde_json::json!(true));
    }

    #[test]
    fn test_disabled_component_has_no_subtrees() {
        let values = Values::from_yaml("galley:\n  enabled: false\n").unwrap();
        let spec = translator().translate(&values).unwrap();

        let config = spec.feature(FeatureArea::ConfigManagement).unwrap();
        assert_eq!(config.enabled, Some(false));
        let galley = spec.component(FeatureArea::ConfigManagement, "galley").unwrap();
        assert_eq!(galley.enabled(), Some(false));
        assert!(galley.k8s().is_none());
        assert!(galley.values().is_none());
    }

    #[test]
    fn test_invalid_range_is_atomic() {
        let values = Values::from_yaml(
            r#"
global:
  hub: docker.io/istio
pilot:
  enabled: true
  autoscaleEnabled: true
  autoscaleMin: 5
  autoscaleMax: 2
"#,
        )
        .unwrap();

        let err = translator().translate_with_report(&values).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidRange { min: 5, max: 2, .. }));
    }

    #[test]
    fn test_schema_mismatch_reported() {
        let values = Values::from_yaml("pilot:\n  replicaCount: many\n").unwrap();
        let err = translator().translate(&values).unwrap_err();
        assert!(matches!(err, TranslateError::Schema { .. }));
    }

    #[test]
    fn test_unknown_resource_section_rejected() {
        let values = Values::from_yaml(
            r#"
pilot:
  resources:
    requests:
      cpu: 1
    overhead:
      memory: 1G
"#,
        )
        .unwrap();

        let err = translator().translate_with_report(&values).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::InvalidValue { ref path, .. } if path == "pilot.resources.overhead"
        ));
    }

    #[test]
    fn test_unmodelled_affinity_field_is_schema_error() {
        let values = Values::from_yaml(
            r#"
pilot:
  podAntiAffinityLabelSelector:
    - labelSelector:
        matchLabels:
          app: pilot
      weight: 100
"#,
        )
        .unwrap();

        let err = translator().translate(&values).unwrap_err();
        assert!(matches!(err, TranslateError::Schema { .. }));
    }

    #[test]
    fn test_report_lists_applied_and_skipped() {
        let values = Values::from_yaml("global:\n  hub: gcr.io/istio\n").unwrap();
        let report = translator().translate_with_report(&values).unwrap();

        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].destination.to_string(), "hub");
        assert_eq!(report.applied.len() + report.skipped.len(), translator().rules().len());
        assert_eq!(report.areas.len(), FeatureArea::ALL.len());
    }

    #[test]
    fn test_path_conflict_is_mapping_defect() {
        let err = TranslateError::from(CoreError::PathConflict {
            path: "a".into(),
            expected: "a map",
            found: "a string",
        });
        assert!(err.is_mapping_defect());
    }

    #[test]
    fn test_with_prebuilt_rules() {
        let rules = RuleSet::for_version(MinorVersion::new(1, 4)).unwrap();
        let translator = ReverseTranslator::with_rules(rules);
        assert_eq!(translator.version(), MinorVersion::new(1, 4));

        let values = Values::from_yaml("pilot:\n  keepaliveMaxServerConnectionAge: 30m\n").unwrap();
        let spec = translator.translate(&values).unwrap();
        let pilot = spec.component(FeatureArea::TrafficManagement, "pilot").unwrap();
        assert_eq!(
            pilot.values().and_then(|v| v.get("keepaliveMaxServerConnectionAge")),
            Some(&JsonValue::String("30m".to_string()))
        );
    }

    #[test]
    fn test_numeric_looking_image_stays_text() {
        let values = Values::from_yaml(
            r#"
pilot:
  image: "1.2"
  traceSampling: "1.0"
"#,
        )
        .unwrap();

        let spec = translator().translate(&values).unwrap();
        let pilot = spec.component(FeatureArea::TrafficManagement, "pilot").unwrap();
        let chart_values = pilot.values().unwrap();
        assert_eq!(chart_values.get("image"), Some(&JsonValue::String("1.2".into())));
        assert_eq!(chart_values.get("traceSampling"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_free_function() {
        let values = Values::from_yaml("global:\n  tag: 1.4.0\n").unwrap();
        let spec = translate(MinorVersion::new(1, 4), &values).unwrap();
        assert_eq!(spec.tag.as_deref(), Some("1.4.0"));
    }
}
