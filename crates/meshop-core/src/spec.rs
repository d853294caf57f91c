//! Control plane installation specification
//!
//! This is the strongly-shaped document the legacy values are translated
//! into. Components are grouped by feature area, and both areas and
//! components carry an explicit `enabled` flag. Every field is optional so
//! that "not set" survives a round trip through YAML or JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Top-level installation specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneSpec {
    /// Default image registry for all components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<String>,

    /// Default image tag for all components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Namespace components are installed into unless their area overrides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_management: Option<FeatureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<FeatureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<FeatureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_management: Option<FeatureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<FeatureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateways: Option<FeatureSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_injection: Option<FeatureSpec>,
}

impl ControlPlaneSpec {
    /// Get the node for a feature area
    pub fn feature(&self, area: FeatureArea) -> Option<&FeatureSpec> {
        match area {
            FeatureArea::TrafficManagement => self.traffic_management.as_ref(),
            FeatureArea::Policy => self.policy.as_ref(),
            FeatureArea::Telemetry => self.telemetry.as_ref(),
            FeatureArea::ConfigManagement => self.config_management.as_ref(),
            FeatureArea::Security => self.security.as_ref(),
            FeatureArea::Gateways => self.gateways.as_ref(),
            FeatureArea::AutoInjection => self.auto_injection.as_ref(),
        }
    }

    /// Get a component node by area and component name
    pub fn component(&self, area: FeatureArea, name: &str) -> Option<&ComponentSpec> {
        self.feature(area)?.components.entries.get(name)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Top-level feature areas of a control plane spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureArea {
    TrafficManagement,
    Policy,
    Telemetry,
    ConfigManagement,
    Security,
    Gateways,
    AutoInjection,
}

impl FeatureArea {
    pub const ALL: [FeatureArea; 7] = [
        Self::TrafficManagement,
        Self::Policy,
        Self::Telemetry,
        Self::ConfigManagement,
        Self::Security,
        Self::Gateways,
        Self::AutoInjection,
    ];

    /// Field name of this area in a spec document
    pub fn key(&self) -> &'static str {
        match self {
            Self::TrafficManagement => "trafficManagement",
            Self::Policy => "policy",
            Self::Telemetry => "telemetry",
            Self::ConfigManagement => "configManagement",
            Self::Security => "security",
            Self::Gateways => "gateways",
            Self::AutoInjection => "autoInjection",
        }
    }
}

impl fmt::Display for FeatureArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One feature area
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "FeatureComponents::is_empty")]
    pub components: FeatureComponents,
}

/// Components of a feature area, keyed by component name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureComponents {
    /// Namespace shared by every component in the area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(flatten)]
    pub entries: BTreeMap<String, ComponentSpec>,
}

impl FeatureComponents {
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.entries.is_empty()
    }
}

/// One installable component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common: Option<CommonComponentSpec>,
}

impl ComponentSpec {
    /// Explicit or defaulted enablement of this component
    pub fn enabled(&self) -> Option<bool> {
        self.common.as_ref().and_then(|c| c.enabled)
    }

    pub fn k8s(&self) -> Option<&KubernetesResourceSpec> {
        self.common.as_ref().and_then(|c| c.k8s.as_ref())
    }

    pub fn values(&self) -> Option<&Map<String, JsonValue>> {
        self.common.as_ref().and_then(|c| c.values.as_ref())
    }
}

/// Settings shared by every component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonComponentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Deployment shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s: Option<KubernetesResourceSpec>,

    /// Chart-specific scalar overrides, passed through untyped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Map<String, JsonValue>>,
}

/// Kubernetes deployment settings of a component
///
/// Unknown fields are rejected so that nothing a rule wrote is dropped on
/// decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KubernetesResourceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvVar>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpa_spec: Option<HorizontalPodAutoscalerSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
}

/// Environment variable of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Compute resource requirements; quantities are kept as written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<BTreeMap<String, String>>,
}

/// Autoscaling range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HorizontalPodAutoscalerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<u32>,

    /// Always present; the installer fills in the deployment it targets
    #[serde(default)]
    pub scale_target_ref: CrossVersionObjectReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CrossVersionObjectReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Affinity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti_affinity: Option<PodAntiAffinity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PodAntiAffinity {
    #[serde(default)]
    pub required_during_scheduling_ignored_during_execution: Vec<PodAffinityTerm>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PodAffinityTerm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expressions: Option<Vec<LabelSelectorRequirement>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}
