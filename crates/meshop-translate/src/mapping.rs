//! Mapping table registry
//!
//! Each supported schema version has an immutable table describing where its
//! legacy fields live and where they land in the spec. Tables are expanded
//! into flat [`RuleSet`]s when a translator is built, and the expansion
//! rejects tables whose rules would write overlapping destinations.
//!
//! Schema drift between releases stays isolated: a new release gets a new
//! table, existing tables are never edited.

use meshop_core::{FeatureArea, MinorVersion, ValuePath};
use phf::phf_map;
use std::fmt;

use crate::error::{Result, TranslateError};
use crate::transformer::Transform;

// =============================================================================
// TABLE DEFINITIONS
// =============================================================================

/// How much of the deployment shape a component exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Full set of `enabled`, `k8s` and `values` rules
    Deployment,
    /// Only the listed `values` overrides; no `enabled` flag of its own
    ValuesOnly,
}

/// Where a component lives in both documents
#[derive(Debug, Clone, Copy)]
pub struct ComponentMapping {
    pub area: FeatureArea,
    /// Component name in the spec
    pub name: &'static str,
    /// Path of the component node in the legacy values
    pub source: &'static str,
    pub kind: ComponentKind,
    /// `enabled` to emit when the legacy document does not say
    pub default_enabled: Option<bool>,
    /// Chart value overrides copied into `common.values`
    /// (source field, destination field, transform)
    pub values: &'static [ValueField],
}

/// Rule outside any component (hub, tag, namespaces)
#[derive(Debug, Clone, Copy)]
pub struct StaticRule {
    pub source: &'static str,
    pub destination: &'static str,
    pub transform: Transform,
}

/// Legacy field that sets an area's `enabled` directly
#[derive(Debug, Clone, Copy)]
pub struct AreaOverride {
    pub area: FeatureArea,
    pub source: &'static str,
}

/// Full mapping definition for one schema version
#[derive(Debug)]
pub struct VersionTable {
    pub version: MinorVersion,
    pub components: &'static [ComponentMapping],
    pub globals: &'static [StaticRule],
    pub area_overrides: &'static [AreaOverride],
}

/// Deployment-shape fields every deployment component maps
/// (source field, destination under `common.k8s`, transform)
const K8S_FIELDS: &[(&str, &str, Transform)] = &[
    ("replicaCount", "replicaCount", Transform::Copy),
    ("resources", "resources", Transform::ResourceRequests),
    ("nodeSelector", "nodeSelector", Transform::StringMap),
    ("podAnnotations", "podAnnotations", Transform::StringMap),
    ("env", "env", Transform::EnvMapToList),
    (
        "podAntiAffinityLabelSelector",
        "affinity",
        Transform::LabelSelectorToAffinity,
    ),
    ("priorityClassName", "priorityClassName", Transform::Text),
];

/// (source field, destination field, transform) of a chart value override
pub type ValueField = (&'static str, &'static str, Transform);

/// Image references stay strings even when they look numeric
const IMAGE: ValueField = ("image", "image", Transform::Text);

/// Chart value copied under the same name with numeric normalisation
macro_rules! scalar {
    ($name:literal) => {
        ($name, $name, Transform::ScalarOverride)
    };
}

// =============================================================================
// VERSION 1.3
// =============================================================================

const fn deployment(
    area: FeatureArea,
    name: &'static str,
    source: &'static str,
    values: &'static [ValueField],
) -> ComponentMapping {
    ComponentMapping {
        area,
        name,
        source,
        kind: ComponentKind::Deployment,
        default_enabled: Some(false),
        values,
    }
}

static V1_3_COMPONENTS: &[ComponentMapping] = &[
    deployment(
        FeatureArea::TrafficManagement,
        "pilot",
        "pilot",
        &[IMAGE, scalar!("traceSampling")],
    ),
    ComponentMapping {
        area: FeatureArea::TrafficManagement,
        name: "proxy",
        source: "global.proxy",
        kind: ComponentKind::ValuesOnly,
        default_enabled: None,
        values: &[scalar!("readinessInitialDelaySeconds")],
    },
    deployment(FeatureArea::Policy, "policy", "mixer.policy", &[IMAGE]),
    deployment(FeatureArea::Telemetry, "telemetry", "mixer.telemetry", &[IMAGE]),
    deployment(FeatureArea::ConfigManagement, "galley", "galley", &[IMAGE]),
    deployment(FeatureArea::Security, "citadel", "citadel", &[IMAGE]),
    deployment(FeatureArea::Security, "nodeAgent", "nodeagent", &[IMAGE]),
    deployment(FeatureArea::Security, "certManager", "certmanager", &[IMAGE]),
    deployment(
        FeatureArea::Gateways,
        "ingressGateway",
        "gateways.istio-ingressgateway",
        &[],
    ),
    deployment(
        FeatureArea::Gateways,
        "egressGateway",
        "gateways.istio-egressgateway",
        &[],
    ),
    deployment(
        FeatureArea::AutoInjection,
        "injector",
        "sidecarInjectorWebhook",
        &[IMAGE],
    ),
];

static V1_3_GLOBALS: &[StaticRule] = &[
    StaticRule {
        source: "global.hub",
        destination: "hub",
        transform: Transform::Text,
    },
    StaticRule {
        source: "global.tag",
        destination: "tag",
        transform: Transform::Text,
    },
    StaticRule {
        source: "global.istioNamespace",
        destination: "defaultNamespace",
        transform: Transform::Text,
    },
    StaticRule {
        source: "global.istioNamespace",
        destination: "security.components.namespace",
        transform: Transform::Text,
    },
    StaticRule {
        source: "global.policyNamespace",
        destination: "policy.components.namespace",
        transform: Transform::Text,
    },
    StaticRule {
        source: "global.telemetryNamespace",
        destination: "telemetry.components.namespace",
        transform: Transform::Text,
    },
];

static V1_3_AREA_OVERRIDES: &[AreaOverride] = &[
    AreaOverride {
        area: FeatureArea::Gateways,
        source: "gateways.enabled",
    },
    AreaOverride {
        area: FeatureArea::Telemetry,
        source: "telemetry.enabled",
    },
];

static V1_3: VersionTable = VersionTable {
    version: MinorVersion::new(1, 3),
    components: V1_3_COMPONENTS,
    globals: V1_3_GLOBALS,
    area_overrides: V1_3_AREA_OVERRIDES,
};

// =============================================================================
// VERSION 1.4
// =============================================================================

static V1_4_COMPONENTS: &[ComponentMapping] = &[
    deployment(
        FeatureArea::TrafficManagement,
        "pilot",
        "pilot",
        &[
            IMAGE,
            scalar!("traceSampling"),
            scalar!("keepaliveMaxServerConnectionAge"),
        ],
    ),
    ComponentMapping {
        area: FeatureArea::TrafficManagement,
        name: "proxy",
        source: "global.proxy",
        kind: ComponentKind::ValuesOnly,
        default_enabled: None,
        values: &[
            scalar!("readinessInitialDelaySeconds"),
            scalar!("readinessPeriodSeconds"),
            scalar!("readinessFailureThreshold"),
        ],
    },
    deployment(FeatureArea::Policy, "policy", "mixer.policy", &[IMAGE]),
    deployment(
        FeatureArea::Telemetry,
        "telemetry",
        "mixer.telemetry",
        &[
            IMAGE,
            scalar!("reportBatchMaxEntries"),
            scalar!("reportBatchMaxTime"),
        ],
    ),
    deployment(FeatureArea::ConfigManagement, "galley", "galley", &[IMAGE]),
    deployment(FeatureArea::Security, "citadel", "citadel", &[IMAGE]),
    deployment(FeatureArea::Security, "nodeAgent", "nodeagent", &[IMAGE]),
    deployment(FeatureArea::Security, "certManager", "certmanager", &[IMAGE]),
    deployment(
        FeatureArea::Gateways,
        "ingressGateway",
        "gateways.istio-ingressgateway",
        &[],
    ),
    deployment(
        FeatureArea::Gateways,
        "egressGateway",
        "gateways.istio-egressgateway",
        &[],
    ),
    deployment(
        FeatureArea::AutoInjection,
        "injector",
        "sidecarInjectorWebhook",
        &[IMAGE, scalar!("rewriteAppHTTPProbe")],
    ),
];

static V1_4: VersionTable = VersionTable {
    version: MinorVersion::new(1, 4),
    components: V1_4_COMPONENTS,
    globals: V1_3_GLOBALS,
    area_overrides: V1_3_AREA_OVERRIDES,
};

// =============================================================================
// REGISTRY
// =============================================================================

/// Registered tables keyed by `major.minor`
static REGISTRY: phf::Map<&'static str, &'static VersionTable> = phf_map! {
    "1.3" => &V1_3,
    "1.4" => &V1_4,
};

/// Look up the table registered for `version`
pub fn lookup(version: MinorVersion) -> Result<&'static VersionTable> {
    REGISTRY
        .get(version.to_string().as_str())
        .copied()
        .ok_or_else(|| TranslateError::UnsupportedVersion {
            version: version.to_string(),
            supported: supported_versions()
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// All registered versions, oldest first
pub fn supported_versions() -> Vec<MinorVersion> {
    let mut versions: Vec<_> = REGISTRY.values().map(|t| t.version).collect();
    versions.sort();
    versions
}

/// Newest registered version
pub fn latest_version() -> Option<MinorVersion> {
    supported_versions().into_iter().last()
}

// =============================================================================
// RULE SETS
// =============================================================================

/// A single source → destination declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    pub source: ValuePath,
    pub destination: ValuePath,
    pub transform: Transform,
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.source, self.destination, self.transform)
    }
}

/// Component entry of a rule set, used by the enablement aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSlot {
    pub area: FeatureArea,
    pub name: &'static str,
    pub default_enabled: Option<bool>,
}

impl ComponentSlot {
    /// Path of this component's `enabled` flag in the spec
    pub fn enabled_path(&self) -> ValuePath {
        component_root(self.area, self.name)
            .child("common")
            .child("enabled")
    }
}

/// Expanded, validated rules for one version
#[derive(Debug, Clone)]
pub struct RuleSet {
    version: MinorVersion,
    rules: Vec<MappingRule>,
    components: Vec<ComponentSlot>,
    area_overrides: Vec<(FeatureArea, ValuePath)>,
}

impl RuleSet {
    /// Expand a version table into flat rules
    ///
    /// Fails if a path in the table is malformed or two rules write
    /// overlapping destinations.
    pub fn from_table(table: &VersionTable) -> Result<Self> {
        let mut rules = Vec::new();
        let mut components = Vec::new();

        for global in table.globals {
            rules.push(MappingRule {
                source: ValuePath::parse(global.source)?,
                destination: ValuePath::parse(global.destination)?,
                transform: global.transform,
            });
        }

        for component in table.components {
            let source = ValuePath::parse(component.source)?;
            let common = component_root(component.area, component.name).child("common");

            if component.kind == ComponentKind::Deployment {
                rules.push(MappingRule {
                    source: source.child("enabled"),
                    destination: common.child("enabled"),
                    transform: Transform::Copy,
                });

                let k8s = common.child("k8s");
                for (field, target, transform) in K8S_FIELDS {
                    rules.push(MappingRule {
                        source: source.child(*field),
                        destination: k8s.child(*target),
                        transform: *transform,
                    });
                }
                rules.push(MappingRule {
                    source: source.clone(),
                    destination: k8s.child("hpaSpec"),
                    transform: Transform::AutoscaleRange,
                });
            }

            let values = common.child("values");
            for (field, target, transform) in component.values {
                rules.push(MappingRule {
                    source: source.child(*field),
                    destination: values.child(*target),
                    transform: *transform,
                });
            }

            components.push(ComponentSlot {
                area: component.area,
                name: component.name,
                default_enabled: component.default_enabled,
            });
        }

        let area_overrides = table
            .area_overrides
            .iter()
            .map(|o| Ok((o.area, ValuePath::parse(o.source)?)))
            .collect::<Result<Vec<_>>>()?;

        validate_disjoint(&rules)?;

        Ok(Self {
            version: table.version,
            rules,
            components,
            area_overrides,
        })
    }

    /// Look up and expand the table for `version`
    pub fn for_version(version: MinorVersion) -> Result<Self> {
        Self::from_table(lookup(version)?)
    }

    pub fn version(&self) -> MinorVersion {
        self.version
    }

    /// Rules in table order
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn components(&self) -> &[ComponentSlot] {
        &self.components
    }

    /// Components belonging to `area`
    pub fn components_in(&self, area: FeatureArea) -> impl Iterator<Item = &ComponentSlot> {
        self.components.iter().filter(move |c| c.area == area)
    }

    /// Legacy path that overrides `area`'s `enabled`, if any
    pub fn area_override(&self, area: FeatureArea) -> Option<&ValuePath> {
        self.area_overrides
            .iter()
            .find(|(a, _)| *a == area)
            .map(|(_, path)| path)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// `<area>.components.<name>` in the spec
pub fn component_root(area: FeatureArea, name: &str) -> ValuePath {
    ValuePath::root()
        .child(area.key())
        .child("components")
        .child(name)
}

fn validate_disjoint(rules: &[MappingRule]) -> Result<()> {
    for (i, first) in rules.iter().enumerate() {
        for second in &rules[i + 1..] {
            if first.destination.overlaps(&second.destination) {
                tracing::warn!(
                    first = %first,
                    second = %second,
                    "mapping table has overlapping destinations"
                );
                return Err(TranslateError::OverlappingRules {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }
    Ok(())
}
