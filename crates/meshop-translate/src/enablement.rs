//! Enablement aggregation
//!
//! Runs once every field rule has been applied. Each component with a
//! version default gets an explicit `common.enabled`, then each feature area
//! moves from unset to computed: an area-level override from the legacy
//! document wins, otherwise the area is enabled iff any of its components is.
//! Nothing reads or writes `enabled` after this step.

use meshop_core::path::{self, kind_name};
use meshop_core::{FeatureArea, ValuePath, Values};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::{Result, TranslateError};
use crate::mapping::RuleSet;

/// Where an area's `enabled` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnablementOrigin {
    /// Set directly by an area-level field in the legacy document
    Override,
    /// Logical OR of the area's components
    Components,
}

impl fmt::Display for EnablementOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Components => write!(f, "components"),
        }
    }
}

/// Aggregation state of one feature area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaState {
    /// No component carries an `enabled` and nothing overrides the area
    Unset,
    Computed {
        enabled: bool,
        origin: EnablementOrigin,
    },
}

/// Final enablement of one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEnablement {
    pub name: &'static str,
    pub enabled: bool,
    /// True when the value came from the version default table
    pub defaulted: bool,
}

/// Final enablement of one feature area and its components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaEnablement {
    pub area: FeatureArea,
    pub state: AreaState,
    pub components: Vec<ComponentEnablement>,
}

impl AreaEnablement {
    pub fn enabled(&self) -> Option<bool> {
        match self.state {
            AreaState::Unset => None,
            AreaState::Computed { enabled, .. } => Some(enabled),
        }
    }
}

/// Computes `enabled` flags for one rule set
pub struct EnablementAggregator<'a> {
    rules: &'a RuleSet,
}

impl<'a> EnablementAggregator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Fill in component defaults and area flags in `tree`
    pub fn aggregate(&self, source: &Values, tree: &mut JsonValue) -> Result<Vec<AreaEnablement>> {
        let mut report = Vec::new();

        for area in FeatureArea::ALL {
            let mut components = Vec::new();

            for slot in self.rules.components_in(area) {
                let enabled_path = slot.enabled_path();
                let (enabled, defaulted) = match path::get(tree, &enabled_path) {
                    Some(JsonValue::Bool(b)) => (*b, false),
                    Some(JsonValue::Null) | None => match slot.default_enabled {
                        Some(default) => {
                            path::set(tree, &enabled_path, JsonValue::Bool(default))?;
                            (default, true)
                        }
                        None => continue,
                    },
                    Some(other) => {
                        return Err(TranslateError::invalid_value(
                            enabled_path,
                            "a boolean",
                            kind_name(other),
                        ));
                    }
                };

                components.push(ComponentEnablement {
                    name: slot.name,
                    enabled,
                    defaulted,
                });
            }

            let state = self.area_state(area, source, &components)?;
            if let AreaState::Computed { enabled, origin } = state {
                let area_path = ValuePath::root().child(area.key()).child("enabled");
                path::set(tree, &area_path, JsonValue::Bool(enabled))?;
                tracing::debug!(area = %area, enabled, origin = %origin, "area enablement computed");
            }

            report.push(AreaEnablement {
                area,
                state,
                components,
            });
        }

        Ok(report)
    }

    fn area_state(
        &self,
        area: FeatureArea,
        source: &Values,
        components: &[ComponentEnablement],
    ) -> Result<AreaState> {
        if let Some(override_path) = self.rules.area_override(area)
            && let Some(value) = source.get(override_path)
        {
            return match value {
                JsonValue::Bool(enabled) => Ok(AreaState::Computed {
                    enabled: *enabled,
                    origin: EnablementOrigin::Override,
                }),
                other => Err(TranslateError::invalid_value(
                    override_path,
                    "a boolean",
                    kind_name(other),
                )),
            };
        }

        if components.is_empty() {
            return Ok(AreaState::Unset);
        }

        Ok(AreaState::Computed {
            enabled: components.iter().any(|c| c.enabled),
            origin: EnablementOrigin::Components,
        })
    }
}
