//! Value transformers
//!
//! Most legacy fields copy straight across, but a few change shape between
//! the values document and the spec. Each transformer here is a pure function
//! of the raw source value: it never mutates its input, and on failure it
//! returns an error and no partial output.
//!
//! | Transformer               | Legacy shape                         | Spec shape                              |
//! |---------------------------|--------------------------------------|-----------------------------------------|
//! | `EnvMapToList`            | `env: {NAME: value}`                 | `env: [{name, value}]`, sorted by name  |
//! | `AutoscaleRange`          | `autoscaleEnabled/Min/Max` scalars   | `hpaSpec: {minReplicas, maxReplicas}`   |
//! | `LabelSelectorToAffinity` | `podAntiAffinityLabelSelector: [..]` | `affinity.podAntiAffinity.required..`   |
//! | `ResourceRequests`        | `resources: {requests: {cpu: 1}}`    | same, quantities as strings             |
//! | `ScalarOverride`          | `traceSampling: "1.0"`               | `values.traceSampling: 1`               |

use meshop_core::path::{self, kind_name};
use meshop_core::ValuePath;
use serde_json::{Map, Value as JsonValue, json};

use crate::error::{Result, TranslateError};

/// Sections of a resource requirements map
const RESOURCE_SECTIONS: &[&str] = &["requests", "limits"];

/// Largest integer an f64 represents exactly
const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

/// Conversion applied by a mapping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Identity copy
    Copy,
    /// Scalar rendered as a string
    Text,
    /// Map whose scalar values are rendered as strings
    StringMap,
    /// Chart value override; numeric strings become numbers
    ScalarOverride,
    /// `{NAME: value}` to a sorted `[{name, value}]` list
    EnvMapToList,
    /// Component node to an autoscaler range, or nothing when autoscaling is off
    AutoscaleRange,
    /// Label selector terms wrapped in a required pod anti-affinity
    LabelSelectorToAffinity,
    /// Resource requirements with quantities preserved as written
    ResourceRequests,
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Text => "text",
            Self::StringMap => "string-map",
            Self::ScalarOverride => "scalar-override",
            Self::EnvMapToList => "env-map-to-list",
            Self::AutoscaleRange => "autoscale-range",
            Self::LabelSelectorToAffinity => "label-selector-to-affinity",
            Self::ResourceRequests => "resource-requests",
        }
    }

    /// Apply this transform to the value found at `source`
    ///
    /// `Ok(None)` means the destination field must be left out.
    pub fn apply(&self, source: &ValuePath, raw: &JsonValue) -> Result<Option<JsonValue>> {
        let value = match self {
            Self::Copy => raw.clone(),
            Self::Text => text(source, raw)?,
            Self::StringMap => string_map(source, raw)?,
            Self::ScalarOverride => scalar_override(raw),
            Self::EnvMapToList => env_map_to_list(source, raw)?,
            Self::AutoscaleRange => return autoscale_range(source, raw),
            Self::LabelSelectorToAffinity => label_selector_to_affinity(source, raw)?,
            Self::ResourceRequests => resource_requests(source, raw)?,
        };
        Ok(Some(value))
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TRANSFORMERS
// =============================================================================

/// Convert an environment map into a list of `{name, value}` records sorted
/// by name. An empty map yields an empty list.
pub fn env_map_to_list(source: &ValuePath, raw: &JsonValue) -> Result<JsonValue> {
    let JsonValue::Object(map) = raw else {
        return Err(TranslateError::invalid_value(
            source,
            "a map of environment variables",
            kind_name(raw),
        ));
    };

    let mut entries = Vec::with_capacity(map.len());
    for (name, value) in map {
        let value = match value {
            JsonValue::Null => String::new(),
            other => scalar_text(other).ok_or_else(|| {
                TranslateError::invalid_value(source.child(name), "a scalar", kind_name(other))
            })?,
        };
        entries.push((name.clone(), value));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(JsonValue::Array(
        entries
            .into_iter()
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect(),
    ))
}

/// Build an autoscaler range from a component node's `autoscaleEnabled`,
/// `autoscaleMin` and `autoscaleMax` fields.
///
/// Returns `None` unless autoscaling is explicitly enabled.
pub fn autoscale_range(source: &ValuePath, raw: &JsonValue) -> Result<Option<JsonValue>> {
    if !raw.is_object() {
        return Err(TranslateError::invalid_value(source, "a component map", kind_name(raw)));
    }

    let enabled_path = source.child("autoscaleEnabled");
    match field(raw, "autoscaleEnabled") {
        None | Some(JsonValue::Bool(false)) => return Ok(None),
        Some(JsonValue::Bool(true)) => {}
        Some(other) => {
            return Err(TranslateError::invalid_value(
                enabled_path,
                "a boolean",
                kind_name(other),
            ));
        }
    }

    let min = replica_bound(source, raw, "autoscaleMin")?;
    let max = replica_bound(source, raw, "autoscaleMax")?;

    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(TranslateError::InvalidRange {
            path: source.to_string(),
            min: u64::from(min),
            max: u64::from(max),
        });
    }

    let mut hpa = Map::new();
    if let Some(min) = min {
        hpa.insert("minReplicas".to_string(), JsonValue::from(min));
    }
    if let Some(max) = max {
        hpa.insert("maxReplicas".to_string(), JsonValue::from(max));
    }
    hpa.insert("scaleTargetRef".to_string(), JsonValue::Object(Map::new()));

    Ok(Some(JsonValue::Object(hpa)))
}

/// Wrap label selector terms under a required pod anti-affinity
pub fn label_selector_to_affinity(source: &ValuePath, raw: &JsonValue) -> Result<JsonValue> {
    let JsonValue::Array(terms) = raw else {
        return Err(TranslateError::invalid_value(
            source,
            "a list of label selector terms",
            kind_name(raw),
        ));
    };

    for (index, term) in terms.iter().enumerate() {
        if !term.is_object() {
            return Err(TranslateError::invalid_value(
                format!("{}[{}]", source, index),
                "a label selector term map",
                kind_name(term),
            ));
        }
    }

    Ok(json!({
        "podAntiAffinity": {
            "requiredDuringSchedulingIgnoredDuringExecution": terms,
        }
    }))
}

/// Pass resource requirements through, rendering every quantity as text.
/// Units are not interpreted here. Only `requests` and `limits` are accepted.
pub fn resource_requests(source: &ValuePath, raw: &JsonValue) -> Result<JsonValue> {
    let JsonValue::Object(sections) = raw else {
        return Err(TranslateError::invalid_value(
            source,
            "a resource requirements map",
            kind_name(raw),
        ));
    };

    let mut out = Map::new();
    for (section, quantities) in sections {
        let section_path = source.child(section);
        if !RESOURCE_SECTIONS.contains(&section.as_str()) {
            return Err(TranslateError::invalid_value(
                section_path,
                "`requests` or `limits`",
                format!("unknown section '{}'", section),
            ));
        }
        if quantities.is_null() {
            continue;
        }
        out.insert(section.clone(), string_map(&section_path, quantities)?);
    }
    Ok(JsonValue::Object(out))
}

/// Copy a chart value override, turning numeric strings and integral floats
/// into integers (`"1.0"` and `1.0` both become `1`)
pub fn scalar_override(raw: &JsonValue) -> JsonValue {
    match raw {
        JsonValue::String(s) => parse_numeric(s).unwrap_or_else(|| raw.clone()),
        JsonValue::Number(n) if n.is_f64() => n
            .as_f64()
            .and_then(number_from_f64)
            .unwrap_or_else(|| raw.clone()),
        other => other.clone(),
    }
}

/// Render a scalar as a string
pub fn text(source: &ValuePath, raw: &JsonValue) -> Result<JsonValue> {
    scalar_text(raw)
        .map(JsonValue::String)
        .ok_or_else(|| TranslateError::invalid_value(source, "a scalar", kind_name(raw)))
}

/// Render every value of a flat map as a string
pub fn string_map(source: &ValuePath, raw: &JsonValue) -> Result<JsonValue> {
    let JsonValue::Object(map) = raw else {
        return Err(TranslateError::invalid_value(source, "a map", kind_name(raw)));
    };

    let mut out = Map::new();
    for (key, value) in map {
        let rendered = scalar_text(value).ok_or_else(|| {
            TranslateError::invalid_value(source.child(key), "a scalar", kind_name(value))
        })?;
        out.insert(key.clone(), JsonValue::String(rendered));
    }
    Ok(JsonValue::Object(out))
}

// =============================================================================
// HELPERS
// =============================================================================

fn field<'a>(node: &'a JsonValue, name: &str) -> Option<&'a JsonValue> {
    path::get(node, &ValuePath::root().child(name)).filter(|v| !v.is_null())
}

fn replica_bound(source: &ValuePath, node: &JsonValue, name: &str) -> Result<Option<u32>> {
    let Some(raw) = field(node, name) else {
        return Ok(None);
    };

    let parsed = match raw {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            TranslateError::invalid_value(
                source.child(name),
                "a non-negative replica count",
                describe(raw),
            )
        })
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_numeric(s: &str) -> Option<JsonValue> {
    let trimmed = s.trim();
    let looks_numeric = trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }

    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(JsonValue::from(int));
    }
    trimmed.parse::<f64>().ok().and_then(number_from_f64)
}

fn number_from_f64(f: f64) -> Option<JsonValue> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f.abs() < MAX_EXACT_F64_INT {
        return Some(if f >= 0.0 {
            JsonValue::from(f as u64)
        } else {
            JsonValue::from(f as i64)
        });
    }
    serde_json::Number::from_f64(f).map(JsonValue::Number)
}

fn describe(value: &JsonValue) -> String {
    match value {
        JsonValue::Number(n) => format!("{} ({})", kind_name(value), n),
        JsonValue::String(s) => format!("{} ({:?})", kind_name(value), s),
        other => kind_name(other).to_string(),
    }
}
