//! Path expressions over loosely-typed value trees
//!
//! A path is a sequence of field names and list indices written as
//! `pilot.podAntiAffinityLabelSelector[0].labelSelector`. Reading a path never
//! fails: a missing intermediate node simply means the value is absent, which
//! is the normal case for sparse legacy documents. Writing a path creates the
//! intermediate maps and lists it needs, and refuses to replace a scalar that
//! sits where a container is required.

use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// One step of a [`ValuePath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Field of a map
    Key(String),
    /// Element of a list
    Index(usize),
}

impl PathSegment {
    fn container_name(&self) -> &'static str {
        match self {
            Self::Key(_) => "a map",
            Self::Index(_) => "a list",
        }
    }
}

/// Parsed path expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    /// The empty path, addressing the root of a tree
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path expression such as `gateways.istio-ingressgateway.env`
    /// or `items[2].name`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut chars = input.chars().peekable();
        let mut key = String::new();
        // Set after a closing bracket, where a key may not follow directly
        let mut after_index = false;
        let mut prev = None;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && !after_index {
                        return Err(invalid("empty field name"));
                    }
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    after_index = false;
                    if chars.peek().is_none() {
                        return Err(invalid("trailing '.'"));
                    }
                }
                '[' => {
                    if key.is_empty() && prev == Some('.') {
                        return Err(invalid("empty field name"));
                    }
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            Some(_) => return Err(invalid("list index must be a number")),
                            None => return Err(invalid("unclosed '['")),
                        }
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid("list index must be a number"))?;
                    segments.push(PathSegment::Index(index));
                    after_index = true;
                }
                ']' => return Err(invalid("unexpected ']'")),
                other => {
                    if after_index {
                        return Err(invalid("expected '.' or '[' after list index"));
                    }
                    key.push(other);
                }
            }
            prev = Some(c);
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        }

        Ok(Self { segments })
    }

    /// Path segments in order
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a field name
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Append all segments of another path
    pub fn join(&self, other: &ValuePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Returns true if `prefix` addresses this path or one of its ancestors
    pub fn starts_with(&self, prefix: &ValuePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns true if either path is a prefix of the other, i.e. writing one
    /// would clobber or be clobbered by writing the other
    pub fn overlaps(&self, other: &ValuePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl FromStr for ValuePath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", key)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Human-readable name of a JSON value's shape, for error messages
pub fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a map",
    }
}

/// Read the value at `path`
///
/// Map keys are matched exactly first; when no exact key exists an ASCII
/// case-insensitive match is accepted, as legacy decoders did.
pub fn get<'a>(tree: &'a JsonValue, path: &ValuePath) -> Option<&'a JsonValue> {
    let mut current = tree;
    for segment in &path.segments {
        current = match (segment, current) {
            (PathSegment::Key(key), JsonValue::Object(map)) => lookup_key(map, key)?,
            (PathSegment::Index(index), JsonValue::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

fn lookup_key<'a>(map: &'a Map<String, JsonValue>, key: &str) -> Option<&'a JsonValue> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Write `value` at `path`, creating intermediate containers
///
/// The whole path is checked before anything is modified, so a conflict
/// leaves `tree` untouched.
pub fn set(tree: &mut JsonValue, path: &ValuePath, value: JsonValue) -> Result<()> {
    check_writable(tree, path)?;
    write_segments(tree, &path.segments, value);
    Ok(())
}

fn check_writable(tree: &JsonValue, path: &ValuePath) -> Result<()> {
    let mut current = Some(tree);
    for (depth, segment) in path.segments.iter().enumerate() {
        let Some(node) = current else {
            // Everything below a missing node gets created
            return Ok(());
        };
        current = match (segment, node) {
            (_, JsonValue::Null) => None,
            (PathSegment::Key(key), JsonValue::Object(map)) => map.get(key.as_str()),
            (PathSegment::Index(index), JsonValue::Array(items)) => items.get(*index),
            (segment, found) => {
                return Err(CoreError::PathConflict {
                    path: ValuePath {
                        segments: path.segments[..depth].to_vec(),
                    }
                    .to_string(),
                    expected: segment.container_name(),
                    found: kind_name(found),
                });
            }
        };
    }
    Ok(())
}

fn write_segments(node: &mut JsonValue, segments: &[PathSegment], value: JsonValue) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    match head {
        PathSegment::Key(key) => {
            if !node.is_object() {
                *node = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(map) = node {
                let child = map.entry(key.clone()).or_insert(JsonValue::Null);
                write_segments(child, rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !node.is_array() {
                *node = JsonValue::Array(Vec::new());
            }
            if let JsonValue::Array(items) = node {
                if items.len() <= *index {
                    items.resize(index + 1, JsonValue::Null);
                }
                write_segments(&mut items[*index], rest, value);
            }
        }
    }
}
