//! Meshop Core - shared types for translating legacy mesh installation values
//!
//! This crate provides the foundational types used throughout meshop:
//! - `Values`: the loosely-typed legacy values document
//! - `ValuePath`: path expressions with sparse-aware `get` and `set`
//! - `MinorVersion`: the schema version key
//! - `ControlPlaneSpec`: the strongly-shaped installation specification

pub mod error;
pub mod path;
pub mod spec;
pub mod values;
pub mod version;

pub use error::{CoreError, Result};
pub use path::{PathSegment, ValuePath};
pub use spec::{
    Affinity, CommonComponentSpec, ComponentSpec, ControlPlaneSpec, EnvVar, FeatureArea,
    FeatureComponents, FeatureSpec, HorizontalPodAutoscalerSpec, KubernetesResourceSpec,
    LabelSelector, PodAffinityTerm, PodAntiAffinity, Resources,
};
pub use values::Values;
pub use version::MinorVersion;
