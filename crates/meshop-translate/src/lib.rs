//! Meshop Translate - legacy values to control plane spec translation
//!
//! Installations used to be configured with a Helm-style values document.
//! This crate turns such a document into the grouped, explicitly-enabled
//! [`ControlPlaneSpec`](meshop_core::ControlPlaneSpec):
//!
//! | Legacy values                          | Spec                                                   |
//! |----------------------------------------|--------------------------------------------------------|
//! | `pilot.enabled: true`                  | `trafficManagement.components.pilot.common.enabled`    |
//! | `pilot.env: {GODEBUG: gctrace=1}`      | `...pilot.common.k8s.env: [{name, value}]`             |
//! | `pilot.autoscaleMin/Max`               | `...pilot.common.k8s.hpaSpec`                          |
//! | `mixer.policy.image: mixer`            | `policy.components.policy.common.values.image`         |
//! | `global.hub`                           | `hub`                                                  |
//!
//! # Example
//!
//! ```
//! use meshop_core::{MinorVersion, Values};
//! use meshop_translate::ReverseTranslator;
//!
//! let values = Values::from_yaml(r#"
//! global:
//!   hub: docker.io/istio
//! galley:
//!   enabled: false
//! "#).unwrap();
//!
//! let translator = ReverseTranslator::new(MinorVersion::new(1, 3)).unwrap();
//! let spec = translator.translate(&values).unwrap();
//!
//! assert_eq!(spec.hub.as_deref(), Some("docker.io/istio"));
//! assert_eq!(spec.config_management.unwrap().enabled, Some(false));
//! ```
//!
//! Translation is pure and synchronous. A translator holds only immutable
//! rules, so one instance can be shared across threads.

pub mod enablement;
pub mod error;
pub mod mapping;
pub mod transformer;
pub mod translator;

// Re-exports
pub use enablement::{AreaEnablement, AreaState, ComponentEnablement, EnablementOrigin};
pub use error::{Result, TranslateError};
pub use mapping::{MappingRule, RuleSet, latest_version, lookup, supported_versions};
pub use transformer::Transform;
pub use translator::{ReverseTranslator, TranslationReport, translate};
