//! Property-based checks of translation behaviour
//!
//! - Area enablement is the OR of its components unless overridden.
//! - Translating the same document twice gives the same spec.
//! - Environment lists are sorted and complete whatever the input order.
//! - Fields absent from the source stay absent from the spec.

use std::collections::BTreeMap;

use meshop_core::{FeatureArea, MinorVersion, Values};
use meshop_translate::ReverseTranslator;
use proptest::prelude::*;
use serde_json::{Value as JsonValue, json};

fn translator() -> ReverseTranslator {
    ReverseTranslator::new(MinorVersion::new(1, 3)).unwrap()
}

fn security_values(
    citadel: Option<bool>,
    node_agent: Option<bool>,
    cert_manager: Option<bool>,
) -> Values {
    let mut values = Values::new();
    for (source, enabled) in [
        ("citadel", citadel),
        ("nodeagent", node_agent),
        ("certmanager", cert_manager),
    ] {
        if let Some(enabled) = enabled {
            values
                .set(&format!("{}.enabled", source), JsonValue::Bool(enabled))
                .unwrap();
        }
    }
    values
}

proptest! {
    #[test]
    fn area_enabled_is_or_of_components(
        citadel in proptest::option::of(any::<bool>()),
        node_agent in proptest::option::of(any::<bool>()),
        cert_manager in proptest::option::of(any::<bool>()),
    ) {
        let values = security_values(citadel, node_agent, cert_manager);
        let spec = translator().translate(&values).unwrap();

        let expected = [citadel, node_agent, cert_manager]
            .iter()
            .any(|c| c.unwrap_or(false));
        let security = spec.feature(FeatureArea::Security).unwrap();
        prop_assert_eq!(security.enabled, Some(expected));

        for name in ["citadel", "nodeAgent", "certManager"] {
            let component = spec.component(FeatureArea::Security, name).unwrap();
            prop_assert!(component.enabled().is_some());
        }
    }

    #[test]
    fn gateway_override_wins(
        ingress in any::<bool>(),
        egress in any::<bool>(),
        area in any::<bool>(),
    ) {
        let values = Values::from(json!({
            "gateways": {
                "enabled": area,
                "istio-ingressgateway": {"enabled": ingress},
                "istio-egressgateway": {"enabled": egress},
            }
        }));
        let spec = translator().translate(&values).unwrap();
        prop_assert_eq!(spec.feature(FeatureArea::Gateways).unwrap().enabled, Some(area));
    }

    #[test]
    fn translation_is_deterministic(
        pilot in proptest::option::of(any::<bool>()),
        replicas in proptest::option::of(0u32..10),
    ) {
        let mut values = Values::new();
        if let Some(enabled) = pilot {
            values.set("pilot.enabled", JsonValue::Bool(enabled)).unwrap();
        }
        if let Some(count) = replicas {
            values.set("pilot.replicaCount", json!(count)).unwrap();
        }

        let translator = translator();
        let first = translator.translate(&values).unwrap();
        let second = translator.translate(&values).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn env_list_sorted_and_complete(
        env in proptest::collection::btree_map("[A-Z][A-Z0-9_]{0,7}", "[a-z0-9=.]{0,8}", 0..8),
    ) {
        // Insert in reverse order to make sure input order does not leak through
        let mut object = serde_json::Map::new();
        for (name, value) in env.iter().rev() {
            object.insert(name.clone(), JsonValue::String(value.clone()));
        }
        let values = Values::from(json!({"galley": {"env": object}}));

        let spec = translator().translate(&values).unwrap();
        let list = spec
            .component(FeatureArea::ConfigManagement, "galley")
            .and_then(|c| c.k8s())
            .and_then(|k| k.env.clone())
            .unwrap();

        let got: BTreeMap<String, String> =
            list.iter().map(|e| (e.name.clone(), e.value.clone())).collect();
        prop_assert_eq!(&got, &env);

        let names: Vec<&String> = list.iter().map(|e| &e.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        prop_assert_eq!(names, sorted);
    }

    #[test]
    fn absent_fields_stay_absent(image in proptest::option::of("[a-z]{1,8}")) {
        let mut values = Values::from(json!({"mixer": {"policy": {"enabled": true}}}));
        if let Some(image) = &image {
            values.set("mixer.policy.image", json!(image)).unwrap();
        }

        let spec = translator().translate(&values).unwrap();
        let policy = spec.component(FeatureArea::Policy, "policy").unwrap();
        prop_assert!(policy.k8s().is_none());
        match image {
            Some(image) => {
                prop_assert_eq!(
                    policy.values().and_then(|v| v.get("image")).cloned(),
                    Some(JsonValue::String(image))
                );
            }
            None => {
                prop_assert!(policy.values().is_none());
            }
        }
    }
}
