//! Integration tests for CLI commands

use std::process::Command;
use tempfile::TempDir;

/// Helper to run meshop with an isolated, empty config
fn meshop(args: &[&str]) -> std::process::Output {
    let home = TempDir::new().expect("Failed to create temp dir");
    Command::new(env!("CARGO_BIN_EXE_meshop"))
        .args(args)
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("MESHOP_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute meshop")
}

/// Get the values fixtures path
fn fixture(name: &str) -> String {
    format!(
        "{}/../../fixtures/values/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    )
}

mod translate_command {
    use super::*;

    #[test]
    fn test_translate_to_yaml() {
        let output = meshop(&[
            "translate",
            &fixture("k8s-resources.yaml"),
            "--schema-version",
            "1.3",
        ]);

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let spec: serde_yaml::Value =
            serde_yaml::from_slice(&output.stdout).expect("Output should be valid YAML");

        assert_eq!(spec["hub"], serde_yaml::Value::from("docker.io/istio"));
        assert_eq!(spec["defaultNamespace"], serde_yaml::Value::from("istio-system"));
        let pilot = &spec["trafficManagement"]["components"]["pilot"]["common"];
        assert_eq!(pilot["enabled"], serde_yaml::Value::from(true));
        assert_eq!(pilot["k8s"]["hpaSpec"]["maxReplicas"], serde_yaml::Value::from(3));
        assert_eq!(pilot["values"]["traceSampling"], serde_yaml::Value::from(1));
    }

    #[test]
    fn test_translate_to_json() {
        let output = meshop(&[
            "translate",
            &fixture("gateways-disabled.yaml"),
            "--output",
            "json",
        ]);

        assert!(output.status.success());
        let spec: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");

        assert_eq!(spec["gateways"]["enabled"], serde_json::json!(false));
        assert_eq!(
            spec["gateways"]["components"]["ingressGateway"]["common"]["enabled"],
            serde_json::json!(true)
        );
        assert_eq!(
            spec["gateways"]["components"]["ingressGateway"]["common"]["k8s"]["replicaCount"],
            serde_json::json!(2)
        );
    }

    #[test]
    fn test_translate_to_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("spec.yaml");

        let output = meshop(&[
            "translate",
            &fixture("gateways-disabled.yaml"),
            "--out",
            out.to_str().unwrap(),
        ]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Wrote"));

        let written = std::fs::read_to_string(&out).unwrap();
        let spec: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(spec["tag"], serde_yaml::Value::from("1.3.0"));
    }

    #[test]
    fn test_verbose_reports_enablement_on_stderr() {
        let output = meshop(&[
            "translate",
            &fixture("gateways-disabled.yaml"),
            "--verbose",
        ]);

        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("gateways"));
        assert!(stderr.contains("override"));
    }

    #[test]
    fn test_invalid_range_exit_code() {
        let output = meshop(&["translate", &fixture("invalid-range.yaml")]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("autoscaleMin") || stderr.contains("minimum"));
    }

    #[test]
    fn test_non_mapping_document_is_input_error() {
        let output = meshop(&["translate", &fixture("not-a-mapping.yaml")]);
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let output = meshop(&["translate", &fixture("does-not-exist.yaml")]);
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_unsupported_version() {
        let output = meshop(&[
            "translate",
            &fixture("gateways-disabled.yaml"),
            "--schema-version",
            "1.1",
        ]);

        assert_eq!(output.status.code(), Some(4));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("1.3"));
    }

    #[test]
    fn test_malformed_version_is_usage_error() {
        let output = meshop(&[
            "translate",
            &fixture("gateways-disabled.yaml"),
            "--schema-version",
            "latest",
        ]);
        assert_eq!(output.status.code(), Some(64));
    }
}

mod config_file {
    use super::*;

    #[test]
    fn test_config_sets_default_output() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        std::fs::write(&config, "output: json\ndefaultVersion: \"1.3\"\n").unwrap();

        let output = meshop(&[
            "--config",
            config.to_str().unwrap(),
            "translate",
            &fixture("gateways-disabled.yaml"),
        ]);

        assert!(output.status.success());
        let spec: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        assert_eq!(spec["hub"], serde_json::json!("gcr.io/istio"));
    }

    #[test]
    fn test_flag_overrides_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        std::fs::write(&config, "output: json\n").unwrap();

        let output = meshop(&[
            "--config",
            config.to_str().unwrap(),
            "translate",
            &fixture("gateways-disabled.yaml"),
            "--output",
            "yaml",
        ]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("hub:") || stdout.contains("\nhub:"));
        assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_err());
    }

    #[test]
    fn test_invalid_config_is_input_error() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        std::fs::write(&config, "output: xml\n").unwrap();

        let output = meshop(&["--config", config.to_str().unwrap(), "versions"]);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod listing_commands {
    use super::*;

    #[test]
    fn test_versions_lists_tables() {
        let output = meshop(&["versions"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("1.3"));
        assert!(stdout.contains("1.4"));
    }

    #[test]
    fn test_rules_for_version() {
        let output = meshop(&["rules", "--schema-version", "1.4"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("pilot.keepaliveMaxServerConnectionAge"));
        assert!(stdout.contains("gateways.enabled"));
    }

    #[test]
    fn test_rules_omits_newer_fields_for_older_version() {
        let output = meshop(&["rules", "--schema-version", "1.3"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("keepaliveMaxServerConnectionAge"));
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        let output = meshop(&["versions", "--bogus"]);
        assert_eq!(output.status.code(), Some(64));
    }
}
