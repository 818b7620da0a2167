//! Integration tests for the DNA Center credential type
//!
//! Covers:
//! - Both built-in field orders against the credential contract
//! - Order independence of the input schema
//! - Rendering the injector environment and keeping the password out of logs
//! - Loading credential documents from disk
//! - Resolving the inventory source against the rendered environment

use dnac_credential_core::inventory::{
    devices_from_value, sites_from_value, topology_from_value, InventoryBuilder,
    RawInventoryOptions,
};
use dnac_credential_core::loader;
use dnac_credential_core::{
    CredentialDefinition, CredentialError, CredentialInputs, CredentialType, FieldDescriptor,
    InjectorMapping, InjectorRenderer, InventoryOptions, RenderError, SecretScrubber,
    ValidationContext, Validator, Variant, CONTRACT_BINDINGS, CONTRACT_FIELDS,
};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Helper to build inputs for a credential type
fn create_inputs(ct: &CredentialType, host: &str, username: &str, password: &str) -> CredentialInputs {
    CredentialInputs::from_values(
        &ct.inputs,
        [("host", host), ("username", username), ("password", password)],
    )
}

/// Helper to write a file into a temp dir
fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn contract_set() -> BTreeSet<&'static str> {
    CONTRACT_FIELDS.iter().copied().collect()
}

#[test]
fn test_field_ids_match_contract_for_both_variants() {
    for variant in Variant::ALL {
        let ct = CredentialType::builtin(variant);
        assert_eq!(ct.inputs.id_set(), contract_set(), "variant {}", variant);
        assert_eq!(ct.inputs.fields.len(), 3);
    }
}

#[test]
fn test_required_matches_contract_for_both_variants() {
    for variant in Variant::ALL {
        let ct = CredentialType::builtin(variant);
        assert_eq!(ct.inputs.required_set(), contract_set(), "variant {}", variant);
    }
}

#[test]
fn test_password_always_secret() {
    for variant in Variant::ALL {
        let ct = CredentialType::builtin(variant);
        assert!(ct.inputs.field("password").unwrap().secret);
        assert!(!ct.inputs.field("host").unwrap().secret);
    }
}

#[test]
fn test_env_mapping_is_exactly_the_contract() {
    for variant in Variant::ALL {
        let ct = CredentialType::builtin(variant);
        assert_eq!(ct.injectors.env.len(), 3);
        for (variable, field) in CONTRACT_BINDINGS {
            let template = ct.injectors.template(variable).unwrap();
            assert_eq!(template, format!("{{{{ {} }}}}", field));
        }
    }
}

#[test]
fn test_variants_are_equivalent() {
    let standard = CredentialType::builtin(Variant::Standard);
    let legacy = CredentialType::builtin(Variant::Legacy);

    assert_ne!(
        standard.inputs.ids().collect::<Vec<_>>(),
        legacy.inputs.ids().collect::<Vec<_>>()
    );
    assert!(standard.inputs.is_equivalent(&legacy.inputs));
    assert_eq!(
        standard.inputs.fingerprint().unwrap(),
        legacy.inputs.fingerprint().unwrap()
    );
}

#[test]
fn test_builtin_variants_validate_cleanly() {
    let validator = Validator::new(ValidationContext::new().with_strict_mode(true));
    for variant in Variant::ALL {
        let ct = CredentialType::builtin(variant);
        let result = validator.validate(&ct.inputs, Some(&ct.injectors));
        assert!(result.valid, "variant {}: {:?}", variant, result.findings);
        assert!(result.findings.is_empty());
    }
}

#[test]
fn test_render_concrete_inputs() {
    let ct = CredentialType::builtin(Variant::Standard);
    let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
        .render(&create_inputs(&ct, "10.0.0.5", "admin", "s3cr3t"))
        .unwrap();

    assert_eq!(env.expose("DNAC_HOST"), Some("10.0.0.5"));
    assert_eq!(env.expose("DNAC_USERNAME"), Some("admin"));
    assert_eq!(env.expose("DNAC_PASSWORD"), Some("s3cr3t"));

    let masked = env.to_shell_exports(false);
    assert!(masked.contains("export DNAC_HOST='10.0.0.5'"));
    assert!(!masked.contains("s3cr3t"));
    assert!(env.to_shell_exports(true).contains("export DNAC_PASSWORD='s3cr3t'"));
}

/// Shared buffer a test subscriber writes into
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[test]
fn test_password_never_logged() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let ct = CredentialType::builtin(Variant::Legacy);
        let validator = Validator::default();
        let renderer = InjectorRenderer::checked(&ct.inputs, &ct.injectors, &validator).unwrap();
        let env = renderer
            .render(&create_inputs(&ct, "10.0.0.5", "admin", "s3cr3t"))
            .unwrap();

        let options = InventoryOptions::resolve(
            RawInventoryOptions {
                plugin: Some("dna_center".to_string()),
                dnac_version: Some("2.3.5.3".to_string()),
                ..Default::default()
            },
            &env,
        )
        .unwrap();
        assert_eq!(options.expose_password(), "s3cr3t");

        // a failed render must not leak either
        let err = renderer
            .render(&create_inputs(&ct, "10.0.0.5", "", "s3cr3t"))
            .unwrap_err();
        tracing::warn!(error = %err, "render failed");
    });

    let output = logs.contents();
    assert!(output.contains("injector environment rendered"));
    assert!(output.contains("DNAC_PASSWORD"));
    assert!(!output.contains("s3cr3t"));
}

#[test]
fn test_render_fails_closed() {
    let ct = CredentialType::builtin(Variant::Standard);
    let renderer = InjectorRenderer::new(&ct.inputs, &ct.injectors);

    let empty = renderer
        .render(&create_inputs(&ct, "10.0.0.5", "admin", ""))
        .unwrap_err();
    assert!(matches!(empty, RenderError::EmptyValue { ref variable, .. } if variable == "DNAC_PASSWORD"));

    let mut partial = CredentialInputs::new();
    partial.insert("host", "10.0.0.5", false);
    partial.insert("password", "s3cr3t", true);
    let missing = renderer.render(&partial).unwrap_err();
    assert!(matches!(missing, RenderError::MissingValue { ref field, .. } if field == "username"));
    assert!(!missing.to_string().contains("s3cr3t"));
}

#[test]
fn test_checked_renderer_rejects_broken_definition() {
    let definition = CredentialDefinition::new(
        vec![
            FieldDescriptor::string("host", "DNA Center Host"),
            FieldDescriptor::string("username", "Username"),
            FieldDescriptor::string("password", "Password"),
        ],
        ["host", "username", "password"],
    );
    let injectors = InjectorMapping::contract();
    let err = InjectorRenderer::checked(&definition, &injectors, &Validator::default())
        .err()
        .unwrap();
    assert!(matches!(err, CredentialError::RuleViolation(ref msg) if msg.contains("CRED005")));
}

#[test]
fn test_scrubber_covers_rendered_secrets() {
    let ct = CredentialType::builtin(Variant::Standard);
    let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
        .render(&create_inputs(&ct, "10.0.0.5", "admin", "s3cr3t"))
        .unwrap();
    let scrubber = SecretScrubber::for_environment(&env);
    let scrubbed = scrubber.scrub("401 from 10.0.0.5 using admin:s3cr3t");
    assert_eq!(scrubbed, "401 from 10.0.0.5 using admin:[REDACTED]");
}

#[test]
fn test_load_documents_from_disk() {
    let dir = TempDir::new().unwrap();
    let inputs = write_file(
        &dir,
        "inputs.yml",
        r#"
fields:
  - id: username
    type: string
    label: Username
  - id: password
    type: string
    label: Password
    secret: true
  - id: host
    type: string
    label: DNA Center Host
    help_text: FQDN or IP address of the DNA Center controller
required:
  - username
  - password
  - host
"#,
    );
    let injectors = write_file(
        &dir,
        "injectors.json",
        r#"{"env": {"DNAC_HOST": "{{ host }}", "DNAC_USERNAME": "{{ username }}", "DNAC_PASSWORD": "{{ password }}"}}"#,
    );
    let values = write_file(
        &dir,
        "values.toml",
        "host = \"10.0.0.5\"\nusername = \"admin\"\npassword = \"s3cr3t\"\n",
    );

    let definition = loader::load_definition(&inputs).unwrap();
    let mapping = loader::load_injectors(&injectors).unwrap();
    let values = loader::load_values(&values).unwrap();

    assert!(definition.is_equivalent(&CredentialType::builtin(Variant::Standard).inputs));

    let renderer = InjectorRenderer::checked(&definition, &mapping, &Validator::default()).unwrap();
    let env = renderer
        .render(&CredentialInputs::from_values(&definition, values))
        .unwrap();
    assert!(env.get("DNAC_PASSWORD").unwrap().is_secret());
}

#[test]
fn test_load_full_credential_type_document() {
    let dir = TempDir::new().unwrap();
    let exported = serde_yaml::to_string(&CredentialType::builtin(Variant::Legacy)).unwrap();
    let path = write_file(&dir, "credential_type.yaml", &exported);

    let ct = loader::load_credential_type(&path).unwrap();
    assert_eq!(ct, CredentialType::builtin(Variant::Legacy));

    // the inputs section alone is also accepted from a full document
    let definition = loader::load_definition(&path).unwrap();
    assert_eq!(definition, ct.inputs);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();
    let unsupported = write_file(&dir, "inputs.ini", "fields=");
    assert!(matches!(
        loader::load_definition(&unsupported),
        Err(CredentialError::InvalidInput(_))
    ));

    let missing = dir.path().join("absent.yml");
    assert!(matches!(
        loader::load_definition(&missing),
        Err(CredentialError::FileError(_))
    ));

    let malformed = write_file(&dir, "inputs.json", "{ not json");
    assert!(matches!(
        loader::load_definition(&malformed),
        Err(CredentialError::ParseError(_))
    ));
}

#[test]
fn test_inventory_options_from_rendered_environment() {
    let ct = CredentialType::builtin(Variant::Standard);
    let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
        .render(&create_inputs(&ct, "10.0.0.5", "admin", "s3cr3t"))
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "dna_center.yml",
        "plugin: dna_center\ndnac_version: 2.3.5.3\nusername: automation\ntoplevel: dnac\n",
    );
    let options = InventoryOptions::load(&path, &env).unwrap();
    assert_eq!(options.host, "10.0.0.5");
    assert_eq!(options.username, "automation");
    assert_eq!(options.expose_password(), "s3cr3t");

    let wrong_name = write_file(&dir, "inventory.yml", "plugin: dna_center\n");
    assert!(matches!(
        InventoryOptions::load(&wrong_name, &env),
        Err(CredentialError::Inventory(_))
    ));
}

#[test]
fn test_inventory_from_snapshots() {
    let devices = devices_from_value(serde_json::json!({
        "response": [
            {
                "id": "d1", "hostname": "core-sw1", "managementIpAddress": "10.1.1.1",
                "family": "Switches and Hubs", "softwareType": "IOS-XE",
                "softwareVersion": "17.9.4", "reachabilityStatus": "Reachable",
                "role": "CORE", "serialNumber": "FOC1, FOC2", "series": "Cisco Catalyst 9300 Series Switches"
            },
            {
                "id": "d2", "hostname": "ap-1", "managementIpAddress": "10.1.1.9",
                "family": "Unified AP", "softwareType": null
            }
        ]
    }))
    .unwrap();
    let sites = sites_from_value(serde_json::json!({
        "response": { "sites": [
            { "id": "g", "name": "Global", "locationType": "area" },
            { "id": "b", "name": "Düsseldorf HQ", "parentId": "g", "locationType": "building" }
        ]}
    }))
    .unwrap();
    let topology = topology_from_value(serde_json::json!({
        "response": { "nodes": [ { "id": "d1", "additionalInfo": { "siteid": "b" } } ] }
    }))
    .unwrap();

    let inventory = InventoryBuilder::new()
        .with_toplevel("dnac")
        .with_sites(sites)
        .with_topology(topology)
        .build(&devices)
        .unwrap();

    let json = inventory.to_json();
    assert_eq!(json["all"]["children"], serde_json::json!(["dnac"]));
    assert_eq!(json["dnac"]["children"], serde_json::json!(["global"]));
    assert_eq!(json["global"]["children"], serde_json::json!(["bld_duesseldorf_hq"]));
    assert_eq!(json["bld_duesseldorf_hq"]["hosts"], serde_json::json!(["core-sw1"]));

    let vars = &json["_meta"]["hostvars"]["core-sw1"];
    assert_eq!(vars["ansible_host"], "10.1.1.1");
    assert_eq!(vars["ansible_network_os"], "ios");
    assert_eq!(vars["version"], "17.9.4");
    assert_eq!(vars["hw_type"], "Cisco Catalyst 9300 Series Switches");
    assert_eq!(vars["host_data"]["role"], "CORE");
    assert!(json["_meta"]["hostvars"].get("ap-1").is_none());
}

#[test]
fn test_keyed_groups_from_source_file() {
    let ct = CredentialType::builtin(Variant::Standard);
    let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
        .render(&create_inputs(&ct, "10.0.0.5", "admin", "s3cr3t"))
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "dna_center.yml",
        r#"plugin: dna_center
dnac_version: 2.3.5.3
strict: false
keyed_groups:
  - key: role
    prefix: role
  - key: host_data.platformId
    prefix: platform
    parent_group: platforms
"#,
    );
    let options = InventoryOptions::load(&path, &env).unwrap();

    let devices = devices_from_value(serde_json::json!([
        { "id": "d1", "hostname": "core-sw1", "role": "CORE", "platformId": "C9300-48U" },
        { "id": "d2", "hostname": "edge-r1" }
    ]))
    .unwrap();
    let topology = topology_from_value(serde_json::json!({
        "nodes": [ { "id": "d1" }, { "id": "d2" } ]
    }))
    .unwrap();

    let builder = InventoryBuilder::from_options(&options).with_topology(topology);
    let inventory = builder.clone().build(&devices).unwrap();
    let json = inventory.to_json();
    assert_eq!(json["role_CORE"]["hosts"], serde_json::json!(["core-sw1"]));
    assert_eq!(json["platforms"]["children"], serde_json::json!(["platform_C9300_48U"]));
    assert_eq!(json["platform_C9300_48U"]["hosts"], serde_json::json!(["core-sw1"]));
    assert_eq!(json["ungrouped"]["hosts"], serde_json::json!(["core-sw1", "edge-r1"]));

    // edge-r1 has no role, which strict mode refuses
    let err = builder.with_strict(true).build(&devices).unwrap_err();
    assert!(err.to_string().contains("edge-r1"));
}

fn builtin_fields() -> Vec<FieldDescriptor> {
    CredentialType::builtin(Variant::Standard).inputs.fields
}

proptest! {
    #[test]
    fn prop_field_order_is_irrelevant(
        fields in Just(builtin_fields()).prop_shuffle(),
        required in Just(CONTRACT_FIELDS.to_vec()).prop_shuffle(),
    ) {
        let permuted = CredentialDefinition::new(fields, required);
        let standard = CredentialType::builtin(Variant::Standard).inputs;

        prop_assert!(permuted.is_equivalent(&standard));
        prop_assert_eq!(permuted.fingerprint().unwrap(), standard.fingerprint().unwrap());

        let result = Validator::default().validate(&permuted, Some(&InjectorMapping::contract()));
        prop_assert!(result.valid);
    }

    #[test]
    fn prop_rendered_values_match_inputs(
        host in "[a-z0-9.-]{1,32}",
        username in "[A-Za-z0-9_]{1,16}",
        password in "[!-~]{1,24}",
    ) {
        let ct = CredentialType::builtin(Variant::Legacy);
        let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&create_inputs(&ct, &host, &username, &password))
            .unwrap();
        prop_assert_eq!(env.expose("DNAC_HOST"), Some(host.as_str()));
        prop_assert_eq!(env.expose("DNAC_USERNAME"), Some(username.as_str()));
        prop_assert_eq!(env.expose("DNAC_PASSWORD"), Some(password.as_str()));
    }
}
