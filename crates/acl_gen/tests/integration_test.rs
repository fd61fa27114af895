//! Integration tests for acl_gen
//!
//! These tests run the generator end to end against temporary projects, using
//! a scripted prompter and a mock discovery helper binary.
//!
//! # Test Structure
//!
//! - **Mock Helper Tests**: Verify mock discovery binary behavior
//! - **Generator Tests**: Verify the entries written for a full run
//! - **Discovery Tests**: Verify helper replies, timeouts and failures
//! - **Auth Server Tests**: Verify the auth server store
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::process::Command;

use acl_gen::discovery::{discover_methods, DiscoveryOutcome, HelperCommand, DEFAULT_METHODS};
use acl_gen::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Get the path to the mock discovery binary (set by Cargo during test builds)
fn mock_discovery_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mock_discovery"))
}

fn mock_helper(args: &[&str]) -> Vec<String> {
    let mut command = vec![mock_discovery_path().to_string_lossy().into_owned()];
    command.extend(args.iter().map(|a| a.to_string()));
    command
}

fn write_json(path: &Path, value: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Project with a `Car` and a `Location` model
fn sample_project(dependencies: Value) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_json(
        &dir.path().join("package.json"),
        &json!({ "name": "test-app", "dependencies": dependencies }),
    );
    write_json(
        &dir.path().join("common/models/car.json"),
        &json!({ "name": "Car", "base": "PersistedModel", "properties": {} }),
    );
    write_json(
        &dir.path().join("common/models/location.json"),
        &json!({ "name": "Location", "base": "PersistedModel" }),
    );
    dir
}

fn car_acls(dir: &TempDir) -> Value {
    read_json(&dir.path().join("common/models/car.json"))["acls"].clone()
}

fn location_acls(dir: &TempDir) -> Value {
    read_json(&dir.path().join("common/models/location.json"))["acls"].clone()
}

fn component_config(dir: &TempDir) -> PathBuf {
    dir.path().join("server/component-config.json")
}

/// Generator whose discovery helper replies immediately
fn generator(dir: &TempDir, prompter: &Arc<ScriptedPrompter>) -> AclGenerator {
    let options = GeneratorOptions::builder()
        .project_root(dir.path())
        .discovery_helper(mock_helper(&["--methods=find,create"]))
        .build();
    AclGenerator::new(options, prompter.clone())
}

fn method_choices(asked: &[Question]) -> Vec<String> {
    asked
        .iter()
        .find(|q| q.name == "property")
        .map(|q| q.choices.iter().map(|c| c.value.clone()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Mock Helper Binary Tests
// ============================================================================

#[tokio::test]
async fn test_mock_discovery_version() {
    let output = Command::new(mock_discovery_path())
        .arg("--version")
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let version = String::from_utf8(output.stdout).unwrap();
    assert!(version.starts_with("1.0.0"));
}

#[tokio::test]
async fn test_mock_discovery_reply() {
    let output = Command::new(mock_discovery_path())
        .args(["--methods=find,drive", "Car"])
        .output()
        .await
        .unwrap();

    assert!(output.status.success());
    let methods: Vec<String> =
        serde_json::from_str(String::from_utf8(output.stdout).unwrap().trim()).unwrap();
    assert_eq!(methods, vec!["find", "drive"]);
}

#[tokio::test]
async fn test_mock_discovery_requires_model() {
    let output = Command::new(mock_discovery_path()).output().await.unwrap();
    assert!(!output.status.success());
}

// ============================================================================
// Generator Tests
// ============================================================================

#[tokio::test]
async fn test_audit_entry_on_named_model() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("scope", "all")
            .answer("accessType", "*")
            .answer("role", "$everyone")
            .answer("permission", "AUDIT"),
    );

    let summary = generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(summary.written, vec!["Car"]);
    assert_eq!(
        car_acls(&dir),
        json!([{
            "accessType": "*",
            "principalType": "ROLE",
            "principalId": "$everyone",
            "permission": "AUDIT"
        }])
    );
    assert_eq!(location_acls(&dir), Value::Null);
}

#[tokio::test]
async fn test_method_scope_forces_execute() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("scope", "method")
            .answer("property", "find")
            .answer("accessType", "READ")
            .answer("role", "$owner")
            .answer("permission", "ALLOW"),
    );

    generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(
        car_acls(&dir),
        json!([{
            "property": "find",
            "accessType": "EXECUTE",
            "principalType": "ROLE",
            "principalId": "$owner",
            "permission": "ALLOW"
        }])
    );
    let asked = prompter.asked().await;
    assert!(asked.iter().all(|q| q.name != "accessType"));
}

#[tokio::test]
async fn test_custom_role() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("role", "other")
            .answer("customRole", "myRole")
            .answer("permission", "DENY"),
    );

    generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(car_acls(&dir)[0]["principalId"], "myRole");
    assert_eq!(car_acls(&dir)[0]["permission"], "DENY");
}

#[tokio::test]
async fn test_all_models_receive_identical_entry() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "")
            .answer("accessType", "WRITE")
            .answer("role", "$authenticated")
            .answer("permission", "ALLOW"),
    );

    let summary = generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(summary.model, None);
    assert_eq!(summary.written, vec!["Car", "Location"]);
    assert_eq!(car_acls(&dir), location_acls(&dir));
    assert_eq!(car_acls(&dir)[0]["accessType"], "WRITE");
}

#[tokio::test]
async fn test_existing_acls_are_kept() {
    let dir = sample_project(json!({}));
    write_json(
        &dir.path().join("common/models/car.json"),
        &json!({
            "name": "Car",
            "acls": [{
                "accessType": "*",
                "principalType": "ROLE",
                "principalId": "$everyone",
                "permission": "DENY"
            }]
        }),
    );
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("role", "$owner")
            .answer("permission", "ALLOW"),
    );

    generator(&dir, &prompter).run().await.unwrap();

    let acls = car_acls(&dir);
    assert_eq!(acls.as_array().unwrap().len(), 2);
    assert_eq!(acls[0]["permission"], "DENY");
    assert_eq!(acls[1]["principalId"], "$owner");
}

#[tokio::test]
async fn test_invalid_model_does_not_stop_others() {
    let dir = sample_project(json!({}));
    write_json(
        &dir.path().join("common/models/location.json"),
        &json!({ "name": "Location", "acls": {} }),
    );
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "")
            .answer("permission", "ALLOW"),
    );

    let err = generator(&dir, &prompter).run().await.unwrap_err();

    assert!(matches!(err, AclGenError::Validation { ref model, .. } if model == "Location"));
    assert_eq!(car_acls(&dir).as_array().unwrap().len(), 1);
    assert_eq!(location_acls(&dir), json!({}));
}

#[tokio::test]
async fn test_missing_project() {
    let dir = TempDir::new().unwrap();
    let prompter = Arc::new(ScriptedPrompter::new());

    let err = generator(&dir, &prompter).run().await.unwrap_err();
    assert!(matches!(err, AclGenError::ProjectNotFound(_)));
    assert!(prompter.asked().await.is_empty());
}

#[tokio::test]
async fn test_questions_are_asked_in_order() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("permission", "ALLOW"),
    );

    generator(&dir, &prompter).run().await.unwrap();

    let names: Vec<String> = prompter.asked().await.into_iter().map(|q| q.name).collect();
    assert_eq!(names, vec!["model", "scope", "accessType", "role", "permission"]);
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_discovered_methods_are_offered() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("scope", "method")
            .answer("property", "create"),
    );

    generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(
        method_choices(&prompter.asked().await),
        vec!["find", "create", "other"]
    );
    assert_eq!(car_acls(&dir)[0]["property"], "create");
}

#[tokio::test]
async fn test_discovery_timeout_uses_default_catalog() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("scope", "method")
            .answer("property", "find"),
    );
    let options = GeneratorOptions::builder()
        .project_root(dir.path())
        .discovery_helper(mock_helper(&["--silent"]))
        .discovery_timeout(Duration::from_millis(300))
        .build();

    let started = Instant::now();
    AclGenerator::new(options, prompter.clone())
        .run()
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    let mut expected: Vec<String> = DEFAULT_METHODS.iter().map(|m| m.to_string()).collect();
    expected.push("other".to_string());
    assert_eq!(method_choices(&prompter.asked().await), expected);
    assert_eq!(car_acls(&dir)[0]["property"], "find");
}

#[tokio::test]
async fn test_helper_failure_uses_default_catalog() {
    let dir = sample_project(json!({}));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("scope", "method"),
    );
    let options = GeneratorOptions::builder()
        .project_root(dir.path())
        .discovery_helper(mock_helper(&["--exit=3"]))
        .build();

    AclGenerator::new(options, prompter.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(
        method_choices(&prompter.asked().await),
        MethodCatalog::default_catalog().methods().to_vec()
    );
}

#[tokio::test]
async fn test_subprocess_discovery_skips_log_lines() {
    let dir = sample_project(json!({}));
    let discovery = SubprocessDiscovery::new(
        HelperCommand {
            program: mock_discovery_path(),
            args: vec!["--log=loading app".to_string(), "--methods=find,honk".to_string()],
        },
        dir.path(),
    );

    let outcome = discover_methods(&discovery, "Car", Duration::from_secs(5)).await;
    assert_eq!(
        outcome,
        DiscoveryOutcome::Resolved(vec!["find".to_string(), "honk".to_string()])
    );
}

#[tokio::test]
async fn test_subprocess_discovery_empty_list() {
    let dir = sample_project(json!({}));
    let discovery = SubprocessDiscovery::new(
        HelperCommand {
            program: mock_discovery_path(),
            args: vec!["--only=Location".to_string()],
        },
        dir.path(),
    );

    let outcome = discover_methods(&discovery, "Car", Duration::from_secs(5)).await;
    assert_eq!(outcome, DiscoveryOutcome::Resolved(Vec::new()));
    assert_eq!(
        MethodCatalog::from_outcome(outcome),
        MethodCatalog::default_catalog()
    );
}

#[tokio::test]
async fn test_subprocess_discovery_exit_code() {
    let dir = sample_project(json!({}));
    let discovery = SubprocessDiscovery::new(
        HelperCommand {
            program: mock_discovery_path(),
            args: vec!["--exit=2".to_string()],
        },
        dir.path(),
    );

    let err = discovery.discover("Car").await.unwrap_err();
    assert!(matches!(err, AclGenError::Process { code: 2, ref stderr } if stderr.contains("Car")));
}

// ============================================================================
// Auth Server Tests
// ============================================================================

#[tokio::test]
async fn test_security_scope_hidden_without_provider() {
    let dir = sample_project(json!({ "loopback": "^3.0.0" }));
    let prompter = Arc::new(ScriptedPrompter::new().answer("model", "Car"));

    generator(&dir, &prompter).run().await.unwrap();

    let asked = prompter.asked().await;
    let permission = asked.iter().find(|q| q.name == "permission").unwrap();
    let values: Vec<&str> = permission.choices.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["ALLOW", "DENY", "ALARM", "AUDIT"]);
}

#[tokio::test]
async fn test_new_auth_server_is_registered() {
    let dir = sample_project(json!({ "loopback-oauth-mfp": "^1.0.0" }));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("permission", "SECURITY_SCOPE")
            .answer("authProvider", "mfp")
            .answer("authServerName", "Create a new auth server")
            .answer("newAuthServerName", "My MFP Server")
            .answer("authServerURL", "http://localhost:9080/mfp/api")
            .answer("authScope", "scope1 scope2"),
    );

    let summary = generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(
        car_acls(&dir),
        json!([{
            "accessType": "*",
            "principalType": "ROLE",
            "principalId": "$everyone",
            "permission": "SECURITY_SCOPE",
            "authScope": "scope1 scope2",
            "authServerName": "My MFP Server"
        }])
    );
    assert_eq!(
        read_json(&component_config(&dir)),
        json!({
            "loopback-oauth-mfp": {
                "authorizationServers": [{
                    "name": "My MFP Server",
                    "url": "http://localhost:9080/mfp/api"
                }]
            }
        })
    );
    assert_eq!(
        summary.auth_server_added.map(|s| s.name),
        Some("My MFP Server".to_string())
    );
}

#[tokio::test]
async fn test_new_auth_server_name_drops_url_annotation() {
    let dir = sample_project(json!({ "loopback-oauth-mfp": "^1.0.0" }));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("permission", "SECURITY_SCOPE")
            .answer("authProvider", "mfp")
            .answer("authServerName", "Create a new auth server")
            .answer("newAuthServerName", "Main <url: http://x>")
            .answer("authServerURL", "http://localhost:9080/mfp/api")
            .answer("authScope", "scope1"),
    );

    generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(car_acls(&dir)[0]["authServerName"], "Main");
    let store = read_json(&component_config(&dir));
    assert_eq!(
        store["loopback-oauth-mfp"]["authorizationServers"][0]["name"],
        "Main"
    );
    assert!(!store.to_string().contains(" <url: "));
}

#[tokio::test]
async fn test_existing_auth_server_is_stripped() {
    let dir = sample_project(json!({ "loopback-oauth-mfp": "^1.0.0" }));
    let store = json!({
        "loopback-component-explorer": { "mountPath": "/explorer" },
        "loopback-oauth-mfp": {
            "authorizationServers": [{
                "name": "My MFP Server",
                "url": "http://localhost:9080/mfp/api"
            }]
        }
    });
    write_json(&component_config(&dir), &store);
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("permission", "SECURITY_SCOPE")
            .answer("authProvider", "mfp")
            .answer(
                "authServerName",
                "My MFP Server <url: http://localhost:9080/mfp/api>",
            )
            .answer("authScope", "scope1"),
    );

    let summary = generator(&dir, &prompter).run().await.unwrap();

    assert_eq!(car_acls(&dir)[0]["authServerName"], "My MFP Server");
    assert_eq!(read_json(&component_config(&dir)), store);
    assert!(summary.auth_server_added.is_none());

    let asked = prompter.asked().await;
    let servers = asked.iter().find(|q| q.name == "authServerName").unwrap();
    let values: Vec<&str> = servers.choices.iter().map(|c| c.value.as_str()).collect();
    assert_eq!(
        values,
        vec![
            "My MFP Server <url: http://localhost:9080/mfp/api>",
            "Create a new auth server"
        ]
    );
}

#[tokio::test]
async fn test_security_scope_requires_scope() {
    let dir = sample_project(json!({ "loopback-oauth-mfp": "^1.0.0" }));
    let prompter = Arc::new(
        ScriptedPrompter::new()
            .answer("model", "Car")
            .answer("permission", "SECURITY_SCOPE")
            .answer("authProvider", "mfp")
            .answer("authServerName", "Main"),
    );

    let err = generator(&dir, &prompter).run().await.unwrap_err();

    assert!(matches!(err, AclGenError::Validation { ref model, .. } if model == "Car"));
    assert_eq!(car_acls(&dir), Value::Null);
}
