// ABOUTME: Validation harness tests over a scripted protocol client.
// ABOUTME: Covers probe ordering, extraction, downgrade rules, and isolation of failures.

mod support;

use proptest::prelude::*;

use skylift::config::ProbeConfig;
use skylift::validate::{
    InitializeResult, JsonRpcResponse, ProbeId, ProbeOutcome, ValidationResult, Validator,
};

use support::{MockPlatform, MockProtocolClient};

fn healthy_client() -> MockProtocolClient {
    MockProtocolClient::new()
        .respond(
            "initialize",
            r#"{"jsonrpc":"2.0","id":1,"result":{
                "protocolVersion":"2024-11-05",
                "capabilities":{"tools":{}},
                "serverInfo":{"name":"mcp-server","version":"0.3.1"}
            }}"#,
        )
        .respond(
            "tools/list",
            r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[
                {"name":"search"},{"name":"open"},{"name":"find"}
            ]}}"#,
        )
        .respond(
            "tools/call",
            r#"{"jsonrpc":"2.0","id":3,"result":{"content":[
                {"type":"text","text":"Rust is a systems programming language."}
            ],"isError":false}}"#,
        )
}

async fn run(client: &MockProtocolClient, platform: &MockPlatform) -> Vec<ValidationResult> {
    let config = ProbeConfig::default();
    let validator = Validator::new(client, platform, &config, "us-east-1", Some("mcp-server-dev"));
    validator.run_all().await
}

fn result_for(results: &[ValidationResult], probe: ProbeId) -> &ValidationResult {
    results
        .iter()
        .find(|r| r.probe == probe)
        .unwrap_or_else(|| panic!("missing {probe} result"))
}

/// Test: probes run in the fixed order and a healthy endpoint passes all five.
#[tokio::test]
async fn healthy_endpoint_passes_all_probes() {
    let client = healthy_client();
    let results = run(&client, &MockPlatform::active()).await;

    let order: Vec<ProbeId> = results.iter().map(|r| r.probe).collect();
    assert_eq!(
        order,
        vec![
            ProbeId::Handshake,
            ProbeId::Capabilities,
            ProbeId::Functional,
            ProbeId::Infrastructure,
            ProbeId::Latency,
        ]
    );
    assert!(results.iter().all(|r| r.outcome == ProbeOutcome::Pass));
}

/// Test: the handshake extracts the server name and version from the named
/// serverInfo fields.
#[tokio::test]
async fn handshake_extracts_server_identity() {
    let client = healthy_client();
    let results = run(&client, &MockPlatform::active()).await;

    let handshake = result_for(&results, ProbeId::Handshake);
    assert_eq!(handshake.extracted["server_name"], "mcp-server");
    assert_eq!(handshake.extracted["server_version"], "0.3.1");
}

/// Test: the capability probe counts advertised operations and lists their
/// names.
#[tokio::test]
async fn capabilities_counts_advertised_operations() {
    let client = healthy_client();
    let results = run(&client, &MockPlatform::active()).await;

    let capabilities = result_for(&results, ProbeId::Capabilities);
    assert_eq!(capabilities.extracted["tool_count"], "3");
    assert_eq!(capabilities.extracted["tools"], "search,open,find");
}

/// Test: a successful tool call whose body lacks the expected keyword is a
/// warning, never a failure.
#[tokio::test]
async fn irrelevant_content_downgrades_to_warning() {
    let client = healthy_client().respond(
        "tools/call",
        r#"{"jsonrpc":"2.0","id":3,"result":{"content":[
            {"type":"text","text":"No results found for your query."}
        ],"isError":false}}"#,
    );
    let results = run(&client, &MockPlatform::active()).await;

    let functional = result_for(&results, ProbeId::Functional);
    assert_eq!(functional.outcome, ProbeOutcome::Warn);
    assert!(functional.detail.contains("limited relevance"));
}

/// Test: keyword matching is case-insensitive.
#[tokio::test]
async fn keyword_match_is_case_insensitive() {
    let client = healthy_client().respond(
        "tools/call",
        r#"{"jsonrpc":"2.0","id":3,"result":{"content":[
            {"type":"text","text":"RUST PROGRAMMING FOR EVERYONE"}
        ]}}"#,
    );
    let results = run(&client, &MockPlatform::active()).await;
    assert_eq!(
        result_for(&results, ProbeId::Functional).outcome,
        ProbeOutcome::Pass
    );
}

/// Test: a failing probe is recorded and the harness still runs every
/// subsequent probe.
#[tokio::test]
async fn failing_probe_does_not_halt_the_sequence() {
    // initialize is unscripted: handshake and latency see transport failures.
    let client = MockProtocolClient::new()
        .respond(
            "tools/list",
            r#"{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"search"}]}}"#,
        )
        .respond(
            "tools/call",
            r#"{"jsonrpc":"2.0","id":3,"result":{"content":[
                {"type":"text","text":"rust"}
            ]}}"#,
        );
    let results = run(&client, &MockPlatform::active()).await;

    assert_eq!(results.len(), 5);
    assert_eq!(
        result_for(&results, ProbeId::Handshake).outcome,
        ProbeOutcome::Fail
    );
    assert_eq!(
        result_for(&results, ProbeId::Capabilities).outcome,
        ProbeOutcome::Pass
    );
    assert_eq!(
        result_for(&results, ProbeId::Functional).outcome,
        ProbeOutcome::Pass
    );
}

/// Test: a protocol-level error on the handshake is a failure, not a warning.
#[tokio::test]
async fn handshake_rpc_error_fails() {
    let client = healthy_client().respond(
        "initialize",
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32600,"message":"Invalid Request"}}"#,
    );
    let results = run(&client, &MockPlatform::active()).await;

    let handshake = result_for(&results, ProbeId::Handshake);
    assert_eq!(handshake.outcome, ProbeOutcome::Fail);
    assert!(handshake.detail.contains("Invalid Request"));
}

/// Test: a handshake response carrying neither a result nor an error object
/// is a hard failure, and the latency probe agrees on the same body.
#[tokio::test]
async fn handshake_without_result_or_error_fails() {
    let client = healthy_client().respond(
        "initialize",
        r#"{"jsonrpc":"2.0","id":1}"#,
    );
    let results = run(&client, &MockPlatform::active()).await;

    let handshake = result_for(&results, ProbeId::Handshake);
    assert_eq!(handshake.outcome, ProbeOutcome::Fail);
    assert!(handshake.detail.contains("neither result nor error"));
    assert_eq!(
        result_for(&results, ProbeId::Latency).outcome,
        ProbeOutcome::Fail
    );
}

/// Test: a tool-level error result is noted as degraded service even when
/// its text happens to contain the expected keyword.
#[tokio::test]
async fn tool_error_result_downgrades_to_warning() {
    let client = healthy_client().respond(
        "tools/call",
        r#"{"jsonrpc":"2.0","id":3,"result":{"content":[
            {"type":"text","text":"rust backend error: upstream timeout"}
        ],"isError":true}}"#,
    );
    let results = run(&client, &MockPlatform::active()).await;

    let functional = result_for(&results, ProbeId::Functional);
    assert_eq!(functional.outcome, ProbeOutcome::Warn);
    assert!(functional.detail.contains("tool error"));
}

/// Test: a handshake result missing serverInfo is degraded service, not a
/// hard failure.
#[tokio::test]
async fn unreadable_server_info_downgrades_to_warning() {
    let client = healthy_client().respond(
        "initialize",
        r#"{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05"}}"#,
    );
    let results = run(&client, &MockPlatform::active()).await;
    assert_eq!(
        result_for(&results, ProbeId::Handshake).outcome,
        ProbeOutcome::Warn
    );
}

/// Test: the infrastructure probe passes only when the platform reports the
/// function active, and extracts its runtime configuration.
#[tokio::test]
async fn infrastructure_probe_requires_active_function() {
    let client = healthy_client();

    let results = run(&client, &MockPlatform::active()).await;
    let infra = result_for(&results, ProbeId::Infrastructure);
    assert_eq!(infra.outcome, ProbeOutcome::Pass);
    assert_eq!(infra.extracted["architecture"], "arm64");
    assert_eq!(infra.extracted["memory_mb"], "512");

    let results = run(&client, &MockPlatform::pending()).await;
    let infra = result_for(&results, ProbeId::Infrastructure);
    assert_eq!(infra.outcome, ProbeOutcome::Fail);
    assert!(infra.detail.contains("Pending"));
}

/// Test: without a function name output, the infrastructure probe fails
/// while the protocol probes still run.
#[tokio::test]
async fn missing_function_name_fails_only_infrastructure() {
    let client = healthy_client();
    let config = ProbeConfig::default();
    let platform = MockPlatform::active();
    let validator = Validator::new(&client, &platform, &config, "us-east-1", None);
    let results = validator.run_all().await;

    assert_eq!(
        result_for(&results, ProbeId::Infrastructure).outcome,
        ProbeOutcome::Fail
    );
    assert_eq!(
        result_for(&results, ProbeId::Handshake).outcome,
        ProbeOutcome::Pass
    );
}

/// Test: the latency probe records a measured round trip on success.
#[tokio::test]
async fn latency_probe_records_round_trip() {
    let client = healthy_client();
    let results = run(&client, &MockPlatform::active()).await;

    let latency = result_for(&results, ProbeId::Latency);
    assert_eq!(latency.outcome, ProbeOutcome::Pass);
    assert!(latency.latency.is_some());
}

proptest! {
    /// Test: server identity survives the encode/decode path for arbitrary
    /// name and version strings.
    #[test]
    fn handshake_extraction_is_field_exact(name in "\\PC*", version in "\\PC*") {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "serverInfo": {"name": name.as_str(), "version": version.as_str()}
            }
        });
        let response: JsonRpcResponse = serde_json::from_value(body).unwrap();
        let init: InitializeResult = response.decode().unwrap();
        prop_assert_eq!(init.server_info.name, name);
        prop_assert_eq!(init.server_info.version, version);
    }
}
