//! End-to-end scenarios across credentials, tools and the host
//!
//! Each test builds the full stack (resolver, collaborators, registry, host)
//! from a temporary home directory and an in-memory environment, then
//! exercises it the way a transport would.

use pretty_assertions::assert_eq;
use serde_json::json;
use veracode_credentials::{CredentialResolver, CredentialSource};
use veracode_mcp::{ToolHost, bootstrap};
use veracode_test_utils::{
    ApiCall, CredentialsHome, FakeCollaborators, FakeScanner, FakeApi, FakeWorkspace,
    TestWorkspace, env_map,
};
use veracode_tools::RequestContext;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// A full stack rooted in a temporary home directory.
struct Stack {
    _home: CredentialsHome,
    fakes: FakeCollaborators,
    host: ToolHost,
}

impl Stack {
    fn build(home: CredentialsHome, env: &[(&str, &str)], fakes: FakeCollaborators) -> Self {
        let resolver = CredentialResolver::new()
            .with_home_dir(home.path())
            .with_env(env_map(env));
        let host = bootstrap(&fakes.collaborators(resolver)).unwrap();
        Self {
            _home: home,
            fakes,
            host,
        }
    }

    fn health_text(&self) -> String {
        let payload = self
            .host
            .call_json(&RequestContext::new(), "api-health", json!({}))
            .unwrap();
        match payload.get("error") {
            Some(error) => error.as_str().unwrap().to_string(),
            None => payload["content"][0]["text"].as_str().unwrap().to_string(),
        }
    }

    fn health_base_url(&self) -> String {
        match &self.fakes.api.calls()[..] {
            [ApiCall::Health { base_url }] => base_url.clone(),
            other => panic!("Expected one health call, got {other:?}"),
        }
    }
}

const ENV_CREDENTIALS: &[(&str, &str)] = &[
    ("VERACODE_API_ID", "env-id"),
    ("VERACODE_API_KEY", "env-secret"),
];

// =============================================================================
// Credential scenarios
// =============================================================================

#[test]
fn scenario_eu_key_in_config_targets_eu_endpoint() {
    let home = CredentialsHome::new();
    home.write_credentials("vera01ei-AAAA", "secret", None);

    let stack = Stack::build(home, &[], FakeCollaborators::healthy());
    let text = stack.health_text();

    assert_eq!(stack.health_base_url(), "https://api.veracode.eu");
    assert!(text.contains("source: file"), "{text}");
}

#[test]
fn scenario_plain_key_in_config_targets_default_endpoint() {
    let home = CredentialsHome::new();
    home.write_credentials("1234567890abcdef1234", "secret", None);

    let stack = Stack::build(home, &[], FakeCollaborators::healthy());
    stack.health_text();

    assert_eq!(stack.health_base_url(), "https://api.veracode.com");
}

#[test]
fn scenario_env_only_credentials() {
    let home = CredentialsHome::new();

    let stack = Stack::build(home, ENV_CREDENTIALS, FakeCollaborators::healthy());
    let text = stack.health_text();

    assert_eq!(stack.health_base_url(), "https://api.veracode.com");
    assert!(text.contains("source: env"), "{text}");
}

#[test]
fn scenario_no_credentials_anywhere() {
    let home = CredentialsHome::new();
    let resolver = CredentialResolver::new()
        .with_home_dir(home.path())
        .with_env(env_map(&[]));

    let err = resolver.resolve().unwrap_err();
    assert!(err.to_string().starts_with("Veracode credentials not found"));

    let stack = Stack::build(home, &[], FakeCollaborators::healthy());
    let text = stack.health_text();
    assert!(text.contains("Authentication: Not configured"));
    assert!(stack.fakes.api.calls().is_empty());
}

#[test]
fn scenario_malformed_config_falls_back_to_env() {
    let home = CredentialsHome::new();
    home.write_config("api:\n  key-id: [unterminated\n");
    let resolver = CredentialResolver::new()
        .with_home_dir(home.path())
        .with_env(env_map(ENV_CREDENTIALS));

    let credentials = resolver.resolve().unwrap();

    assert_eq!(credentials.source(), CredentialSource::Env);
    assert_eq!(credentials.api_id(), "env-id");
}

#[test]
fn scenario_explicit_url_wins_over_eu_prefix() {
    let home = CredentialsHome::new();
    home.write_credentials("vera01ei-AAAA", "secret", Some("https://gateway.example.test"));

    let stack = Stack::build(home, &[], FakeCollaborators::healthy());
    stack.health_text();

    assert_eq!(stack.health_base_url(), "https://gateway.example.test");
}

// =============================================================================
// Tool scenarios
// =============================================================================

#[test]
fn scenario_findings_then_details() {
    let stack = Stack::build(
        CredentialsHome::new(),
        ENV_CREDENTIALS,
        FakeCollaborators::new(
            FakeApi::new(),
            FakeWorkspace::named("Storefront"),
            FakeScanner::exiting(0),
        ),
    );
    let ctx = RequestContext::new();

    let findings = stack
        .host
        .call_json(
            &ctx,
            "get-static-findings",
            json!({ "application_path": "/work/storefront", "severity": 5 }),
        )
        .unwrap();
    assert_eq!(findings["app_profile"], "Storefront");
    assert_eq!(findings["kind"], "static");

    let details = stack
        .host
        .call_json(
            &ctx,
            "get-finding-details",
            json!({ "application_path": "/work/storefront", "flaw_id": 7 }),
        )
        .unwrap();
    assert_eq!(details["finding"]["issue_id"], 7);
    assert_eq!(stack.fakes.api.calls().len(), 2);
}

#[test]
fn scenario_pipeline_scan_policy_failure() {
    let workspace = TestWorkspace::new();
    workspace.add_packaged("storefront.war", 4096);
    let stack = Stack::build(
        CredentialsHome::new(),
        &[],
        FakeCollaborators::new(
            FakeApi::new(),
            FakeWorkspace::named("Storefront"),
            FakeScanner::exiting(3).with_output("3 flaws found", ""),
        ),
    );

    let payload = stack
        .host
        .call_json(
            &RequestContext::new(),
            "pipeline-static-scan",
            json!({ "application_path": workspace.root_str() }),
        )
        .unwrap();

    let text = payload["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("did not pass policy"));
    assert!(text.contains("3 flaws found"));
    workspace.assert_exists(".veracode_pipeline");
}

#[test]
fn scenario_host_shutdown_releases_everything() {
    let mut stack = Stack::build(
        CredentialsHome::new(),
        ENV_CREDENTIALS,
        FakeCollaborators::healthy(),
    );

    stack.host.shutdown_all().unwrap();

    assert!(stack.host.handler_names().is_empty());
    assert!(
        stack
            .host
            .call_json(&RequestContext::new(), "api-health", json!({}))
            .is_err()
    );
}
