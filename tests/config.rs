// ABOUTME: Configuration resolution tests covering environment-variable defaults.
// ABOUTME: Flag and override precedence is pinned here with a scoped process env.

mod support;

use skylift::config::{Config, Environment};

use support::test_config;

/// Test: with no flag and no override, the region falls back to AWS_REGION.
#[test]
fn region_falls_back_to_environment_variable() {
    temp_env::with_var("AWS_REGION", Some("ap-south-1"), || {
        let config = test_config();
        let target = config.resolve(Environment::Dev, None, None).unwrap();
        assert_eq!(target.region, "ap-south-1");
    });
}

/// Test: an explicit region flag beats both the config override and the
/// environment variable.
#[test]
fn region_flag_has_highest_precedence() {
    let yaml = r#"
service: mcp-server
environments:
  dev:
    region: eu-west-2
"#;
    temp_env::with_var("AWS_REGION", Some("ap-south-1"), || {
        let config = Config::from_yaml(yaml).unwrap();

        let target = config
            .resolve(Environment::Dev, Some("us-west-2"), None)
            .unwrap();
        assert_eq!(target.region, "us-west-2");

        let target = config.resolve(Environment::Dev, None, None).unwrap();
        assert_eq!(target.region, "eu-west-2");
    });
}

/// Test: without any source of region, the built-in default applies.
#[test]
fn region_defaults_when_nothing_is_set() {
    temp_env::with_var_unset("AWS_REGION", || {
        let config = test_config();
        let target = config.resolve(Environment::Dev, None, None).unwrap();
        assert_eq!(target.region, "us-east-1");
    });
}

/// Test: the artifact bucket derives from the service name unless overridden.
#[test]
fn artifact_bucket_derives_from_service() {
    let config = test_config();
    let target = config.resolve(Environment::Dev, None, None).unwrap();
    assert_eq!(target.artifact_bucket, "mcp-server-artifacts");

    let yaml = r#"
service: mcp-server
artifact_bucket: shared-artifacts
environments:
  prod:
    artifact_bucket: prod-artifacts
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let target = config.resolve(Environment::Dev, None, None).unwrap();
    assert_eq!(target.artifact_bucket, "shared-artifacts");
    let target = config.resolve(Environment::Prod, None, None).unwrap();
    assert_eq!(target.artifact_bucket, "prod-artifacts");
}

/// Test: every resolved target carries the environment as a template
/// parameter.
#[test]
fn environment_parameter_is_always_present() {
    let config = test_config();
    for environment in [Environment::Dev, Environment::Staging, Environment::Prod] {
        let target = config.resolve(environment, None, None).unwrap();
        assert_eq!(target.parameters["Environment"], environment.to_string());
    }
}
