//! Tests for credential resolution order, region detection and file fallthrough

use pretty_assertions::assert_eq;
use rstest::rstest;
use veracode_credentials::{
    ConfigFileStatus, CredentialResolver, CredentialSource, DEFAULT_BASE_URL, EU_BASE_URL, Error,
};
use veracode_test_utils::{CredentialsHome, env_map};

fn resolver(home: &CredentialsHome, env: &[(&str, &str)]) -> CredentialResolver {
    CredentialResolver::new()
        .with_home_dir(home.path())
        .with_env(env_map(env))
}

const ENV_CREDENTIALS: &[(&str, &str)] = &[
    ("VERACODE_API_ID", "env-id"),
    ("VERACODE_API_KEY", "env-secret"),
];

mod file_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eu_key_id_selects_eu_endpoint() {
        let home = CredentialsHome::new();
        home.write_credentials("vera01ei-AAAA", "secret", None);

        let credentials = resolver(&home, &[]).resolve().unwrap();

        assert_eq!(credentials.base_url(), EU_BASE_URL);
        assert_eq!(credentials.source(), CredentialSource::File);
        assert_eq!(credentials.api_id(), "vera01ei-AAAA");
        assert_eq!(credentials.api_secret(), "secret");
    }

    #[test]
    fn test_plain_key_id_selects_default_endpoint() {
        let home = CredentialsHome::new();
        home.write_credentials("1234567890abcdef", "secret", None);

        let credentials = resolver(&home, &[]).resolve().unwrap();

        assert_eq!(credentials.base_url(), DEFAULT_BASE_URL);
        assert_eq!(credentials.source(), CredentialSource::File);
    }

    #[test]
    fn test_unquoted_yaml_values() {
        let home = CredentialsHome::new();
        home.write_config("api:\n  key-id: 1234567890abcdef\n  key-secret: secret\n");

        let credentials = resolver(&home, &[]).resolve().unwrap();

        assert_eq!(credentials.base_url(), DEFAULT_BASE_URL);
        assert_eq!(credentials.source(), CredentialSource::File);
        assert_eq!(credentials.api_id(), "1234567890abcdef");
        assert_eq!(credentials.api_secret(), "secret");
    }

    #[test]
    fn test_explicit_url_overrides_eu_detection() {
        let home = CredentialsHome::new();
        home.write_credentials("vera01ei-AAAA", "secret", Some("https://proxy.internal"));

        let credentials = resolver(&home, &[]).resolve().unwrap();

        assert_eq!(credentials.base_url(), "https://proxy.internal");
    }

    #[test]
    fn test_file_wins_over_environment() {
        let home = CredentialsHome::new();
        home.write_credentials("file-id", "file-secret", None);

        let credentials = resolver(&home, ENV_CREDENTIALS).resolve().unwrap();

        assert_eq!(credentials.api_id(), "file-id");
        assert_eq!(credentials.source(), CredentialSource::File);
    }

    #[test]
    fn test_missing_api_section_falls_through() {
        let home = CredentialsHome::new();
        home.write_config("other:\n  setting: true\n");

        let credentials = resolver(&home, ENV_CREDENTIALS).resolve().unwrap();

        assert_eq!(credentials.source(), CredentialSource::Env);
    }
}

mod env_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_env_only() {
        let home = CredentialsHome::new();

        let credentials = resolver(&home, ENV_CREDENTIALS).resolve().unwrap();

        assert_eq!(credentials.source(), CredentialSource::Env);
        assert_eq!(credentials.api_id(), "env-id");
        assert_eq!(credentials.api_secret(), "env-secret");
        assert_eq!(credentials.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_eu_key_id() {
        let home = CredentialsHome::new();

        let credentials = resolver(
            &home,
            &[
                ("VERACODE_API_ID", "vera01ei-BBBB"),
                ("VERACODE_API_KEY", "env-secret"),
            ],
        )
        .resolve()
        .unwrap();

        assert_eq!(credentials.base_url(), EU_BASE_URL);
    }

    #[test]
    fn test_env_explicit_url_overrides_eu_detection() {
        let home = CredentialsHome::new();

        let credentials = resolver(
            &home,
            &[
                ("VERACODE_API_ID", "vera01ei-BBBB"),
                ("VERACODE_API_KEY", "env-secret"),
                ("VERACODE_API_BASE_URL", "https://api.example.test"),
            ],
        )
        .resolve()
        .unwrap();

        assert_eq!(credentials.base_url(), "https://api.example.test");
    }

    #[rstest]
    #[case::nothing(&[])]
    #[case::id_only(&[("VERACODE_API_ID", "env-id")])]
    #[case::key_only(&[("VERACODE_API_KEY", "env-secret")])]
    #[case::empty_values(&[("VERACODE_API_ID", ""), ("VERACODE_API_KEY", "")])]
    fn test_not_found(#[case] env: &[(&str, &str)]) {
        let home = CredentialsHome::new();

        let err = resolver(&home, env).resolve().unwrap_err();

        assert!(matches!(err, Error::NotFound));
        assert!(err.to_string().starts_with("Veracode credentials not found"));
    }
}

mod fallthrough_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::blank_values("api:\n  key-id: \"\"\n  key-secret: \"\"\n")]
    #[case::null_values("api:\n  key-id:\n  key-secret:\n")]
    #[case::missing_secret("api:\n  key-id: file-id\n")]
    #[case::empty_file("")]
    fn test_incomplete_file_falls_through(#[case] content: &str) {
        let home = CredentialsHome::new();
        home.write_config(content);

        let credentials = resolver(&home, ENV_CREDENTIALS).resolve().unwrap();

        assert_eq!(credentials.source(), CredentialSource::Env);
        assert_eq!(credentials.api_id(), "env-id");
    }

    #[test]
    fn test_malformed_file_falls_through_to_env() {
        let home = CredentialsHome::new();
        home.write_config("api: [key-id: : {\n");

        let credentials = resolver(&home, ENV_CREDENTIALS).resolve().unwrap();

        assert_eq!(credentials.source(), CredentialSource::Env);
    }

    #[test]
    fn test_malformed_file_without_env_is_not_found() {
        let home = CredentialsHome::new();
        home.write_config("api: [key-id: : {\n");

        let err = resolver(&home, &[]).resolve().unwrap_err();

        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_resolution_is_not_cached() {
        let home = CredentialsHome::new();
        let resolver = resolver(&home, ENV_CREDENTIALS);
        assert_eq!(resolver.resolve().unwrap().source(), CredentialSource::Env);

        home.write_credentials("file-id", "file-secret", None);

        assert_eq!(resolver.resolve().unwrap().source(), CredentialSource::File);
    }
}

mod status_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_absent() {
        let home = CredentialsHome::new();
        assert_eq!(
            resolver(&home, ENV_CREDENTIALS).config_file_status(),
            ConfigFileStatus::Absent
        );
    }

    #[test]
    fn test_status_usable() {
        let home = CredentialsHome::new();
        home.write_credentials("file-id", "file-secret", None);
        assert_eq!(
            resolver(&home, &[]).config_file_status(),
            ConfigFileStatus::Usable
        );
    }

    #[test]
    fn test_status_incomplete() {
        let home = CredentialsHome::new();
        home.write_config("api:\n  key-id: file-id\n  key-secret: \"\"\n");
        assert_eq!(
            resolver(&home, &[]).config_file_status(),
            ConfigFileStatus::Incomplete
        );
    }

    #[test]
    fn test_status_malformed_names_the_file() {
        let home = CredentialsHome::new();
        home.write_config("api: [key-id: : {\n");

        match resolver(&home, ENV_CREDENTIALS).config_file_status() {
            ConfigFileStatus::Malformed { reason } => {
                assert!(reason.contains("veracode.yml"), "reason: {reason}");
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
    }
}
