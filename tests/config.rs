// ABOUTME: Integration tests for settings discovery and the embedded network configurations.
// ABOUTME: Tests YAML parsing, defaults and validation.

use hedera_local::config::*;
use hedera_local::error::Error;
use hedera_local::types::NetworkType;
use std::fs;
use std::time::Duration;

mod settings {
    use super::*;

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
connection:
  retries: 20
  interval: 250ms
  check_timeout: 1s
retry:
  max_attempts: 5
  back_off: 2s
log_debounce: 10s
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.connection.retries, 20);
        assert_eq!(settings.connection.interval, Duration::from_millis(250));
        assert_eq!(settings.connection.check_timeout, Duration::from_secs(1));
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.back_off, Duration::from_secs(2));
        assert_eq!(settings.log_debounce, Duration::from_secs(10));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_yaml("connection:\n  attempts: 3\n").is_err());
    }

    #[test]
    fn zero_retries_are_invalid() {
        let err = Settings::from_yaml("connection:\n  retries: 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn no_file_means_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let settings = Settings::discover(None, temp.path()).unwrap();
        assert_eq!(settings.connection.retries, 100);
    }

    #[test]
    fn finds_the_alternate_extension() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME_ALT), "log_debounce: 1s\n").unwrap();
        let settings = Settings::discover(None, temp.path()).unwrap();
        assert_eq!(settings.log_debounce, Duration::from_secs(1));
    }

    #[test]
    fn explicit_path_must_exist() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("elsewhere.yml");
        let err = Settings::discover(Some(&missing), temp.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(path) if path == missing));
    }
}

mod embedded {
    use super::*;

    #[test]
    fn every_network_carries_operator_credentials() {
        for network in [
            NetworkType::Local,
            NetworkType::Mainnet,
            NetworkType::Testnet,
            NetworkType::Previewnet,
        ] {
            let config = NetworkConfiguration::for_network(network).unwrap();
            assert!(
                config.environment().any(|e| e.key == "RELAY_OPERATOR_ID_MAIN"),
                "{network}"
            );
        }
    }

    #[test]
    fn initial_resources_parse() {
        let resources = InitialResources::load().unwrap();
        assert!(!resources.accounts.is_empty());
        assert!(resources.tokens.iter().any(|t| t.symbol == "HTS"));
    }

    #[test]
    fn original_node_configuration_parses() {
        let original = OriginalNodeConfiguration::load().unwrap();
        assert!(!original.bootstrap_text().is_empty());
    }
}
