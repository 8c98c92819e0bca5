
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_broker_url() {
        let mut config = Config::default();
        config.broker.url = String::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "broker.url"));
    }

    #[test]
    fn test_validate_unknown_scheme() {
        let mut config = Config::default();
        config.broker.url = "http://localhost:1883".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "broker.url"));
    }

    #[test]
    fn test_validate_ssl_url() {
        let mut config = Config::default();
        config.broker.url = "ssl://broker:8883".to_string();
        config.broker.server_name = Some("broker".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_empty_client_id() {
        let mut config = Config::default();
        config.broker.client_id = String::new();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "broker.client_id"));
    }

    #[test]
    fn test_password_without_username_warning() {
        let mut config = Config::default();
        config.broker.password = Some("secret".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "broker.password"));
    }

    #[test]
    fn test_server_name_on_plain_tcp_warning() {
        let mut config = Config::default();
        config.broker.server_name = Some("broker".to_string());

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "broker.server_name"));
    }

    #[test]
    fn test_validate_zero_quiescence() {
        let mut config = Config::default();
        config.discovery.quiescence_ms = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "discovery.quiescence_ms"));
    }

    #[test]
    fn test_short_timeout_warning() {
        let mut config = Config::default();
        config.discovery.quiescence_ms = 300;
        config.discovery.timeout_ms = 100;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "discovery.timeout_ms"));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = Config::default();
        config.publish.max_concurrency = 0;

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "publish.max_concurrency"));
    }

    #[test]
    fn test_validate_discovery_prefix() {
        let mut config = Config::default();
        config.hass.discovery_prefix = "home/assistant".to_string();

        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.errors.iter().any(|e| e.path == "hass.discovery_prefix"));

        config.hass.discovery_prefix = String::new();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(!result.is_valid());

        config.hass.discovery_prefix = "home-assistant_2".to_string();
        let result = ConfigValidator::validate(&config).unwrap();
        assert!(result.is_valid());
    }

    #[test]
    fn test_into_result_reports_first_error() {
        let mut config = Config::default();
        config.publish.max_concurrency = 0;
        config.discovery.quiescence_ms = 0;

        let err = ConfigValidator::validate(&config)
            .unwrap()
            .into_result()
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "discovery.quiescence_ms"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_result_returns_warnings() {
        let mut config = Config::default();
        config.broker.password = Some("secret".to_string());

        let warnings = ConfigValidator::validate(&config)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_validation_result_add() {
        let mut result = ValidationResult::default();
        assert!(result.is_valid());
        result.add_warning(ValidationWarning::new("a", "warn"));
        assert!(result.is_valid());
        result.add_error(ValidationError::new("b", "err"));
        assert!(!result.is_valid());
    }
