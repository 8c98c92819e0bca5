//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse into the first error, if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_broker(config, &mut result);
        Self::validate_discovery(config, &mut result);
        Self::validate_publish(config, &mut result);
        Self::validate_hass(config, &mut result);

        Ok(result)
    }

    fn validate_broker(config: &Config, result: &mut ValidationResult) {
        let broker = &config.broker;

        if broker.url.is_empty() {
            result.add_error(ValidationError::new("broker.url", "Broker URL cannot be empty"));
        } else if !["tcp://", "ssl://", "ws://", "wss://", "mqtt://", "mqtts://"]
            .iter()
            .any(|scheme| broker.url.starts_with(scheme))
        {
            result.add_error(ValidationError::new(
                "broker.url",
                format!("Unsupported broker URL scheme: {}", broker.url),
            ));
        }

        if broker.client_id.is_empty() {
            result.add_error(ValidationError::new(
                "broker.client_id",
                "client_id cannot be empty",
            ));
        }

        if broker.password.is_some() && broker.username.is_none() {
            result.add_warning(ValidationWarning::new(
                "broker.password",
                "password is set without a username and will be ignored",
            ));
        }

        if broker.server_name.is_some() && broker.url.starts_with("tcp://") {
            result.add_warning(ValidationWarning::new(
                "broker.server_name",
                "server_name enables TLS but the broker URL uses tcp://",
            ));
        }
    }

    fn validate_discovery(config: &Config, result: &mut ValidationResult) {
        let discovery = &config.discovery;

        if discovery.quiescence_ms == 0 {
            result.add_error(ValidationError::new(
                "discovery.quiescence_ms",
                "quiescence_ms must be greater than 0",
            ));
        }

        if discovery.timeout_ms > 0 && discovery.timeout_ms < discovery.quiescence_ms {
            result.add_warning(ValidationWarning::new(
                "discovery.timeout_ms",
                "timeout_ms is shorter than quiescence_ms, sweeps will end on the timeout",
            ));
        }
    }

    fn validate_publish(config: &Config, result: &mut ValidationResult) {
        if config.publish.max_concurrency == 0 {
            result.add_error(ValidationError::new(
                "publish.max_concurrency",
                "max_concurrency must be greater than 0",
            ));
        }
    }

    fn validate_hass(config: &Config, result: &mut ValidationResult) {
        let prefix = &config.hass.discovery_prefix;
        let valid = !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            result.add_error(ValidationError::new(
                "hass.discovery_prefix",
                "discovery_prefix may only contain letters, digits, '_' and '-'",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
