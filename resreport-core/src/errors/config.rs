use thiserror::Error;

/// Report configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err.to_string())
    }
}

impl ConfigError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConfigError::Yaml(_) | ConfigError::Invalid(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "IO_ERROR",
            ConfigError::Yaml(_) => "YAML_ERROR",
            ConfigError::Invalid(_) => "INVALID_CONFIGURATION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{ not: a list").unwrap_err();
        let err = ConfigError::from(yaml_err);
        assert_eq!(err.error_code(), "YAML_ERROR");
        assert!(err.to_string().starts_with("YAML error:"));
    }
}
