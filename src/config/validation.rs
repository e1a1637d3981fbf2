//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("channels contains an empty name")]
    EmptyChannel,
    #[error("channel name may not contain spaces or commas: '{0}'")]
    InvalidChannel(String),
    #[error("identity.username may not be empty")]
    EmptyUsername,
    #[error("connection.preferred_port may not be 0")]
    InvalidPort,
    #[error("connection.retries must be -1 (unlimited) or >= 0, got {0}")]
    InvalidRetries(i64),
    #[error("options.channel_user_capacity must be at least 1")]
    ZeroChannelCapacity,
    #[error("store.path parent directory does not exist: {0}")]
    StorePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for channel in &config.channels {
        let name = channel.trim_start_matches('#');
        if name.is_empty() {
            errors.push(ValidationError::EmptyChannel);
        } else if name.contains([' ', ',']) {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    if config.identity.username.as_deref() == Some("") {
        errors.push(ValidationError::EmptyUsername);
    }

    if config.connection.preferred_port == Some(0) {
        errors.push(ValidationError::InvalidPort);
    }
    if config.connection.retries < -1 {
        errors.push(ValidationError::InvalidRetries(config.connection.retries));
    }

    if config.options.channel_user_capacity == 0 {
        errors.push(ValidationError::ZeroChannelCapacity);
    }

    // Store path validation (skip in-memory)
    if let Some(ref store) = config.store
        && store.path != ":memory:"
        && let Some(parent) = Path::new(&store.path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::StorePathInvalid(store.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config::parse(
            r##"
            channels = ["#", "bad name"]

            [identity]
            username = "bot"

            [connection]
            preferred_port = 0
            retries = -5

            [options]
            channel_user_capacity = 0
            "##,
        )
        .unwrap();

        let errors = validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyChannel,
                ValidationError::InvalidChannel("bad name".into()),
                ValidationError::InvalidPort,
                ValidationError::InvalidRetries(-5),
                ValidationError::ZeroChannelCapacity,
            ]
        );
    }

    #[test]
    fn test_username_without_password_is_valid() {
        let config = Config::parse(
            r#"
            [identity]
            username = "bot"
            "#,
        )
        .unwrap();
        assert!(validate(&config).is_ok());

        let config = Config::parse(
            r#"
            [identity]
            username = ""
            "#,
        )
        .unwrap();
        assert_eq!(
            validate(&config).unwrap_err(),
            vec![ValidationError::EmptyUsername]
        );
    }

    #[test]
    fn test_store_path_parent_must_exist() {
        let config = Config::parse(
            r#"
            [store]
            path = "/definitely/not/here/records.db"
            "#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::StorePathInvalid(_)));

        let dir = tempfile::tempdir().unwrap();
        let mut ok = Config::default();
        ok.store = Some(super::super::StoreConfig {
            path: dir.path().join("records.db").display().to_string(),
        });
        assert!(validate(&ok).is_ok());
    }
}
