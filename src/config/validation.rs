//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server block #{0} has an empty name")]
    EmptyServerName(usize),
    #[error("server names may not contain '.', got '{0}'")]
    DottedServerName(String),
    #[error("server '{0}' has port 0")]
    ZeroPort(String),
    #[error("server '{0}' is defined more than once")]
    DuplicateServer(String),
    #[error("server '{0}' has no nickname")]
    NoNicknames(String),
    #[error("server '{0}' lists {1} nicknames, at most 3 are used")]
    TooManyNicknames(String, usize),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, server) in config.servers.iter().enumerate() {
        if server.name.is_empty() {
            errors.push(ValidationError::EmptyServerName(index));
        } else if server.name.contains('.') {
            // Dotted names would break `server.option` addressing.
            errors.push(ValidationError::DottedServerName(server.name.clone()));
        }
        if !server.name.is_empty() && !seen.insert(server.name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateServer(server.name.clone()));
        }
        if server.port == 0 {
            errors.push(ValidationError::ZeroPort(server.name.clone()));
        }
        if server.nicks.iter().all(|n| n.trim().is_empty()) {
            errors.push(ValidationError::NoNicknames(server.name.clone()));
        }
        if server.nicks.len() > 3 {
            errors.push(ValidationError::TooManyNicknames(
                server.name.clone(),
                server.nicks.len(),
            ));
        }
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
    use crate::config::ServerBlock;

    fn config_with(servers: Vec<ServerBlock>) -> Config {
        Config {
            servers,
            ..Config::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = config_with(vec![ServerBlock::new("libera", "irc.libera.chat", "alice")]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_duplicate_names_fail() {
        let config = config_with(vec![
            ServerBlock::new("libera", "a", "alice"),
            ServerBlock::new("Libera", "b", "alice"),
        ]);
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateServer("Libera".into())]);
    }

    #[test]
    fn test_collects_every_error() {
        let mut server = ServerBlock::new("oftc", "irc.oftc.net", "alice");
        server.port = 0;
        server.nicks = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let config = config_with(vec![server, ServerBlock::new("x.y", "h", "n")]);
        let errors = validate(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroPort("oftc".into())));
        assert!(errors.contains(&ValidationError::TooManyNicknames("oftc".into(), 4)));
        assert!(errors.contains(&ValidationError::DottedServerName("x.y".into())));
    }
}
