use crate::config::types::{Config, DbConfig, LogicConfig, RestrictionsConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_db_config(&config.db)?;
    validate_logic_config(&config.logic)?;
    validate_seeds(&config.seeds)?;
    validate_restrictions(&config.restrictions)?;
    Ok(())
}

fn validate_db_config(config: &DbConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "db.path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_logic_config(config: &LogicConfig) -> Result<(), ConfigError> {
    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.revisit_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "revisit-interval must be >= 1s, got {}s",
            config.revisit_interval
        )));
    }

    if config.failure_backoff < 1 {
        return Err(ConfigError::Validation(format!(
            "failure-backoff must be >= 1s, got {}s",
            config.failure_backoff
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(
            "timeout must be >= 1s".to_string(),
        ));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max-retries must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Seeds must be absolute http(s) URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use the http or https scheme",
                seed
            )));
        }
    }
    Ok(())
}

fn validate_restrictions(config: &RestrictionsConfig) -> Result<(), ConfigError> {
    for domain in &config.allowed_domains {
        validate_domain_pattern(domain)?;
    }

    if config.disallowed_paths.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "disallowed-paths cannot contain an empty token".to_string(),
        ));
    }

    Ok(())
}

/// Validates an allowed-domain entry (`example.com`, `*.example.com` or `.example.com`)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern
        .strip_prefix("*.")
        .or_else(|| pattern.strip_prefix('.'))
        .unwrap_or(pattern);

    validate_domain_string(domain)
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
