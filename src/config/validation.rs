//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts bounded)
//! - Check that addresses and the endpoint URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::ServiceConfig;
use crate::resilience::RetryPolicy;

const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

struct Collector(Vec<ValidationError>);

impl Collector {
    fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.0.push(ValidationError {
                field,
                message: message.into(),
            });
        }
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut c = Collector(Vec::new());

    c.check(
        config.listener.bind_address.parse::<SocketAddr>().is_ok(),
        "listener.bind_address",
        format!("invalid socket address '{}'", config.listener.bind_address),
    );
    c.check(
        config.listener.max_connections > 0,
        "listener.max_connections",
        "must be greater than 0",
    );

    match url::Url::parse(&config.llm.base_url) {
        Ok(url) => c.check(
            matches!(url.scheme(), "http" | "https"),
            "llm.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        ),
        Err(e) => c.check(false, "llm.base_url", format!("invalid URL: {}", e)),
    }
    c.check(!config.llm.model.trim().is_empty(), "llm.model", "must not be empty");
    c.check(
        (0.0..=2.0).contains(&config.llm.temperature),
        "llm.temperature",
        "must be between 0 and 2",
    );
    c.check(config.llm.max_tokens > 0, "llm.max_tokens", "must be greater than 0");

    let t = &config.timeouts;
    c.check(t.connect_secs > 0, "timeouts.connect_secs", "must be greater than 0");
    c.check(
        t.upstream_request_secs > 0,
        "timeouts.upstream_request_secs",
        "must be greater than 0",
    );

    let r = &config.retries;
    let budget = RetryPolicy::from_config(r)
        .worst_case_duration(Duration::from_secs(t.upstream_request_secs));
    c.check(
        Duration::from_secs(t.server_request_secs) >= budget,
        "timeouts.server_request_secs",
        format!(
            "must cover every retry attempt and delay ({} ms)",
            budget.as_millis()
        ),
    );
    c.check(
        (1..=MAX_ATTEMPTS_LIMIT).contains(&r.max_attempts),
        "retries.max_attempts",
        format!("must be between 1 and {}", MAX_ATTEMPTS_LIMIT),
    );
    c.check(
        r.max_delay_ms >= r.base_delay_ms,
        "retries.max_delay_ms",
        "must not be smaller than retries.base_delay_ms",
    );

    c.check(config.sessions.ttl_secs > 0, "sessions.ttl_secs", "must be greater than 0");
    c.check(
        config.sessions.sweep_interval_secs > 0,
        "sessions.sweep_interval_secs",
        "must be greater than 0",
    );

    c.check(
        config.drafts.max_entries > 0,
        "drafts.max_entries",
        "must be greater than 0",
    );
    if let Some(path) = &config.drafts.persistence_path {
        c.check(!path.trim().is_empty(), "drafts.persistence_path", "must not be empty");
    }

    if config.observability.metrics_enabled {
        c.check(
            config.observability.metrics_address.parse::<SocketAddr>().is_ok(),
            "observability.metrics_address",
            format!(
                "invalid socket address '{}'",
                config.observability.metrics_address
            ),
        );
    }

    c.check(
        config.security.max_body_size > 0,
        "security.max_body_size",
        "must be greater than 0",
    );

    if c.0.is_empty() {
        Ok(())
    } else {
        Err(c.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_bad_endpoint_and_timeouts() {
        let mut config = ServiceConfig::default();
        config.llm.base_url = "ftp://example.com".into();
        config.timeouts.server_request_secs = 10;
        config.llm.temperature = 3.0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"llm.base_url"));
        assert!(fields.contains(&"timeouts.server_request_secs"));
        assert!(fields.contains(&"llm.temperature"));
    }

    #[test]
    fn test_server_timeout_must_cover_retry_budget() {
        let mut config = ServiceConfig::default();
        config.timeouts.upstream_request_secs = 1;
        config.timeouts.server_request_secs = 1;
        config.retries.max_attempts = 3;
        config.retries.base_delay_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "timeouts.server_request_secs");

        config.timeouts.server_request_secs = 3;
        assert!(validate_config(&config).is_ok());

        config.retries.base_delay_ms = 1000;
        assert!(validate_config(&config).is_err());

        config.timeouts.server_request_secs = 6;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
