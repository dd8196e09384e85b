//! PII redaction pipeline for Zentinel.
//!
//! Masks personally identifiable substrings in free text:
//! - IPv4 addresses
//! - Email addresses
//! - US Social Security Numbers (reserved ranges excluded)
//! - US phone numbers
//! - Payment card numbers (Luhn checked)
//!
//! Every match is replaced by one generic placeholder, so the masked text does
//! not reveal which type was found; the per-type counts travel separately in
//! the response metadata. Input text is never logged or retained.

pub mod batch;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod request;

pub use config::{RedactorConfig, RedactorConfigJson, DEFAULT_MAX_INPUT_LENGTH};
pub use detection::{PatternRegistry, PiiType, DEFAULT_PLACEHOLDER};
pub use engine::{Redaction, Redactor};
pub use error::{BoundaryError, ErrorResponse, RegistryError};
pub use metadata::{Capabilities, RedactResponse, RedactionMetadata};

use request::RequestGuard;
use tracing::{debug, info};

/// Service name reported in capability listings
pub const SERVICE_NAME: &str = "zentinel-pii-redactor";

/// Redaction service: an immutable registry plus the boundary checks in front of it
///
/// Built once at startup and shared read-only between requests.
pub struct RedactionService {
    config: RedactorConfig,
    redactor: Redactor,
    guard: RequestGuard,
}

impl RedactionService {
    /// Build the service, failing if any detector or the placeholder is invalid
    pub fn new(config: RedactorConfig) -> Result<Self, RegistryError> {
        let registry = PatternRegistry::with_types(&config.enabled_types, &config.placeholder)?;
        let guard = RequestGuard::new(config.max_input_length)?;

        info!(
            types = ?registry.types().iter().map(PiiType::as_str).collect::<Vec<_>>(),
            max_input_length = config.max_input_length,
            "Redaction service ready"
        );

        Ok(Self {
            redactor: Redactor::new(registry),
            guard,
            config,
        })
    }

    pub fn config(&self) -> &RedactorConfig {
        &self.config
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// Redact `text`, rejecting empty or oversized input
    pub fn redact(&self, text: &str) -> Result<RedactResponse, BoundaryError> {
        self.guard.check(text)?;
        Ok(self.run(text))
    }

    /// Parse a JSON request body (`{"text": ...}`) and redact its text
    pub fn handle_body(&self, body: &str) -> Result<RedactResponse, BoundaryError> {
        let text = self.guard.parse(body)?;
        Ok(self.run(&text))
    }

    /// Supported types and limits
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            supported_types: self.redactor.registry().types(),
            placeholder: self.config.placeholder.clone(),
            max_input_length: self.guard.max_length(),
        }
    }

    fn run(&self, text: &str) -> RedactResponse {
        let response = RedactResponse::from(self.redactor.redact(text));
        debug!(
            total = response.metadata.total_redactions,
            original_length = response.metadata.original_length,
            redacted_length = response.metadata.redacted_length,
            "Redaction complete"
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> RedactionService {
        RedactionService::new(RedactorConfig::default()).unwrap()
    }

    #[test]
    fn test_service_redacts() {
        let response = service().redact("My SSN is 123-45-6789.").unwrap();
        assert_eq!(response.redacted_text, "My SSN is [REDACTED].");
        assert_eq!(response.metadata.total_redactions, 1);
    }

    #[test]
    fn test_service_rejects_empty() {
        let err = service().redact("").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_service_respects_enabled_types() {
        let config = RedactorConfig {
            enabled_types: vec![PiiType::Email],
            ..Default::default()
        };
        let service = RedactionService::new(config).unwrap();
        let response = service.redact("a@b.io 123-45-6789").unwrap();
        assert_eq!(response.redacted_text, "[REDACTED] 123-45-6789");
    }

    #[test]
    fn test_service_rejects_bad_placeholder() {
        let config = RedactorConfig {
            placeholder: "<#1>".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RedactionService::new(config),
            Err(RegistryError::InvalidPlaceholder { .. })
        ));
    }

    #[test]
    fn test_capabilities() {
        let caps = service().capabilities();
        assert_eq!(caps.service, "zentinel-pii-redactor");
        assert_eq!(caps.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(caps.supported_types, PiiType::ALL);
        assert_eq!(caps.max_input_length, DEFAULT_MAX_INPUT_LENGTH);

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(
            json["supported_types"],
            serde_json::json!(["ipv4", "email", "ssn_us", "phone_us", "credit_card"])
        );
    }
}
