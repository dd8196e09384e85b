//! Response payloads handed to the transport layer.

use crate::detection::PiiType;
use crate::engine::Redaction;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts and length accounting for one redaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactionMetadata {
    /// Always equal to the sum of `redactions_by_type`
    pub total_redactions: usize,
    /// Only types with at least one redaction, in evaluation order
    pub redactions_by_type: BTreeMap<PiiType, usize>,
    pub original_length: usize,
    pub redacted_length: usize,
}

/// Successful result of a redaction request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactResponse {
    pub redacted_text: String,
    #[serde(flatten)]
    pub metadata: RedactionMetadata,
}

impl From<Redaction> for RedactResponse {
    fn from(redaction: Redaction) -> Self {
        let metadata = RedactionMetadata {
            total_redactions: redaction.total(),
            redacted_length: redaction.masked_text.chars().count(),
            original_length: redaction.original_length,
            redactions_by_type: redaction.counts,
        };

        Self {
            redacted_text: redaction.masked_text,
            metadata,
        }
    }
}

/// Static description of what this service detects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub service: &'static str,
    pub version: &'static str,
    pub supported_types: Vec<PiiType>,
    pub placeholder: String,
    pub max_input_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_redaction() {
        let mut counts = BTreeMap::new();
        counts.insert(PiiType::PhoneUs, 2);
        counts.insert(PiiType::Email, 1);

        let response = RedactResponse::from(Redaction {
            original_length: 64,
            masked_text: "[REDACTED] [REDACTED] [REDACTED]".to_string(),
            counts,
        });

        assert_eq!(response.metadata.total_redactions, 3);
        assert_eq!(response.metadata.original_length, 64);
        assert_eq!(response.metadata.redacted_length, 32);
    }

    #[test]
    fn test_response_json_shape() {
        let mut counts = BTreeMap::new();
        counts.insert(PiiType::CreditCard, 1);
        counts.insert(PiiType::SsnUs, 1);

        let response = RedactResponse::from(Redaction {
            original_length: 30,
            masked_text: "a [REDACTED] b [REDACTED]".to_string(),
            counts,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "redacted_text": "a [REDACTED] b [REDACTED]",
                "total_redactions": 2,
                "redactions_by_type": {"ssn_us": 1, "credit_card": 1},
                "original_length": 30,
                "redacted_length": 25
            })
        );
    }
}
