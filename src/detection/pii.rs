//! PII (Personally Identifiable Information) detectors and their registry.
//!
//! The registry order is part of the contract: later detectors scan the text
//! produced by earlier ones. SSN and phone numbers are 9-10 digit runs that also
//! fit inside a 13-19 digit card window, so they must be masked before the card
//! detector gets to see them.

use super::validators::{luhn_valid, ssn_valid, Validator};
use crate::error::RegistryError;
use regex::{Matches, Regex};
use serde::Serialize;
use tracing::debug;

/// Default replacement token. No digits, `@` or dots, so it can never re-match.
pub const DEFAULT_PLACEHOLDER: &str = "[REDACTED]";

const IPV4_RULE: &str = r"\b(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\b";

const EMAIL_RULE: &str = r"\b[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}\b";

const SSN_RULE: &str = r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b";

// Parenthesized area code, or one separator style used throughout.
const PHONE_RULE: &str = concat!(
    r"(?:\+1[-. ]?)?\([0-9]{3}\)[-. ]?[0-9]{3}[-. ][0-9]{4}\b",
    r"|(?:\+1[-. ]?|\b)(?:[0-9]{3}-[0-9]{3}-[0-9]{4}|[0-9]{3}\.[0-9]{3}\.[0-9]{4}|[0-9]{3} [0-9]{3} [0-9]{4}|[0-9]{10})\b",
);

// Greedy: a Luhn-failing 17-19 digit run is rejected whole, digits inside it included.
const CREDIT_CARD_RULE: &str = r"\b[0-9](?:[ -]?[0-9]){12,18}\b";

/// Types of PII that can be detected, declared in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    Ipv4,
    Email,
    SsnUs,
    PhoneUs,
    CreditCard,
}

impl PiiType {
    /// Every type, in evaluation order
    pub const ALL: [PiiType; 5] = [
        PiiType::Ipv4,
        PiiType::Email,
        PiiType::SsnUs,
        PiiType::PhoneUs,
        PiiType::CreditCard,
    ];

    /// Stable type identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiType::Ipv4 => "ipv4",
            PiiType::Email => "email",
            PiiType::SsnUs => "ssn_us",
            PiiType::PhoneUs => "phone_us",
            PiiType::CreditCard => "credit_card",
        }
    }

    fn rule(&self) -> &'static str {
        match self {
            PiiType::Ipv4 => IPV4_RULE,
            PiiType::Email => EMAIL_RULE,
            PiiType::SsnUs => SSN_RULE,
            PiiType::PhoneUs => PHONE_RULE,
            PiiType::CreditCard => CREDIT_CARD_RULE,
        }
    }

    fn validator(&self) -> Option<Validator> {
        match self {
            PiiType::SsnUs => Some(ssn_valid),
            PiiType::CreditCard => Some(luhn_valid),
            PiiType::Ipv4 | PiiType::Email | PiiType::PhoneUs => None,
        }
    }
}

impl std::fmt::Display for PiiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PiiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        PiiType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Invalid PII type: {}", s))
    }
}

/// A single detector: matching rule, optional validator and replacement token
#[derive(Clone)]
pub struct Detector {
    pii_type: PiiType,
    rule: Regex,
    validator: Option<Validator>,
    placeholder: String,
}

impl Detector {
    /// Compile a detector from a matching rule
    pub fn new(
        pii_type: PiiType,
        rule: &str,
        validator: Option<Validator>,
        placeholder: &str,
    ) -> Result<Self, RegistryError> {
        let rule = Regex::new(rule).map_err(|source| RegistryError::InvalidPattern {
            id: pii_type.as_str(),
            source,
        })?;

        Ok(Self {
            pii_type,
            rule,
            validator,
            placeholder: placeholder.to_string(),
        })
    }

    /// The built-in detector for a PII type
    pub fn standard(pii_type: PiiType, placeholder: &str) -> Result<Self, RegistryError> {
        Self::new(pii_type, pii_type.rule(), pii_type.validator(), placeholder)
    }

    pub fn pii_type(&self) -> PiiType {
        self.pii_type
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Non-overlapping syntactic matches, left to right
    pub fn candidates<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.rule.find_iter(text)
    }

    /// Whether a candidate passes this detector's validator
    pub fn accepts(&self, candidate: &str) -> bool {
        self.validator.map_or(true, |validate| validate(candidate))
    }

    /// Whether the matching rule fires anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.rule.is_match(text)
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("pii_type", &self.pii_type)
            .field("rule", &self.rule.as_str())
            .field("validated", &self.validator.is_some())
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

/// Ordered, immutable list of detectors
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    detectors: Vec<Detector>,
}

impl PatternRegistry {
    /// Build a registry, checking ordering and the placeholder invariant
    pub fn new(detectors: Vec<Detector>) -> Result<Self, RegistryError> {
        if detectors.is_empty() {
            return Err(RegistryError::Empty);
        }

        for pair in detectors.windows(2) {
            let (earlier, later) = (pair[0].pii_type, pair[1].pii_type);
            if earlier == later {
                return Err(RegistryError::DuplicateDetector(earlier.as_str()));
            }
            if earlier > later {
                return Err(RegistryError::OutOfOrder {
                    earlier: earlier.as_str(),
                    later: later.as_str(),
                });
            }
        }

        for detector in &detectors {
            check_placeholder(&detector.placeholder, &detectors)?;
        }

        debug!(
            detectors = detectors.len(),
            types = ?detectors.iter().map(|d| d.pii_type.as_str()).collect::<Vec<_>>(),
            "Pattern registry built"
        );

        Ok(Self { detectors })
    }

    /// Registry with every built-in detector
    pub fn standard(placeholder: &str) -> Result<Self, RegistryError> {
        Self::with_types(&PiiType::ALL, placeholder)
    }

    /// Registry restricted to `types`, kept in evaluation order whatever order they are given in
    pub fn with_types(types: &[PiiType], placeholder: &str) -> Result<Self, RegistryError> {
        let mut types = types.to_vec();
        types.sort();
        types.dedup();

        let detectors = types
            .into_iter()
            .map(|t| Detector::standard(t, placeholder))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(detectors)
    }

    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// Enabled types, in evaluation order
    pub fn types(&self) -> Vec<PiiType> {
        self.detectors.iter().map(|d| d.pii_type).collect()
    }
}

/// Characters an email local part or domain can be built from
fn is_email_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-' | '@')
}

/// A placeholder must never be matchable by any detector, alone or next to text
fn check_placeholder(placeholder: &str, detectors: &[Detector]) -> Result<(), RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidPlaceholder {
        placeholder: placeholder.to_string(),
        reason: reason.to_string(),
    };

    if placeholder.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if placeholder.chars().any(|c| c.is_ascii_digit() || c == '@' || c == '.') {
        return Err(invalid("must not contain digits, '@' or '.'"));
    }
    let delimited = placeholder
        .chars()
        .next()
        .zip(placeholder.chars().last())
        .is_some_and(|(first, last)| !is_email_char(first) && !is_email_char(last));
    if !delimited {
        return Err(invalid(
            "must start and end with a character that cannot join an email or number",
        ));
    }

    let contexts = [
        placeholder.to_string(),
        format!("x@y.{}", placeholder),
        format!("{}@y.io", placeholder),
        format!("1{}1", placeholder),
    ];
    for context in &contexts {
        if let Some(d) = detectors.iter().find(|d| d.is_match(context)) {
            return Err(invalid(&format!("matched by the {} detector", d.pii_type)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pii_type: PiiType, text: &str) -> Vec<String> {
        Detector::standard(pii_type, DEFAULT_PLACEHOLDER)
            .unwrap()
            .candidates(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_ipv4_in_range() {
        assert_eq!(matches(PiiType::Ipv4, "host 192.168.1.1 up"), ["192.168.1.1"]);
        assert_eq!(
            matches(PiiType::Ipv4, "0.0.0.0 and 255.255.255.255"),
            ["0.0.0.0", "255.255.255.255"]
        );
    }

    #[test]
    fn test_ipv4_rejects_out_of_range_outright() {
        assert!(matches(PiiType::Ipv4, "999.999.999.999").is_empty());
        assert!(matches(PiiType::Ipv4, "256.1.1.1").is_empty());
        assert!(matches(PiiType::Ipv4, "1.1.1.300").is_empty());
    }

    #[test]
    fn test_ipv4_rejects_leading_zeros_and_partial_digits() {
        assert!(matches(PiiType::Ipv4, "01.2.3.4").is_empty());
        assert!(matches(PiiType::Ipv4, "1.2.3.04").is_empty());
        assert!(matches(PiiType::Ipv4, "11.2.3.4567").is_empty());
        assert!(matches(PiiType::Ipv4, "a1.2.3.4").is_empty());
    }

    #[test]
    fn test_email() {
        assert_eq!(
            matches(PiiType::Email, "Contact me at john.doe+tag@mail.example.co.uk please"),
            ["john.doe+tag@mail.example.co.uk"]
        );
        assert!(matches(PiiType::Email, "user@localhost").is_empty());

        let long_local = format!("{}@example.com", "a".repeat(70));
        let text = format!("mail {} now", long_local);
        assert_eq!(matches(PiiType::Email, &text), [long_local.as_str()]);
        assert_eq!(
            matches(PiiType::Email, "ops@example.international"),
            ["ops@example.international"]
        );
        assert!(matches(PiiType::Email, "user@example.c").is_empty());
    }

    #[test]
    fn test_ssn_shape() {
        assert_eq!(matches(PiiType::SsnUs, "My SSN is 123-45-6789."), ["123-45-6789"]);
        assert!(matches(PiiType::SsnUs, "123456789").is_empty());
        assert!(matches(PiiType::SsnUs, "1123-45-6789").is_empty());
    }

    #[test]
    fn test_phone_formats() {
        for phone in [
            "555-019-2834",
            "555.019.2834",
            "555 019 2834",
            "5550192834",
            "(555) 019-2834",
            "(555)019-2834",
            "+1 555-019-2834",
            "+1-555-019-2834",
            "+15550192834",
            "+1 (555) 019-2834",
        ] {
            let text = format!("Call me at {}.", phone);
            assert_eq!(matches(PiiType::PhoneUs, &text), [phone], "format {}", phone);
        }
    }

    #[test]
    fn test_phone_rejects_partial_digit_runs() {
        assert!(matches(PiiType::PhoneUs, "55501928345").is_empty());
        assert!(matches(PiiType::PhoneUs, "555-019-28345").is_empty());
        assert!(matches(PiiType::PhoneUs, "123-45-6789").is_empty());
    }

    #[test]
    fn test_credit_card_shapes() {
        assert_eq!(
            matches(PiiType::CreditCard, "Card: 4111-1111-1111-1111 ok"),
            ["4111-1111-1111-1111"]
        );
        assert_eq!(
            matches(PiiType::CreditCard, "Card: 4231 9001 6469 0061"),
            ["4231 9001 6469 0061"]
        );
        assert_eq!(matches(PiiType::CreditCard, "amex 378282246310005"), ["378282246310005"]);
        assert!(matches(PiiType::CreditCard, "123456789012").is_empty());
        assert!(matches(PiiType::CreditCard, "12345678901234567890").is_empty());
        assert!(matches(PiiType::CreditCard, "4111  1111 1111 1111").is_empty());
    }

    #[test]
    fn test_credit_card_candidate_is_greedy() {
        // The whole 19-digit run is the candidate, not the 16-digit card inside it
        assert_eq!(
            matches(PiiType::CreditCard, "4111 1111 1111 1111 123"),
            ["4111 1111 1111 1111 123"]
        );
        let card = Detector::standard(PiiType::CreditCard, DEFAULT_PLACEHOLDER).unwrap();
        assert!(!card.accepts("4111 1111 1111 1111 123"));
    }

    #[test]
    fn test_validators_wired_to_types() {
        let card = Detector::standard(PiiType::CreditCard, DEFAULT_PLACEHOLDER).unwrap();
        assert!(card.accepts("4231 9001 6469 0061"));
        assert!(!card.accepts("4532 0151 1283 0360"));

        let ssn = Detector::standard(PiiType::SsnUs, DEFAULT_PLACEHOLDER).unwrap();
        assert!(ssn.accepts("123-45-6789"));
        assert!(!ssn.accepts("000-00-0000"));

        let email = Detector::standard(PiiType::Email, DEFAULT_PLACEHOLDER).unwrap();
        assert!(email.accepts("anything"));
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = PatternRegistry::standard(DEFAULT_PLACEHOLDER).unwrap();
        let types = registry.types();
        assert_eq!(types, PiiType::ALL);

        let position = |t: PiiType| types.iter().position(|x| *x == t).unwrap();
        assert!(position(PiiType::SsnUs) < position(PiiType::CreditCard));
        assert!(position(PiiType::PhoneUs) < position(PiiType::CreditCard));
    }

    #[test]
    fn test_with_types_keeps_evaluation_order() {
        let registry = PatternRegistry::with_types(
            &[PiiType::CreditCard, PiiType::PhoneUs, PiiType::CreditCard],
            DEFAULT_PLACEHOLDER,
        )
        .unwrap();
        assert_eq!(registry.types(), [PiiType::PhoneUs, PiiType::CreditCard]);
    }

    #[test]
    fn test_rejects_out_of_order_registry() {
        let detectors = vec![
            Detector::standard(PiiType::CreditCard, DEFAULT_PLACEHOLDER).unwrap(),
            Detector::standard(PiiType::SsnUs, DEFAULT_PLACEHOLDER).unwrap(),
        ];
        assert!(matches!(
            PatternRegistry::new(detectors),
            Err(RegistryError::OutOfOrder {
                earlier: "credit_card",
                later: "ssn_us"
            })
        ));
    }

    #[test]
    fn test_rejects_duplicate_and_empty_registry() {
        let detectors = vec![
            Detector::standard(PiiType::Email, DEFAULT_PLACEHOLDER).unwrap(),
            Detector::standard(PiiType::Email, DEFAULT_PLACEHOLDER).unwrap(),
        ];
        assert!(matches!(
            PatternRegistry::new(detectors),
            Err(RegistryError::DuplicateDetector("email"))
        ));
        assert!(matches!(PatternRegistry::new(Vec::new()), Err(RegistryError::Empty)));
    }

    #[test]
    fn test_rejects_matchable_placeholders() {
        for bad in ["", "[REDACTED-1]", "x@y", "[PII.]", "1.2.3.4", "REDACTED", "[pii", "-x-"] {
            assert!(
                matches!(
                    PatternRegistry::standard(bad),
                    Err(RegistryError::InvalidPlaceholder { .. })
                ),
                "placeholder {:?} should be rejected",
                bad
            );
        }
        assert!(PatternRegistry::standard("***").is_ok());
        assert!(PatternRegistry::standard("<pii>").is_ok());
    }

    #[test]
    fn test_invalid_rule_is_a_registry_error() {
        let err = Detector::new(PiiType::Email, "([a-z", None, DEFAULT_PLACEHOLDER).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPattern { id: "email", .. }));
    }

    #[test]
    fn test_pii_type_from_str() {
        assert_eq!("ssn_us".parse::<PiiType>().unwrap(), PiiType::SsnUs);
        assert_eq!("Credit-Card".parse::<PiiType>().unwrap(), PiiType::CreditCard);
        assert_eq!(" ipv4 ".parse::<PiiType>().unwrap(), PiiType::Ipv4);
        assert!("passport".parse::<PiiType>().is_err());
    }
}
