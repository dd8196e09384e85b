//! Detection modules: PII matching rules and their validators.

pub mod pii;
pub mod validators;

pub use pii::{Detector, PatternRegistry, PiiType, DEFAULT_PLACEHOLDER};
pub use validators::{luhn_valid, ssn_valid, Validator};
