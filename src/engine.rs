//! Redaction engine.
//!
//! Folds the ordered registry over the input. Each step discovers candidates
//! for one detector, filters them through its validator and substitutes the
//! survivors, then hands the rewritten text to the next detector.

use crate::detection::{Detector, PatternRegistry, PiiType};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

/// Outcome of one redaction pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    /// Input length in characters
    pub original_length: usize,
    /// Text with every accepted match replaced by the placeholder
    pub masked_text: String,
    /// Accepted matches per type; types with no matches are absent
    pub counts: BTreeMap<PiiType, usize>,
}

impl Redaction {
    /// Total number of replaced spans
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Per-request working state, dropped once the redaction is returned
struct RedactionRun<'a> {
    original: &'a str,
    working: String,
    counts: BTreeMap<PiiType, usize>,
}

impl<'a> RedactionRun<'a> {
    fn start(original: &'a str) -> Self {
        Self {
            original,
            working: original.to_string(),
            counts: BTreeMap::new(),
        }
    }

    fn apply(self, detector: &Detector) -> Self {
        let candidates = discover(detector, &self.working);
        let found = candidates.len();
        let accepted = validate(detector, &self.working, candidates);

        debug!(
            pii_type = detector.pii_type().as_str(),
            candidates = found,
            accepted = accepted.len(),
            "Detector applied"
        );

        if accepted.is_empty() {
            return self;
        }

        let working = substitute(&self.working, &accepted, detector.placeholder());
        let mut counts = self.counts;
        *counts.entry(detector.pii_type()).or_default() += accepted.len();

        Self {
            original: self.original,
            working,
            counts,
        }
    }

    fn finish(self) -> Redaction {
        Redaction {
            original_length: self.original.chars().count(),
            masked_text: self.working,
            counts: self.counts,
        }
    }
}

/// Applies a pattern registry to text
#[derive(Debug, Clone)]
pub struct Redactor {
    registry: PatternRegistry,
}

impl Redactor {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Mask every accepted match. Total over any string, including the empty one.
    pub fn redact(&self, text: &str) -> Redaction {
        self.registry
            .detectors()
            .iter()
            .fold(RedactionRun::start(text), RedactionRun::apply)
            .finish()
    }
}

/// Byte spans of every non-overlapping syntactic match, left to right
fn discover(detector: &Detector, text: &str) -> Vec<Range<usize>> {
    detector.candidates(text).map(|m| m.range()).collect()
}

/// Keep the spans the detector's validator accepts
fn validate(detector: &Detector, text: &str, candidates: Vec<Range<usize>>) -> Vec<Range<usize>> {
    candidates
        .into_iter()
        .filter(|span| detector.accepts(&text[span.clone()]))
        .collect()
}

/// Replace sorted, non-overlapping spans with `placeholder`
fn substitute(text: &str, spans: &[Range<usize>], placeholder: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for span in spans {
        result.push_str(&text[last_end..span.start]);
        result.push_str(placeholder);
        last_end = span.end;
    }

    result.push_str(&text[last_end..]);
    result
}
