//! Minor-edit classifier
//!
//! Decides whether a content change is small enough for a restricted
//! editor role to apply directly. A major edit misclassified as minor is
//! the costlier error, so every threshold is tight and the rules only ever
//! widen what counts as minor, never shrink what counts as major.
//!
//! Rules are evaluated in order; the first that matches wins:
//! 1. identical text
//! 2. total changed characters at most `max_trivial_chars`
//! 3. change ratio below `ratio` of the original length and below
//!    `ratio_abs_cap` absolute characters
//! 4. every changed span is pure whitespace
//! 5. at most `max_spans` spans, at most `max_span_total_chars` total
//!    changed characters, and every span either at most `max_span_chars`
//!    characters or pure punctuation/whitespace
//! 6. otherwise: major

use crate::diff::{change_spans, ChangeSpan};
use serde::{Deserialize, Serialize};

/// Thresholds for the minor-edit rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinorEditConfig {
    /// Rule 2: changes of at most this many characters are always minor
    pub max_trivial_chars: usize,
    /// Rule 3: maximum changed fraction of the original length
    pub ratio: f64,
    /// Rule 3: absolute character cap accompanying the ratio
    pub ratio_abs_cap: usize,
    /// Rule 5: maximum number of changed spans
    pub max_spans: usize,
    /// Rule 5: maximum total changed characters across spans
    pub max_span_total_chars: usize,
    /// Rule 5: maximum characters in a single span (unless the span is
    /// pure punctuation/whitespace)
    pub max_span_chars: usize,
}

impl Default for MinorEditConfig {
    fn default() -> Self {
        MinorEditConfig {
            max_trivial_chars: 5,
            ratio: 0.02,
            ratio_abs_cap: 50,
            max_spans: 3,
            max_span_total_chars: 20,
            max_span_chars: 10,
        }
    }
}

/// Classify a change with the default thresholds
pub fn is_minor(old: &str, new: &str) -> bool {
    is_minor_with(old, new, &MinorEditConfig::default())
}

/// Classify a change with explicit thresholds
pub fn is_minor_with(old: &str, new: &str, config: &MinorEditConfig) -> bool {
    if old == new {
        return true;
    }

    let spans = change_spans(old, new);
    let changed: usize = spans.iter().map(ChangeSpan::changed_chars).sum();

    if changed <= config.max_trivial_chars {
        return true;
    }

    let old_len = old.chars().count();
    if old_len > 0
        && (changed as f64) < config.ratio * old_len as f64
        && changed < config.ratio_abs_cap
    {
        return true;
    }

    if spans.iter().all(ChangeSpan::is_whitespace) {
        return true;
    }

    if spans.len() <= config.max_spans
        && changed <= config.max_span_total_chars
        && spans.iter().all(|s| {
            s.changed_chars() <= config.max_span_chars || s.is_punctuation_or_whitespace()
        })
    {
        return true;
    }

    false
}
