//! Chunked field codec
//!
//! The backing store rejects oversized properties, so each large field
//! (body, structured payload, summary) is stored as an independent
//! inline/segments pair. Small values live inline with no segments;
//! oversized values are split into segments of exactly `limit` characters
//! (the final segment carries the remainder) with the inline left empty.
//!
//! Splitting counts characters and cuts on char boundaries, so multi-byte
//! text round-trips exactly.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A possibly-chunked text field
///
/// Exactly one of `inline`/`segments` is populated for non-empty values;
/// both empty decodes to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkedField {
    /// Full value when it fits within the limit
    #[serde(default)]
    pub inline: String,
    /// Ordered segments when the value exceeds the limit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,
}

impl ChunkedField {
    /// Encode a value, splitting into segments when it exceeds `limit` characters
    ///
    /// # Errors
    /// `InvalidInput` if `limit` is zero.
    pub fn encode(value: &str, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::invalid_input("chunk limit must be positive"));
        }
        let char_count = value.chars().count();
        if char_count <= limit {
            return Ok(ChunkedField {
                inline: value.to_string(),
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::with_capacity(char_count / limit + 1);
        let mut start = 0;
        let mut count = 0;
        for (idx, _) in value.char_indices() {
            if count == limit {
                segments.push(value[start..idx].to_string());
                start = idx;
                count = 0;
            }
            count += 1;
        }
        segments.push(value[start..].to_string());
        Ok(ChunkedField {
            inline: String::new(),
            segments,
        })
    }

    /// Reassemble the original value
    pub fn decode(&self) -> String {
        if !self.inline.is_empty() {
            return self.inline.clone();
        }
        self.segments.concat()
    }

    /// True when the decoded value is empty
    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.segments.iter().all(|s| s.is_empty())
    }
}
