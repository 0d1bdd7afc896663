//! Size and depth limits
//!
//! Centralizes the constants the engine enforces. Defaults are frozen:
//! changing `chunk_limit` on an existing store would break decoding of
//! already-chunked fields.

use serde::{Deserialize, Serialize};

/// Default maximum characters a field stores inline before chunking
pub const DEFAULT_CHUNK_LIMIT: usize = 800_000;

/// Default level at which the flat deep-content roles take over
pub const DEFAULT_DEEP_LEVEL: i32 = 7;

/// Default page size for history listings
pub const DEFAULT_HISTORY_PAGE: usize = 20;

/// Engine-wide limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum characters stored inline; larger fields split into
    /// segments of exactly this many characters
    pub chunk_limit: usize,

    /// Level at or beyond which the flat deep-content roles
    /// (major-direct, minor-direct) apply
    pub deep_level: i32,

    /// Page size for paginated history listings
    pub history_page_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            deep_level: DEFAULT_DEEP_LEVEL,
            history_page_size: DEFAULT_HISTORY_PAGE,
        }
    }
}
