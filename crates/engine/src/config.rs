//! Engine configuration

use serde::{Deserialize, Serialize};
use trellis_core::{Limits, MinorEditConfig};

/// Tunable knobs for an [`Engine`](crate::Engine)
///
/// All defaults match production values; construct with `..Default::default()`
/// to override a single field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Structural limits (chunking, deep-level threshold, history paging)
    pub limits: Limits,
    /// Minor-edit classifier thresholds
    pub classifier: MinorEditConfig,
}
