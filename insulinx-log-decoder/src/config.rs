//! Decoder configuration types
//!
//! The decoder library itself is intentionally small; this configuration
//! covers parsing strictness and message filtering. Application concerns
//! (output files, summaries) live in the CLI layer.

use crate::types::Direction;
use serde::{Deserialize, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Validate that hex-dump lines arrive in offset order
    /// (0x00, 0x10, 0x20, 0x30, exactly once each per message).
    ///
    /// Off by default: real capture logs are well-formed and the
    /// historical behavior is to decode whatever the four slots hold.
    /// When on, an out-of-order line fails with `SlotOrder`.
    #[serde(default)]
    pub strict_ordering: bool,

    /// Optional: only emit messages travelling in this direction
    #[serde(default)]
    pub direction_filter: Option<Direction>,

    /// Optional: stop after this many decoded messages
    #[serde(default)]
    pub max_messages: Option<usize>,
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable strict slot-order validation
    pub fn with_strict_ordering(mut self, enabled: bool) -> Self {
        self.strict_ordering = enabled;
        self
    }

    /// Builder method: only emit messages with the given direction
    pub fn with_direction_filter(mut self, direction: Direction) -> Self {
        self.direction_filter = Some(direction);
        self
    }

    /// Builder method: stop after `count` decoded messages
    pub fn with_max_messages(mut self, count: usize) -> Self {
        self.max_messages = Some(count);
        self
    }

    /// Check whether a message with the given direction should be emitted
    pub fn should_emit(&self, direction: Option<Direction>) -> bool {
        match self.direction_filter {
            Some(wanted) => direction == Some(wanted),
            None => true,
        }
    }
}
