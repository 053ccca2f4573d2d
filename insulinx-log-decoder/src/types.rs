//! Core types for the insulinx log decoder library
//!
//! This module defines the types the decoder emits when processing a
//! sniffer log. The decoder is stateless from the caller's point of view
//! and only outputs decoded messages - transfer direction context is
//! carried by the parser, not by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Transfer direction of a message, taken from the most recent
/// direction-marker line in the log.
///
/// "going down" markers mean the host sent the message to the meter;
/// "coming back" markers mean the meter answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Host → device transfer
    Sent,
    /// Device → host transfer
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => write!(f, "Sent"),
            Direction::Received => write!(f, "Received"),
        }
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid hex token {token:?} in {context}")]
    InvalidHexToken { token: String, context: &'static str },

    #[error("declared payload length {declared} exceeds available tokens ({available})")]
    PayloadOutOfRange { declared: usize, available: usize },

    #[error("hex-dump line out of order: expected offset 0x{expected_offset:02x}, got 0x{got_offset:02x}")]
    SlotOrder { expected_offset: usize, got_offset: usize },
}

/// A fully decoded meter message - the primary output of the decoder
///
/// Wire layout of a message (after reassembling the four hex-dump
/// lines): one status byte, one length byte, then `length` payload
/// bytes. Remaining bytes of the 64-byte report are padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Transfer direction, or `None` if no marker line preceded the
    /// message in the log.
    pub direction: Option<Direction>,
    /// Device response/command code (first byte on the wire)
    pub status: u8,
    /// Message bytes following the length byte; its length is the
    /// declared length byte.
    pub payload: Vec<u8>,
}

impl DecodedMessage {
    /// Render the payload as printable text.
    ///
    /// Newline and carriage return become the literal two-character
    /// escapes `\n` and `\r`, printable ASCII is kept as-is, and any
    /// other byte is rendered as an unpadded hex literal such as `0x7f`.
    pub fn render_payload(&self) -> String {
        let mut out = String::with_capacity(self.payload.len());
        for &byte in &self.payload {
            match byte {
                0x0A => out.push_str("\\n"),
                0x0D => out.push_str("\\r"),
                0x20..=0x7E => out.push(byte as char),
                other => out.push_str(&format!("{:#x}", other)),
            }
        }
        out
    }

    /// One-line human-readable summary, e.g.
    /// `Sent: code=0x01, msg="$date?"`.
    ///
    /// A message decoded before any direction marker renders with an
    /// empty direction label.
    pub fn summary(&self) -> String {
        let direction = self
            .direction
            .map(|d| d.to_string())
            .unwrap_or_default();
        format!(
            "{}: code=0x{:02x}, msg=\"{}\"",
            direction,
            self.status,
            self.render_payload()
        )
    }
}

impl fmt::Display for DecodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
