//! Message Decoding Engine
//!
//! Decodes the hex-token stream of a reassembled 64-byte report into a
//! status code, a declared length and the payload bytes. The stream is
//! the four hex-dump line contents joined with spaces, in offset order.

use crate::types::{DecodedMessage, DecoderError, Direction, Result};

/// Message decoder - turns a reassembled hex-token stream into a message
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode a space-separated hex-token stream.
    ///
    /// Token 0 is the status code, token 1 the payload length, tokens
    /// 2..2+length the payload bytes. Tokens past the declared length
    /// are report padding and ignored.
    ///
    /// # Errors
    /// * `PayloadOutOfRange` if the status or length token is missing,
    ///   or the declared length exceeds the available payload tokens
    /// * `InvalidHexToken` if any consumed token is not valid hex
    pub fn decode_tokens(text: &str, direction: Option<Direction>) -> Result<DecodedMessage> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let status = Self::parse_byte(&tokens, 0, "status code")?;
        let length = Self::parse_byte(&tokens, 1, "payload length")? as usize;

        let available = tokens.len().saturating_sub(2);
        if length > available {
            log::warn!(
                "declared payload length {} exceeds the {} available tokens",
                length,
                available
            );
            return Err(DecoderError::PayloadOutOfRange {
                declared: length,
                available,
            });
        }

        let mut payload = Vec::with_capacity(length);
        for token in &tokens[2..2 + length] {
            payload.push(Self::parse_token(token, "payload byte")?);
        }

        Ok(DecodedMessage {
            direction,
            status,
            payload,
        })
    }

    /// Parse the token at `index` as a hex byte, treating a missing
    /// token as a truncated report.
    fn parse_byte(tokens: &[&str], index: usize, context: &'static str) -> Result<u8> {
        let token = tokens.get(index).ok_or(DecoderError::PayloadOutOfRange {
            declared: index + 1,
            available: tokens.len(),
        })?;
        Self::parse_token(token, context)
    }

    fn parse_token(token: &str, context: &'static str) -> Result<u8> {
        u8::from_str_radix(token, 16).map_err(|_| DecoderError::InvalidHexToken {
            token: token.to_string(),
            context,
        })
    }
}
