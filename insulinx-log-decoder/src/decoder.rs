//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct opens a sniffer log and returns a lazy iterator of
//! decoded messages; all per-file parsing state (ambient direction, the
//! four-slot reassembly buffer) lives in an explicit context owned by
//! the iterator.

use crate::config::DecoderConfig;
use crate::hexdump::{classify, LogLine, Slot};
use crate::message_decoder::MessageDecoder;
use crate::types::{DecodedMessage, DecoderError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Default)]
pub struct Decoder;

impl Decoder {
    /// Create a new decoder instance
    pub fn new() -> Self {
        Self
    }

    /// Decode a sniffer log file and return an iterator of messages.
    ///
    /// The iterator lazily reads the file line by line, emitting a
    /// `DecodedMessage` each time a four-line hex-dump block completes.
    /// The pass is single-shot and not restartable.
    ///
    /// # Example
    /// ```no_run
    /// use insulinx_log_decoder::{Decoder, DecoderConfig};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let messages = decoder
    ///     .decode_file(Path::new("insulinx.log"), DecoderConfig::new())
    ///     .unwrap();
    ///
    /// for message in messages {
    ///     match message {
    ///         Ok(msg) => println!("{}", msg.summary()),
    ///         Err(e) => eprintln!("Decode error: {}", e),
    ///     }
    /// }
    /// ```
    pub fn decode_file(
        &self,
        path: &Path,
        config: DecoderConfig,
    ) -> Result<MessageIter<BufReader<File>>> {
        log::info!("Decoding sniffer log: {:?}", path);
        let file = File::open(path)?;
        Ok(self.decode_reader(BufReader::new(file), config))
    }

    /// Decode from any buffered reader.
    ///
    /// Useful for tests and in-memory input; `decode_file` is a thin
    /// wrapper around this.
    pub fn decode_reader<R: BufRead>(&self, reader: R, config: DecoderConfig) -> MessageIter<R> {
        MessageIter {
            lines: reader.lines(),
            context: ParserContext::new(),
            config,
            lines_read: 0,
            emitted: 0,
            done: false,
        }
    }
}

/// Per-file parsing state.
///
/// The capture log interleaves direction markers with hex-dump blocks,
/// so the parser carries the most recent direction across messages and
/// reuses one four-slot buffer. Slots are overwritten in place; the
/// historical decoder never cleared them between messages and neither
/// does this one (stale content only matters for malformed logs, see
/// `DecoderConfig::strict_ordering`).
struct ParserContext {
    direction: Option<crate::types::Direction>,
    slots: [String; Slot::COUNT],
    next_slot: usize,
}

impl ParserContext {
    fn new() -> Self {
        Self {
            direction: None,
            slots: std::array::from_fn(|_| String::new()),
            next_slot: 0,
        }
    }

    /// Apply one classified line; returns a message when the final slot
    /// of a block was just stored.
    fn apply(&mut self, line: LogLine, strict: bool) -> Result<Option<DecodedMessage>> {
        match line {
            LogLine::Marker(direction) => {
                log::debug!("Direction marker: {}", direction);
                self.direction = Some(direction);
                Ok(None)
            }
            LogLine::HexDump { slot, bytes } => {
                if strict && slot.index() != self.next_slot {
                    return Err(DecoderError::SlotOrder {
                        expected_offset: self.next_slot * 16,
                        got_offset: slot.offset(),
                    });
                }
                self.next_slot = (slot.index() + 1) % Slot::COUNT;
                self.slots[slot.index()] = bytes;

                if slot.is_last() {
                    let stream = self.slots.join(" ");
                    log::trace!("Reassembled report: {}", stream);
                    MessageDecoder::decode_tokens(&stream, self.direction).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Lazy iterator over decoded messages from a sniffer log
///
/// Yields `Ok(DecodedMessage)` per completed block and fuses after the
/// first error: a malformed file aborts the remaining input.
pub struct MessageIter<R: BufRead> {
    lines: std::io::Lines<R>,
    context: ParserContext,
    config: DecoderConfig,
    lines_read: u64,
    emitted: usize,
    done: bool,
}

impl<R: BufRead> MessageIter<R> {
    /// Number of input lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Number of messages emitted so far (after filtering)
    pub fn messages_emitted(&self) -> usize {
        self.emitted
    }
}

impl<R: BufRead> Iterator for MessageIter<R> {
    type Item = Result<DecodedMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(max) = self.config.max_messages {
            if self.emitted >= max {
                log::debug!("Reached message limit ({}), stopping", max);
                self.done = true;
                return None;
            }
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    log::debug!(
                        "End of log: {} lines read, {} messages emitted",
                        self.lines_read,
                        self.emitted
                    );
                    self.done = true;
                    return None;
                }
            };
            self.lines_read += 1;

            let Some(classified) = classify(line.trim()) else {
                continue;
            };

            match self
                .context
                .apply(classified, self.config.strict_ordering)
            {
                Ok(Some(message)) => {
                    if !self.config.should_emit(message.direction) {
                        log::trace!("Filtered out message: {}", message.summary());
                        continue;
                    }
                    self.emitted += 1;
                    return Some(Ok(message));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use std::io::Cursor;

    fn decode_all(input: &str, config: DecoderConfig) -> Vec<Result<DecodedMessage>> {
        Decoder::new()
            .decode_reader(Cursor::new(input.to_string()), config)
            .collect()
    }

    const SAMPLE: &str = "\
frame going down\n\
00000000: 01 03 41 42 43 00 00 00\n\
00000010: 00 00 00 00 00 00 00 00\n\
00000020: 00 00 00 00 00 00 00 00\n\
00000030: 00 00 00 00 00 00 00 00\n\
frame coming back\n\
00000000: 00 02 0a 0d 00 00 00 00\n\
00000010: 00 00 00 00 00 00 00 00\n\
00000020: 00 00 00 00 00 00 00 00\n\
00000030: 00 00 00 00 00 00 00 00\n";

    #[test]
    fn test_decode_sample_log() {
        let messages = decode_all(SAMPLE, DecoderConfig::new());
        assert_eq!(messages.len(), 2);

        let first = messages[0].as_ref().unwrap();
        assert_eq!(first.summary(), "Sent: code=0x01, msg=\"ABC\"");

        let second = messages[1].as_ref().unwrap();
        assert_eq!(second.summary(), "Received: code=0x00, msg=\"\\n\\r\"");
    }

    #[test]
    fn test_direction_persists_across_messages() {
        // One marker, two blocks: the second block inherits the direction
        let input = format!(
            "frame going down\n{block}{block}",
            block = "00000000: 02 01 41\n00000010:\n00000020:\n00000030:\n"
        );
        let messages = decode_all(&input, DecoderConfig::new());
        assert_eq!(messages.len(), 2);
        for msg in &messages {
            assert_eq!(msg.as_ref().unwrap().direction, Some(Direction::Sent));
        }
    }

    #[test]
    fn test_block_before_any_marker() {
        let input = "00000000: 01 01 41\n00000010:\n00000020:\n00000030:\n";
        let messages = decode_all(input, DecoderConfig::new());
        assert_eq!(messages.len(), 1);
        let msg = messages[0].as_ref().unwrap();
        assert_eq!(msg.direction, None);
        assert_eq!(msg.summary(), ": code=0x01, msg=\"A\"");
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let input = "\
ffff8800637d3cc0 3164354603 C Ii:2:006:1 0:8 64 = 0c230000\n\
frame going down\n\
some urb header line\n\
00000000: 01 00\n\
00000010:\n\
00000020:\n\
00000030:\n";
        let messages = decode_all(input, DecoderConfig::new());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].as_ref().unwrap().status, 0x01);
    }

    #[test]
    fn test_iterator_fuses_after_decode_error() {
        // First block declares more payload than it carries; the
        // following valid block must not be reached.
        let input = "\
frame going down\n\
00000000: 01 20 41\n\
00000010:\n\
00000020:\n\
00000030:\n\
00000000: 01 01 41\n\
00000010:\n\
00000020:\n\
00000030:\n";
        let mut iter =
            Decoder::new().decode_reader(Cursor::new(input.to_string()), DecoderConfig::new());
        let first = iter.next().unwrap();
        assert!(matches!(
            first,
            Err(DecoderError::PayloadOutOfRange { .. })
        ));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_strict_ordering_rejects_out_of_order_slot() {
        let input = "\
frame going down\n\
00000010: 00 00\n\
00000000: 01 00\n";
        let config = DecoderConfig::new().with_strict_ordering(true);
        let mut iter =
            Decoder::new().decode_reader(Cursor::new(input.to_string()), config);
        match iter.next().unwrap() {
            Err(DecoderError::SlotOrder {
                expected_offset,
                got_offset,
            }) => {
                assert_eq!(expected_offset, 0x00);
                assert_eq!(got_offset, 0x10);
            }
            other => panic!("unexpected item: {:?}", other),
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_lenient_mode_decodes_stale_slots() {
        // Historical behavior: a repeated 0x30 line re-decodes the
        // buffer with whatever the other slots still hold.
        let input = "\
frame going down\n\
00000000: 01 01 41\n\
00000010:\n\
00000020:\n\
00000030:\n\
00000030:\n";
        let messages = decode_all(input, DecoderConfig::new());
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0].as_ref().unwrap(),
            messages[1].as_ref().unwrap()
        );
    }

    #[test]
    fn test_direction_filter() {
        let config = DecoderConfig::new().with_direction_filter(Direction::Received);
        let messages = decode_all(SAMPLE, config);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].as_ref().unwrap().direction,
            Some(Direction::Received)
        );
    }

    #[test]
    fn test_max_messages_limit() {
        let config = DecoderConfig::new().with_max_messages(1);
        let messages = decode_all(SAMPLE, config);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_idempotent_decoding() {
        let first: Vec<String> = decode_all(SAMPLE, DecoderConfig::new())
            .into_iter()
            .map(|m| m.unwrap().summary())
            .collect();
        let second: Vec<String> = decode_all(SAMPLE, DecoderConfig::new())
            .into_iter()
            .map(|m| m.unwrap().summary())
            .collect();
        assert_eq!(first, second);
    }
}
