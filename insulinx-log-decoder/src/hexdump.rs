//! Sniffer log line classification
//!
//! The capture tool writes three kinds of interesting lines:
//! - direction markers containing `going down` (host → meter) or
//!   `coming back` (meter → host),
//! - hex-dump lines for a 64-byte HID report, four per message, at byte
//!   offsets 0x00/0x10/0x20/0x30, each starting with an 8-hex-digit
//!   address, a colon and a space (`00000000: ` and so on).
//!
//! Everything else (URB headers, timestamps, blank lines) is noise and
//! classifies to `None`.

use crate::types::Direction;

/// Marker substring for host → device transfers
const MARKER_SENT: &str = "going down";
/// Marker substring for device → host transfers
const MARKER_RECEIVED: &str = "coming back";

/// Length of the `00000000: ` address prefix of a hex-dump line
const PREFIX_LEN: usize = 10;

/// One of the four hex-dump lines making up a 64-byte report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Bytes 0x00..0x10
    Offset00,
    /// Bytes 0x10..0x20
    Offset10,
    /// Bytes 0x20..0x30
    Offset20,
    /// Bytes 0x30..0x40 - storing this slot completes a message
    Offset30,
}

impl Slot {
    /// Number of slots in one message
    pub const COUNT: usize = 4;

    /// All slots in on-the-wire order
    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::Offset00,
        Slot::Offset10,
        Slot::Offset20,
        Slot::Offset30,
    ];

    /// Buffer index of this slot (0..4)
    pub fn index(self) -> usize {
        match self {
            Slot::Offset00 => 0,
            Slot::Offset10 => 1,
            Slot::Offset20 => 2,
            Slot::Offset30 => 3,
        }
    }

    /// Byte offset of this slot within the report
    pub fn offset(self) -> usize {
        self.index() * 16
    }

    /// True for the final slot, the one that triggers a decode
    pub fn is_last(self) -> bool {
        self == Slot::Offset30
    }

    fn prefix(self) -> &'static str {
        match self {
            Slot::Offset00 => "00000000:",
            Slot::Offset10 => "00000010:",
            Slot::Offset20 => "00000020:",
            Slot::Offset30 => "00000030:",
        }
    }
}

/// A classified log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    /// Direction marker; sets the ambient direction for following messages
    Marker(Direction),
    /// Hex-dump line: slot plus its space-separated hex byte tokens
    HexDump { slot: Slot, bytes: String },
}

/// Classify a single (already whitespace-trimmed) log line.
///
/// Returns `None` for lines that are neither markers nor hex dumps;
/// those are skipped by the parser.
pub fn classify(line: &str) -> Option<LogLine> {
    if line.contains(MARKER_SENT) {
        return Some(LogLine::Marker(Direction::Sent));
    }
    if line.contains(MARKER_RECEIVED) {
        return Some(LogLine::Marker(Direction::Received));
    }

    for slot in Slot::ALL {
        if line.starts_with(slot.prefix()) {
            // Strip the 10-char address prefix; short lines (offset with
            // no bytes) yield an empty token string.
            let bytes = line
                .get(PREFIX_LEN..)
                .unwrap_or("")
                .trim()
                .to_string();
            return Some(LogLine::HexDump { slot, bytes });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_markers() {
        assert_eq!(
            classify("frame going down to the device"),
            Some(LogLine::Marker(Direction::Sent))
        );
        assert_eq!(
            classify("frame coming back from the device"),
            Some(LogLine::Marker(Direction::Received))
        );
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert_eq!(classify("frame GOING DOWN to the device"), None);
    }

    #[test]
    fn test_classify_hexdump_line() {
        let line = "00000000: 01 06 24 64 61 74 65 3f";
        match classify(line) {
            Some(LogLine::HexDump { slot, bytes }) => {
                assert_eq!(slot, Slot::Offset00);
                assert_eq!(bytes, "01 06 24 64 61 74 65 3f");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_classify_all_offsets() {
        for (i, prefix) in ["00000000:", "00000010:", "00000020:", "00000030:"]
            .iter()
            .enumerate()
        {
            let line = format!("{} 00 11 22", prefix);
            match classify(&line) {
                Some(LogLine::HexDump { slot, .. }) => {
                    assert_eq!(slot.index(), i);
                    assert_eq!(slot.offset(), i * 16);
                }
                other => panic!("offset {} not classified: {:?}", i, other),
            }
        }
    }

    #[test]
    fn test_classify_empty_dump_line() {
        // An offset line with no bytes still classifies, with empty content
        match classify("00000030:") {
            Some(LogLine::HexDump { slot, bytes }) => {
                assert!(slot.is_last());
                assert_eq!(bytes, "");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_classify_noise_lines() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("ffff8800637d3cc0 3164354603 S Ii:2:006:1"), None);
        assert_eq!(classify("00000040: 00 11"), None); // beyond the report
    }
}
