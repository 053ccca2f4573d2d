//! Insulinx Log Decoder Library
//!
//! A small, reusable library for decoding USB sniffer logs captured from
//! a FreeStyle InsuLinx glucose meter.
//!
//! # Architecture
//!
//! The capture tool writes each 64-byte HID report as four hex-dump
//! lines (offsets 0x00/0x10/0x20/0x30), preceded by a direction marker
//! line ("going down" = host→meter, "coming back" = meter→host). This
//! library:
//! - Classifies log lines (markers, hex dumps, noise)
//! - Reassembles the four dump lines of a report into one token stream
//! - Decodes the length-prefixed payload (status byte, length byte,
//!   message bytes)
//! - Emits decoded messages through a lazy iterator
//!
//! The library does NOT:
//! - Interpret status codes or message contents beyond text rendering
//! - Write output files or reports
//!
//! All presentation concerns live in the application layer
//! (insulinx-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use insulinx_log_decoder::{Decoder, DecoderConfig, Direction};
//! use std::path::Path;
//!
//! let decoder = Decoder::new();
//! let config = DecoderConfig::new()
//!     .with_direction_filter(Direction::Received)
//!     .with_strict_ordering(true);
//!
//! let messages = decoder.decode_file(Path::new("insulinx.log"), config).unwrap();
//!
//! for message in messages {
//!     match message {
//!         Ok(msg) => println!("{}", msg.summary()),
//!         Err(e) => eprintln!("Decode error: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod hexdump;
pub mod message_decoder;
pub mod types;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{Decoder, MessageIter};
pub use hexdump::{LogLine, Slot};
pub use types::{DecodedMessage, DecoderError, Direction, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
