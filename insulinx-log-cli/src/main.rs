//! Insulinx Log Reader CLI Application
//!
//! Command-line interface for the insulinx sniffer log decoder. It uses
//! the insulinx-log-decoder library and adds:
//! - Argument and TOML configuration handling
//! - Output redirection (stdout or file)
//! - An end-of-run summary (message and line counts)

use anyhow::{Context, Result};
use clap::Parser;
use insulinx_log_decoder::{Decoder, DecoderConfig, Direction};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;

/// Insulinx Log Reader - decode glucose meter USB sniffer logs
#[derive(Parser, Debug)]
#[command(name = "insulinx-log-cli")]
#[command(about = "Decode FreeStyle InsuLinx USB sniffer logs", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the sniffer log file to decode
    #[arg(value_name = "FILE")]
    log: Option<PathBuf>,

    /// Output file for decoded messages (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fail on hex-dump lines arriving out of offset order
    #[arg(long)]
    strict: bool,

    /// Only print messages with this direction
    #[arg(long, value_name = "DIR", value_parser = parse_direction)]
    direction: Option<Direction>,

    /// Maximum number of messages to decode (for testing)
    #[arg(long, value_name = "COUNT")]
    max_messages: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_direction(value: &str) -> std::result::Result<Direction, String> {
    match value {
        "sent" => Ok(Direction::Sent),
        "received" => Ok(Direction::Received),
        other => Err(format!(
            "invalid direction {:?} (expected \"sent\" or \"received\")",
            other
        )),
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Insulinx Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", insulinx_log_decoder::VERSION);

    // Load the optional config file; CLI flags override file values
    let file_config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::AppConfig::default(),
    };

    let log_path = args.log.clone().or(file_config.input.file.clone());

    let Some(log_path) = log_path else {
        // No input - show a quick start instead of failing
        println!("Insulinx Log Reader - No input specified");
        println!("\nQuick Start:");
        println!("  insulinx-log-cli insulinx.log");
        println!("  insulinx-log-cli insulinx.log --direction received");
        println!("  insulinx-log-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    };

    let decoder_config = DecoderConfig {
        strict_ordering: args.strict || file_config.decode.strict_ordering,
        direction_filter: args.direction.or(file_config.decode.direction),
        max_messages: args.max_messages.or(file_config.decode.max_messages),
    };

    let output_path = args.output.clone().or(file_config.output.file.clone());

    decode_log(&log_path, output_path.as_deref(), decoder_config)
}

/// Decode the log and write one summary line per message
fn decode_log(
    log_path: &std::path::Path,
    output_path: Option<&std::path::Path>,
    config: DecoderConfig,
) -> Result<()> {
    let mut writer: Box<dyn Write> = match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout()),
    };

    let decoder = Decoder::new();
    let mut messages = decoder
        .decode_file(log_path, config)
        .with_context(|| format!("Failed to open log file: {:?}", log_path))?;

    let mut sent = 0u64;
    let mut received = 0u64;
    let mut unmarked = 0u64;

    while let Some(message) = messages.next() {
        let message = message
            .with_context(|| format!("Failed to decode log file: {:?}", log_path))?;
        match message.direction {
            Some(Direction::Sent) => sent += 1,
            Some(Direction::Received) => received += 1,
            None => unmarked += 1,
        }
        writeln!(writer, "{}", message.summary())?;
    }
    writer.flush()?;

    log::info!(
        "Decoded {} messages ({} sent, {} received, {} unmarked) from {} lines",
        sent + received + unmarked,
        sent,
        received,
        unmarked,
        messages.lines_read()
    );

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
