//! Command line arguments for the relay binary

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Relay `subject payload` lines from stdin through per-subject queues
///
/// Values given here override the configuration file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "asyncqueue", version, about)]
pub struct Args {
    /// Configuration file path
    #[arg(long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Subject to subscribe to (repeatable, comma-separated lists accepted)
    #[arg(short = 's', long = "subject", value_name = "NAME", value_delimiter = ',')]
    pub subjects: Vec<String>,

    /// Buffer capacity of each subscription queue (0 = unbounded)
    #[arg(long = "capacity", value_name = "N")]
    pub capacity: Option<usize>,

    /// Only deliver to subscribers whose consumer is attached
    #[arg(long = "lossless", action = ArgAction::SetTrue)]
    pub lossless: bool,

    /// Log a notice when a subject has been idle this many seconds (0 = never)
    #[arg(long = "idle-timeout", value_name = "SECS")]
    pub idle_timeout: Option<u64>,

    /// Verbose output (can be used multiple times for more verbosity)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (can be used multiple times for less verbosity)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Force colored output (overrides TTY detection)
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log level
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Net verbosity: each `-v` raises the log level one step, each `-q` lowers it
    pub fn verbosity(&self) -> i8 {
        let verbose = self.verbose.min(i8::MAX as u8) as i8;
        let quiet = self.quiet.min(i8::MAX as u8) as i8;
        verbose - quiet
    }

    /// Explicit colour choice, `None` when neither flag was given
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (_, true) => Some(false),
            (true, false) => Some(true),
            (false, false) => None,
        }
    }
}
