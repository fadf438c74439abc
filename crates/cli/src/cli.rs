//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Voice Relay - real-time voice dispatch pipeline
#[derive(Parser, Debug)]
#[command(
    name = "voice-relay",
    author,
    version,
    about = "Voice-audio relay dispatch pipeline",
    long_about = "The dispatch stage of a real-time voice-audio relay.\n\n\
                  Loads a participant roster from configuration, runs inbound \n\
                  audio frames through an ordered dispatch-policy chain, and \n\
                  fans resolved packets out to per-listener delivery queues."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VOICE_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VOICE_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay with simulated speakers
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "relay.toml", env = "VOICE_RELAY_CONFIG")]
    pub config: PathBuf,

    /// Frames each simulated speaker produces
    #[arg(long, default_value = "100", env = "VOICE_RELAY_FRAMES")]
    pub frames: u64,

    /// Interval between simulated frames in milliseconds
    #[arg(long, default_value = "20", env = "VOICE_RELAY_FRAME_INTERVAL_MS")]
    pub frame_interval_ms: u64,

    /// Payload size of each simulated frame in bytes
    #[arg(long, default_value = "160", env = "VOICE_RELAY_PAYLOAD_BYTES")]
    pub payload_bytes: usize,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "VOICE_RELAY_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Override metrics server port from configuration (0 = disabled)
    #[arg(long, env = "VOICE_RELAY_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the full participant roster
    #[arg(long)]
    pub participants: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
