use std::path::PathBuf;

use clap::Parser;

use super::config::SinkKind;
use super::constants::{
    ENV_CONFIG, ENV_HOST, ENV_MAX_MESSAGE_BYTES, ENV_PORT, ENV_SINK, ENV_SINK_BUFFER,
    ENV_SINK_PATH,
};

#[derive(Parser)]
#[command(name = "skymeter")]
#[command(version, about = "SkyWalking meter receiver", long_about = None)]
pub struct Cli {
    /// gRPC listen host
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// gRPC listen port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Maximum decoded/encoded gRPC message size in bytes
    #[arg(long, env = ENV_MAX_MESSAGE_BYTES)]
    pub max_message_bytes: Option<usize>,

    /// Sink for metric logs (stdout or file)
    #[arg(long, env = ENV_SINK, value_parser = parse_sink_kind)]
    pub sink: Option<SinkKind>,

    /// Output path for the file sink
    #[arg(long, env = ENV_SINK_PATH)]
    pub sink_path: Option<PathBuf>,

    /// Number of metric logs queued ahead of the sink writer
    #[arg(long, env = ENV_SINK_BUFFER)]
    pub sink_buffer: Option<usize>,
}

/// Parse sink kind from CLI/env string
pub(crate) fn parse_sink_kind(s: &str) -> Result<SinkKind, String> {
    match s.to_lowercase().as_str() {
        "stdout" => Ok(SinkKind::Stdout),
        "file" => Ok(SinkKind::File),
        _ => Err(format!(
            "Invalid sink '{}'. Valid options: stdout, file",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub max_message_bytes: Option<usize>,
    pub sink: Option<SinkKind>,
    pub sink_path: Option<PathBuf>,
    pub sink_buffer: Option<usize>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            config: cli.config,
            max_message_bytes: cli.max_message_bytes,
            sink: cli.sink,
            sink_path: cli.sink_path,
            sink_buffer: cli.sink_buffer,
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    Cli::parse().into()
}
