//! Startup banner

use super::config::{AppConfig, SinkKind, is_all_interfaces};
use super::constants::APP_NAME;

/// Print the startup banner with the listen address and sink
pub fn print_banner(config: &AppConfig) {
    let host = &config.server.host;
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host.as_str()
    };

    // Label width: "SkyWalking gRPC:" is 16 chars, pad to 18 for alignment
    const W: usize = 18;

    // Banner goes to stderr so a stdout sink stays pure JSON lines
    eprintln!();
    eprintln!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}:{} \x1b[90m(MeterReportService)\x1b[0m",
        "SkyWalking gRPC:", display_host, config.server.port
    );

    let sink = match (config.sink.kind, &config.sink.path) {
        (SinkKind::File, Some(path)) => path.display().to_string(),
        (kind, _) => kind.to_string(),
    };
    eprintln!("  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}", "Sink:", sink);
    eprintln!();
}
