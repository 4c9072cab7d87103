// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "SkyMeter";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "skymeter";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "skymeter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SKYMETER_CONFIG";

// =============================================================================
// Environment Variables - Logging
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SKYMETER_LOG";

/// Environment variable selecting the log format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "SKYMETER_LOG_FORMAT";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for gRPC listen host
pub const ENV_HOST: &str = "SKYMETER_HOST";

/// Environment variable for gRPC listen port
pub const ENV_PORT: &str = "SKYMETER_PORT";

/// Environment variable for the gRPC message size limit
pub const ENV_MAX_MESSAGE_BYTES: &str = "SKYMETER_MAX_MESSAGE_BYTES";

// =============================================================================
// Environment Variables - Sink
// =============================================================================

/// Environment variable for the sink kind (`stdout` or `file`)
pub const ENV_SINK: &str = "SKYMETER_SINK";

/// Environment variable for the file sink path
pub const ENV_SINK_PATH: &str = "SKYMETER_SINK_PATH";

/// Environment variable for the sink queue capacity
pub const ENV_SINK_BUFFER: &str = "SKYMETER_SINK_BUFFER";

// =============================================================================
// Defaults
// =============================================================================

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port (SkyWalking agent gRPC default)
pub const DEFAULT_PORT: u16 = 11800;

/// Default gRPC message size limit (4 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

/// Default number of metric logs queued ahead of the sink writer
pub const DEFAULT_SINK_BUFFER: usize = 10_000;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
