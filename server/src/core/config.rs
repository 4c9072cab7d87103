use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_PORT, DEFAULT_SINK_BUFFER,
};
use crate::data::sink::SinkTarget;

// =============================================================================
// Sink Kind Enum
// =============================================================================

/// Where metric logs are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Stdout,
    File,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Stdout => write!(f, "stdout"),
            SinkKind::File => write!(f, "file"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub max_message_bytes: Option<usize>,
}

/// Sink configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SinkFileConfig {
    pub kind: Option<SinkKind>,
    pub path: Option<PathBuf>,
    pub buffer: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub sink: Option<SinkFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if !self.extra.is_empty() {
            let keys_str: String = self
                .extra
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_message_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub kind: SinkKind,
    pub path: Option<PathBuf>,
    pub buffer: usize,
}

impl SinkConfig {
    /// Writer target for this sink
    pub fn target(&self) -> Result<SinkTarget> {
        match self.kind {
            SinkKind::Stdout => Ok(SinkTarget::Stdout),
            SinkKind::File => self
                .path
                .clone()
                .map(SinkTarget::File)
                .context("sink.path is required when sink.kind is \"file\""),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sink: SinkConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let config_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        let file_config = match config_path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                config
            }
            None => FileConfig::default(),
        };

        Self::resolve(cli, file_config)
    }

    /// Layer defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_sink = file_config.sink.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
            max_message_bytes: cli
                .max_message_bytes
                .or(file_server.max_message_bytes)
                .unwrap_or(DEFAULT_MAX_MESSAGE_BYTES),
        };

        let sink = SinkConfig {
            kind: cli.sink.or(file_sink.kind).unwrap_or_default(),
            path: cli.sink_path.clone().or(file_sink.path),
            buffer: cli
                .sink_buffer
                .or(file_sink.buffer)
                .unwrap_or(DEFAULT_SINK_BUFFER),
        };

        let config = Self { server, sink };
        config.validate()?;
        tracing::debug!(config = ?config, "Configuration resolved");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.max_message_bytes == 0 {
            anyhow::bail!("server.max_message_bytes must be greater than 0");
        }
        if self.sink.buffer == 0 {
            anyhow::bail!("sink.buffer must be greater than 0");
        }
        self.sink.target()?;
        Ok(())
    }
}

/// True when `host` binds every interface
pub fn is_all_interfaces(host: &str) -> bool {
    host == "0.0.0.0" || host == "::" || host == "[::]"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("skymeter.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default()).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.max_message_bytes, DEFAULT_MAX_MESSAGE_BYTES);
        assert_eq!(config.sink.kind, SinkKind::Stdout);
        assert_eq!(config.sink.buffer, DEFAULT_SINK_BUFFER);
        assert_eq!(config.sink.target().unwrap(), SinkTarget::Stdout);
    }

    #[test]
    fn test_file_config_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "server": { "host": "127.0.0.1", "port": 12800 },
                "sink": { "kind": "file", "path": "/var/lib/skymeter/meters.jsonl", "buffer": 128 }
            }"#,
        );
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 12800);
        assert_eq!(config.sink.kind, SinkKind::File);
        assert_eq!(config.sink.buffer, 128);
        assert_eq!(
            config.sink.target().unwrap(),
            SinkTarget::File(PathBuf::from("/var/lib/skymeter/meters.jsonl"))
        );
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"{ "server": { "port": 12800 }, "sink": { "buffer": 128 } }"#,
        );
        let cli = CliConfig {
            config: Some(path),
            port: Some(13800),
            sink_buffer: Some(256),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 13800);
        assert_eq!(config.sink.buffer, 256);
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let config: FileConfig =
            serde_json::from_str(r#"{ "sever": { "port": 1 }, "sink": {} }"#).unwrap();
        assert!(config.extra.contains_key("sever"));
        assert!(config.sink.is_some());
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/skymeter.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "{ not json");
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_file_sink_requires_path() {
        let cli = CliConfig {
            sink: Some(SinkKind::File),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("sink.path"));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let cli = CliConfig {
            sink_buffer: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
