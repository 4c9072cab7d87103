//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::MeterGrpcServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, ENV_LOG_FORMAT};
use crate::core::shutdown::ShutdownService;
use crate::data::sink::{self, ChannelSink, SinkWriter};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub sink: Arc<ChannelSink>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let shutdown = ShutdownService::new();

        let (channel_sink, rx) = sink::channel(config.sink.buffer);
        let writer = SinkWriter::new(rx, config.sink.target()?);
        let handle = writer
            .start()
            .await
            .context("Failed to open metric sink")?;
        shutdown.register(handle).await;

        tracing::debug!(
            kind = %config.sink.kind,
            buffer = config.sink.buffer,
            "Sink initialized"
        );

        Ok(Self {
            shutdown,
            config,
            sink: Arc::new(channel_sink),
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        let json = std::env::var(ENV_LOG_FORMAT)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        // Logs go to stderr; stdout is reserved for the stdout sink
        let builder = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_env_filter(filter);

        if json {
            builder.json().init();
        } else {
            builder.with_ansi(true).compact().init();
        }
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        let grpc_server = MeterGrpcServer::bind(&app.config.server, app.sink.clone()).await?;

        banner::print_banner(&app.config);

        serve(grpc_server, app.sink, &app.shutdown).await
    }
}

/// Serve until shutdown, then release the sink.
///
/// The writer only stops once the last `ChannelSink` handle is gone, and the
/// server holds one until its graceful drain ends. Streams still open when the
/// signal arrives are therefore written out before the writer finishes.
async fn serve(
    server: MeterGrpcServer,
    sink: Arc<ChannelSink>,
    shutdown: &ShutdownService,
) -> Result<()> {
    let result = server.start(shutdown.wait()).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Meter gRPC server error");
    }

    tracing::debug!(dropped = sink.dropped(), "Sink queue stats");
    drop(sink);
    shutdown.shutdown().await;

    result
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    use super::*;
    use crate::core::config::ServerConfig;
    use crate::data::sink::SinkTarget;
    use crate::proto::meter_data::Metric;
    use crate::proto::meter_report_service_client::MeterReportServiceClient;
    use crate::proto::{Commands, MeterData, MeterSingleValue};

    fn meter(name: &str) -> MeterData {
        MeterData {
            metric: Some(Metric::SingleValue(MeterSingleValue {
                name: name.to_string(),
                labels: vec![],
                value: 1.0,
            })),
            service: "svcA".to_string(),
            service_instance: "i1".to_string(),
            timestamp: 1000,
        }
    }

    fn written_names(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|l| {
                let value: serde_json::Value = serde_json::from_str(l).unwrap();
                value["name"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_stream_open_at_shutdown_reaches_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        let shutdown = ShutdownService::new();
        let (channel_sink, rx) = sink::channel(16);
        let writer = SinkWriter::new(rx, SinkTarget::File(path.clone()))
            .start()
            .await
            .unwrap();
        shutdown.register(writer).await;
        let channel_sink = Arc::new(channel_sink);

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_message_bytes: 1024 * 1024,
        };
        let server = MeterGrpcServer::bind(&config, channel_sink.clone())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let serve_shutdown = shutdown.clone();
        let serving =
            tokio::spawn(async move { serve(server, channel_sink, &serve_shutdown).await });

        let mut client = MeterReportServiceClient::connect(format!("http://{}", addr))
            .await
            .unwrap();
        let (tx, meters) = mpsc::channel(4);
        let call = tokio::spawn(async move { client.collect(ReceiverStream::new(meters)).await });

        tx.send(meter("before")).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while written_names(&path).is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        shutdown.trigger();
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(meter("after")).await.unwrap();
        drop(tx);

        let response = call.await.unwrap().unwrap();
        assert_eq!(response.into_inner(), Commands::default());
        tokio::time::timeout(Duration::from_secs(5), serving)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(written_names(&path), vec!["before", "after"]);
    }
}
