//! gRPC SkyWalking meter receiver

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server as TonicServer;
use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

use crate::core::config::ServerConfig;
use crate::data::sink::MetricSink;
use crate::domain::meters::{BatchStream, run_session};
use crate::proto::meter_report_service_server::{MeterReportService, MeterReportServiceServer};
use crate::proto::{Commands, MeterData, MeterDataCollection};

pub struct MeterGrpcServer {
    listener: TcpListener,
    receiver: MeterReportReceiver,
    max_message_bytes: usize,
}

impl MeterGrpcServer {
    /// Bind the listen socket. Port 0 picks a free port.
    pub async fn bind(config: &ServerConfig, sink: Arc<dyn MetricSink>) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
        Ok(Self {
            listener,
            receiver: MeterReportReceiver::new(sink),
            max_message_bytes: config.max_message_bytes,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Serve until `signal` resolves, then let in-flight streams finish.
    ///
    /// Returns once every connection has closed, so no session can emit
    /// after this.
    pub async fn start<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        tracing::debug!(%addr, "Starting SkyWalking meter gRPC server");

        TonicServer::builder()
            .add_service(
                MeterReportServiceServer::new(self.receiver)
                    .max_decoding_message_size(self.max_message_bytes)
                    .max_encoding_message_size(self.max_message_bytes),
            )
            .serve_with_incoming_shutdown(TcpListenerStream::new(self.listener), async move {
                signal.await;
                tracing::debug!("Meter gRPC server shutting down");
            })
            .await
            .context("Meter gRPC server failed")?;

        Ok(())
    }
}

/// `MeterReportService` implementation. Every call is an independent session.
#[derive(Clone)]
pub struct MeterReportReceiver {
    sink: Arc<dyn MetricSink>,
}

impl MeterReportReceiver {
    pub fn new(sink: Arc<dyn MetricSink>) -> Self {
        Self { sink }
    }
}

#[tonic::async_trait]
impl MeterReportService for MeterReportReceiver {
    async fn collect(
        &self,
        request: Request<Streaming<MeterData>>,
    ) -> Result<Response<Commands>, Status> {
        let span = tracing::debug_span!("meter_session", rpc = "collect", remote = ?request.remote_addr());
        let stream = request.into_inner();
        let commands = run_session(stream, &*self.sink)
            .instrument(span)
            .await?;
        Ok(Response::new(commands))
    }

    async fn collect_batch(
        &self,
        request: Request<Streaming<MeterDataCollection>>,
    ) -> Result<Response<Commands>, Status> {
        let span =
            tracing::debug_span!("meter_session", rpc = "collectBatch", remote = ?request.remote_addr());
        let stream = BatchStream::new(request.into_inner());
        let commands = run_session(stream, &*self.sink)
            .instrument(span)
            .await?;
        Ok(Response::new(commands))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::ShutdownService;
    use crate::data::sink::MemorySink;
    use crate::proto::meter_data::Metric;
    use crate::proto::meter_report_service_client::MeterReportServiceClient;
    use crate::proto::{Label, MeterBucketValue, MeterHistogram, MeterSingleValue};

    struct TestServer {
        addr: SocketAddr,
        sink: Arc<MemorySink>,
        shutdown: ShutdownService,
        handle: tokio::task::JoinHandle<Result<()>>,
    }

    impl TestServer {
        async fn start() -> Self {
            Self::with_limit(1024 * 1024).await
        }

        async fn with_limit(max_message_bytes: usize) -> Self {
            let sink = Arc::new(MemorySink::new());
            let config = ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                max_message_bytes,
            };
            let server = MeterGrpcServer::bind(&config, sink.clone()).await.unwrap();
            let addr = server.local_addr().unwrap();
            let shutdown = ShutdownService::new();
            let handle = tokio::spawn(server.start(shutdown.wait()));
            Self {
                addr,
                sink,
                shutdown,
                handle,
            }
        }

        async fn client(&self) -> MeterReportServiceClient<tonic::transport::Channel> {
            MeterReportServiceClient::connect(format!("http://{}", self.addr))
                .await
                .unwrap()
        }

        async fn stop(self) {
            self.shutdown.trigger();
            tokio::time::timeout(Duration::from_secs(5), self.handle)
                .await
                .unwrap()
                .unwrap()
                .unwrap();
        }
    }

    fn single(service: &str, instance: &str, timestamp: i64, name: &str, value: f64) -> MeterData {
        MeterData {
            metric: Some(Metric::SingleValue(MeterSingleValue {
                name: name.to_string(),
                labels: vec![Label {
                    name: "area".to_string(),
                    value: "heap".to_string(),
                }],
                value,
            })),
            service: service.to_string(),
            service_instance: instance.to_string(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_collect_over_grpc() {
        let server = TestServer::start().await;
        let mut client = server.client().await;

        let meters = vec![
            single("", "", 0, "dropped", 1.0),
            single("svcA", "i1", 1000, "cpu", 0.5),
            MeterData {
                metric: Some(Metric::Histogram(MeterHistogram {
                    name: "latency".to_string(),
                    labels: vec![],
                    values: vec![
                        MeterBucketValue {
                            bucket: 10.0,
                            count: 5,
                            is_negative_infinity: false,
                        },
                        MeterBucketValue {
                            bucket: 20.0,
                            count: 3,
                            is_negative_infinity: false,
                        },
                        MeterBucketValue {
                            bucket: 30.0,
                            count: 2,
                            is_negative_infinity: false,
                        },
                    ],
                })),
                ..Default::default()
            },
        ];

        let response = client.collect(tokio_stream::iter(meters)).await.unwrap();
        assert_eq!(response.into_inner(), Commands::default());

        let logs = server.sink.logs();
        let names: Vec<_> = logs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cpu",
                "latency_bucket",
                "latency_bucket",
                "latency_bucket",
                "latency_count",
                "latency_sum",
            ]
        );
        assert!(logs.iter().all(|l| l.timestamp_ms == 1000));
        assert_eq!(logs[0].labels.render(), "area#$#heap|service#$#svcA|serviceInstance#$#i1");
        assert_eq!(logs[4].value, "10");
        assert_eq!(logs[5].value, "170");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_collect_batch_over_grpc() {
        let server = TestServer::start().await;
        let mut client = server.client().await;

        let batches = vec![
            MeterDataCollection {
                meter_data: vec![
                    single("svcB", "i2", 2000, "threads", 12.0),
                    single("", "", 0, "classes", 3400.0),
                ],
            },
            MeterDataCollection {
                meter_data: vec![single("", "", 0, "gc", 2.0)],
            },
        ];
        let response = client
            .collect_batch(tokio_stream::iter(batches))
            .await
            .unwrap();
        assert_eq!(response.into_inner(), Commands::default());

        let logs = server.sink.logs();
        let names: Vec<_> = logs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["threads", "classes", "gc"]);
        assert!(logs.iter().all(|l| l.labels.get("service") == Some("svcB")));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_separate_calls_do_not_share_identity() {
        let server = TestServer::start().await;
        let mut client = server.client().await;

        client
            .collect(tokio_stream::iter(vec![single("svcA", "i1", 10, "a", 1.0)]))
            .await
            .unwrap();
        client
            .collect(tokio_stream::iter(vec![single("", "", 0, "b", 1.0)]))
            .await
            .unwrap();

        let names: Vec<_> = server.sink.logs().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["a"]);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_empty_stream_is_acknowledged() {
        let server = TestServer::start().await;
        let mut client = server.client().await;

        let response = client
            .collect(tokio_stream::iter(Vec::<MeterData>::new()))
            .await
            .unwrap();
        assert_eq!(response.into_inner(), Commands::default());
        assert!(server.sink.is_empty());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_message_over_size_limit_is_rejected() {
        let server = TestServer::with_limit(256).await;
        let mut client = server.client().await;

        let mut oversized = single("svcA", "i1", 1000, "cpu", 1.0);
        if let Some(Metric::SingleValue(value)) = oversized.metric.as_mut() {
            value.labels.push(Label {
                name: "blob".to_string(),
                value: "x".repeat(1024),
            });
        }

        let status = client
            .collect(tokio_stream::iter(vec![oversized]))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::OutOfRange);
        assert!(server.sink.is_empty());

        // small messages still go through on the same server
        client
            .collect(tokio_stream::iter(vec![single("svcA", "i1", 1000, "cpu", 1.0)]))
            .await
            .unwrap();
        assert_eq!(server.sink.len(), 1);

        server.stop().await;
    }
}
