//! JSON lines writer draining a `ChannelSink`

use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::SinkError;
use crate::data::types::MetricLog;

/// Where the writer puts JSON lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Stdout,
    File(PathBuf),
}

type BoxedWriter = BufWriter<Box<dyn AsyncWrite + Send + Unpin>>;

/// Drains the queue behind a `ChannelSink`.
///
/// The writer runs until every sender is dropped, so logs emitted by
/// sessions that are still finishing during shutdown are written too.
pub struct SinkWriter {
    rx: mpsc::Receiver<MetricLog>,
    target: SinkTarget,
}

impl SinkWriter {
    pub fn new(rx: mpsc::Receiver<MetricLog>, target: SinkTarget) -> Self {
        Self { rx, target }
    }

    /// Open the target and spawn the writer task
    pub async fn start(self) -> Result<JoinHandle<()>, SinkError> {
        let out = open_target(&self.target).await?;
        tracing::debug!(target = ?self.target, "Sink writer started");
        Ok(tokio::spawn(self.run(out)))
    }

    async fn run(mut self, mut out: BoxedWriter) {
        let mut written: u64 = 0;

        while let Some(log) = self.rx.recv().await {
            if let Err(e) = self.write_available(&mut out, log, &mut written).await {
                tracing::error!(error = %e, "Sink writer failed, stopping");
                return;
            }
        }

        if let Err(e) = out.flush().await {
            tracing::warn!(error = %e, "Sink writer final flush failed");
        }
        tracing::debug!(written, "Sink writer shutdown complete");
    }

    /// Write `first` plus everything already queued, then flush once
    async fn write_available(
        &mut self,
        out: &mut BoxedWriter,
        first: MetricLog,
        written: &mut u64,
    ) -> Result<(), SinkError> {
        write_line(out, &first).await?;
        *written += 1;
        while let Ok(log) = self.rx.try_recv() {
            write_line(out, &log).await?;
            *written += 1;
        }
        out.flush().await?;
        Ok(())
    }
}

async fn open_target(target: &SinkTarget) -> Result<BoxedWriter, SinkError> {
    let inner: Box<dyn AsyncWrite + Send + Unpin> = match target {
        SinkTarget::Stdout => Box::new(tokio::io::stdout()),
        SinkTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            Box::new(file)
        }
    };
    Ok(BufWriter::new(inner))
}

async fn write_line(out: &mut BoxedWriter, log: &MetricLog) -> Result<(), SinkError> {
    let mut line = serde_json::to_vec(log)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::sink::{MetricSink, channel};
    use crate::data::types::Labels;

    fn log(name: &str, value: &str) -> MetricLog {
        let labels: Labels = [("service", "svcA")].into_iter().collect();
        MetricLog::new(name, 1_000, value, labels)
    }

    fn read_lines(path: &std::path::Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_writer_writes_json_lines_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("metrics.jsonl");
        let (sink, rx) = channel(16);

        let handle = SinkWriter::new(rx, SinkTarget::File(path.clone()))
            .start()
            .await
            .unwrap();

        sink.emit(log("cpu", "0.5"));
        sink.emit(log("mem", "42"));
        // writer exits once every sender is gone
        drop(sink);
        handle.await.unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["name"], "cpu");
        assert_eq!(lines[0]["value"], "0.5");
        assert_eq!(lines[1]["name"], "mem");
        assert_eq!(lines[1]["labels"][0]["value"], "svcA");
    }

    #[tokio::test]
    async fn test_writer_drains_queue_after_senders_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let (sink, rx) = channel(16);

        // queued and released before the writer runs
        sink.emit(log("a", "1"));
        sink.emit(log("b", "2"));
        drop(sink);

        let handle = SinkWriter::new(rx, SinkTarget::File(path.clone()))
            .start()
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        let names: Vec<_> = read_lines(&path)
            .into_iter()
            .map(|l| l["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_writer_keeps_running_while_a_sender_lives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let (sink, rx) = channel(16);

        let handle = SinkWriter::new(rx, SinkTarget::File(path.clone()))
            .start()
            .await
            .unwrap();

        sink.emit(log("early", "1"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        sink.emit(log("late", "2"));
        drop(sink);
        handle.await.unwrap();

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[tokio::test]
    async fn test_writer_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        std::fs::write(&path, "{\"name\":\"previous\"}\n").unwrap();

        let (sink, rx) = channel(4);
        let handle = SinkWriter::new(rx, SinkTarget::File(path.clone()))
            .start()
            .await
            .unwrap();
        sink.emit(log("cpu", "1"));
        drop(sink);
        handle.await.unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["name"], "previous");
        assert_eq!(lines[1]["name"], "cpu");
    }
}
