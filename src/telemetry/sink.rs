//! Bounded queue in front of the log client.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::telemetry::client::{LogClient, LogEvent};

/// Queues events for a single delivery worker.
///
/// `report` never waits: when the queue is full the event is dropped and
/// counted. The worker exits once every sink clone has been dropped.
#[derive(Debug, Clone)]
pub struct TelemetrySink {
    tx: mpsc::Sender<LogEvent>,
}

impl TelemetrySink {
    /// Spawn the delivery worker on the current runtime.
    pub fn spawn(client: LogClient, queue_depth: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<LogEvent>(queue_depth.max(1));

        let worker = tokio::spawn(async move {
            tracing::debug!(endpoint = %client.endpoint(), "Telemetry worker started");
            while let Some(event) = rx.recv().await {
                if !client.log_event(&event).await.is_delivered() {
                    metrics::record_telemetry_dropped("delivery");
                }
            }
            tracing::debug!("Telemetry worker stopped");
        });

        (Self { tx }, worker)
    }

    /// Queue `event` if there is room.
    pub fn report(&self, event: LogEvent) {
        if let Err(e) = self.tx.try_send(event) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue_full",
                mpsc::error::TrySendError::Closed(_) => "closed",
            };
            tracing::debug!(reason, "Telemetry event not queued");
            metrics::record_telemetry_dropped(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_worker_stops_when_sink_dropped() {
        let client = LogClient::new("http://127.0.0.1:9").unwrap();
        let (sink, worker) = TelemetrySink::spawn(client, 4);

        sink.report(LogEvent::new("edge_pass_through", "/app.js"));
        drop(sink);

        tokio::time::timeout(std::time::Duration::from_secs(10), worker)
            .await
            .expect("worker should finish")
            .unwrap();
    }

    #[tokio::test]
    async fn test_report_never_blocks_when_full() {
        let client = LogClient::new("http://127.0.0.1:9").unwrap();
        let (sink, _worker) = TelemetrySink::spawn(client, 1);

        for i in 0..100 {
            sink.report(LogEvent::new("edge_redirect", format!("/page/{}", i)));
        }
    }
}
