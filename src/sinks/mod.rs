mod chat;
mod mail;
mod persistence;

pub use chat::ChatSink;
pub use mail::{mail_body, MailSink};
pub use persistence::PersistenceSink;

use crate::store::StoreError;
use crate::types::Alert;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned {0}")]
    Status(reqwest::StatusCode),
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// One output channel for matched alerts.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError>;
    fn name(&self) -> &str;

    /// Failures from quiet sinks are logged at debug level instead of warn.
    fn quiet(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct SinkReport {
    pub sink: String,
    pub outcome: Result<(), SinkError>,
}

/// Fans one alert out to every sink concurrently. Outcomes are logged here and go no further.
pub struct Dispatcher {
    sinks: Vec<Box<dyn AlertSink>>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>, timeout: Duration) -> Self {
        Self { sinks, timeout }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn dispatch(&self, alert: &Alert) -> Vec<SinkReport> {
        let deliveries = self.sinks.iter().map(|sink| async move {
            let outcome = match tokio::time::timeout(self.timeout, sink.deliver(alert)).await {
                Ok(result) => result,
                Err(_) => Err(SinkError::Timeout(self.timeout)),
            };

            match &outcome {
                Ok(()) => debug!("Alert {} delivered via {}", alert.event.id, sink.name()),
                Err(e) if sink.quiet() => debug!("Failed to deliver alert via {}: {}", sink.name(), e),
                Err(e) => warn!("Failed to deliver alert via {}: {}", sink.name(), e),
            }

            SinkReport {
                sink: sink.name().to_string(),
                outcome,
            }
        });

        join_all(deliveries).await
    }
}
