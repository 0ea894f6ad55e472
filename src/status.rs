use crate::types::ListenerState;
use serde::Serialize;
use tokio::sync::RwLock;

/// Snapshot served by `/api/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub state: ListenerState,
    pub events_seen: u64,
    pub matches: u64,
    pub reconnects: u64,
    pub keywords: usize,
    pub dedup_window: usize,
}

/// Lifecycle state and counters of the listener.
///
/// Written only from the stream task; the status server reads.
#[derive(Default)]
pub struct ListenerStatus {
    inner: RwLock<StatusSnapshot>,
}

impl ListenerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_state(&self, state: ListenerState) {
        self.inner.write().await.state = state;
    }

    pub async fn state(&self) -> ListenerState {
        self.inner.read().await.state
    }

    pub async fn record_event(&self) {
        self.inner.write().await.events_seen += 1;
    }

    pub async fn record_match(&self, dedup_window: usize) {
        let mut inner = self.inner.write().await;
        inner.matches += 1;
        inner.dedup_window = dedup_window;
    }

    pub async fn record_reconnect(&self) {
        self.inner.write().await.reconnects += 1;
    }

    pub async fn set_keywords(&self, count: usize) {
        self.inner.write().await.keywords = count;
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().await.clone()
    }
}
