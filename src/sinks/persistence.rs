use super::{AlertSink, SinkError};
use crate::store::RecordStore;
use crate::types::Alert;
use async_trait::async_trait;
use std::sync::Arc;

/// Writes one [`AlertRecord`](crate::types::AlertRecord) per alert. No retry.
pub struct PersistenceSink {
    store: Arc<dyn RecordStore>,
}

impl PersistenceSink {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AlertSink for PersistenceSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        self.store.append_alert(&alert.record()).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "record-store"
    }
}
