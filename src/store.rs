use crate::types::{AlertRecord, Keyword, Trademark};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("record store returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
}

/// Read side of the record store: the trademarks and keywords to watch.
#[async_trait]
pub trait KeywordSource: Send + Sync {
    async fn list_trademarks(&self) -> Result<Vec<Trademark>, StoreError>;
    async fn list_keywords(&self) -> Result<Vec<Keyword>, StoreError>;
}

/// Write side of the record store. Insert-only.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_alert(&self, record: &AlertRecord) -> Result<(), StoreError>;
}
