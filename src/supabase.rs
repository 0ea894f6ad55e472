use crate::store::{KeywordSource, RecordStore, StoreError};
use crate::types::{AlertRecord, Keyword, Trademark};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// PostgREST client for the `trademarks`, `keywords` and `alerts` tables.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    url: String,
    service_key: String,
}

#[derive(Deserialize)]
struct TrademarkRow {
    id: i64,
    trademark: String,
}

#[derive(Deserialize)]
struct KeywordRow {
    id: i64,
    id_trademark: i64,
    keyword: String,
}

impl SupabaseClient {
    pub fn new(url: &str, service_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    async fn select<T: for<'de> Deserialize<'de>>(&self, table: &str, columns: &str) -> Result<Vec<T>, StoreError> {
        let response = self
            .client
            .get(format!("{}/rest/v1/{}", self.url, table))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .query(&[("select", columns)])
            .send()
            .await?;

        let rows: Vec<T> = check_status(response).await?.json().await?;
        debug!("[Supabase] Loaded {} row(s) from {}", rows.len(), table);
        Ok(rows)
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

#[async_trait]
impl KeywordSource for SupabaseClient {
    async fn list_trademarks(&self) -> Result<Vec<Trademark>, StoreError> {
        let rows: Vec<TrademarkRow> = self.select("trademarks", "id,trademark").await?;
        Ok(rows
            .into_iter()
            .map(|r| Trademark { id: r.id, name: r.trademark })
            .collect())
    }

    async fn list_keywords(&self) -> Result<Vec<Keyword>, StoreError> {
        let rows: Vec<KeywordRow> = self.select("keywords", "id,id_trademark,keyword").await?;
        Ok(rows
            .into_iter()
            .map(|r| Keyword { id: r.id, trademark_id: r.id_trademark, text: r.keyword })
            .collect())
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn append_alert(&self, record: &AlertRecord) -> Result<(), StoreError> {
        let payload = serde_json::json!({
            "id_trademark": record.trademark_id,
            "keyword": record.keyword,
            "author": record.author_handle,
            "text": record.text,
            "created_at": record.created_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "link": record.permalink,
            "verified": record.verified,
            "followers": record.follower_count,
        });

        let response = self
            .client
            .post(format!("{}/rest/v1/alerts", self.url))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&payload)
            .send()
            .await?;

        check_status(response).await?;

        info!("[Supabase] Inserted alert: @{} ({})", record.author_handle, record.permalink);
        Ok(())
    }
}
