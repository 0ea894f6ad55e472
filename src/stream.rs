use crate::config::{StreamConfig, Transport};
use crate::event::{decode_json, decode_msgpack, DecodeError};
use crate::keywords::{load_watchlist, Watchlist};
use crate::pipeline::Pipeline;
use crate::status::ListenerStatus;
use crate::store::KeywordSource;
use crate::types::{ListenerState, StreamEvent};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, trace, warn};

/// Longest partial line kept while waiting for its newline.
const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("HTTP stream error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid bearer token header")]
    Header,
    #[error("connect timed out")]
    ConnectTimeout,
}

/// Owns the stream connection and restarts it forever.
///
/// The watchlist is reloaded before every connection attempt, so trademark
/// edits take effect at the next reconnect rather than mid-stream.
pub struct StreamSupervisor {
    config: StreamConfig,
    source: Arc<dyn KeywordSource>,
    pipeline: Pipeline,
    status: Arc<ListenerStatus>,
    http: reqwest::Client,
    watchlist: Watchlist,
}

impl StreamSupervisor {
    pub fn new(
        config: StreamConfig,
        source: Arc<dyn KeywordSource>,
        pipeline: Pipeline,
        status: Arc<ListenerStatus>,
    ) -> Result<Self, StreamError> {
        // No overall timeout: the response body never ends.
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            config,
            source,
            pipeline,
            status,
            http,
            watchlist: Watchlist::default(),
        })
    }

    pub async fn run(mut self) {
        loop {
            self.status.set_state(ListenerState::Disconnected).await;
            self.refresh_watchlist().await;

            if self.watchlist.track.is_empty() {
                warn!("No trademarks or keywords to track, retrying in {:?}", self.config.retry_delay);
                tokio::time::sleep(self.config.retry_delay).await;
                continue;
            }

            self.status.set_state(ListenerState::Connecting).await;
            info!("Stream starting ({} terms tracked)...", self.watchlist.track.len());

            let result = match self.config.transport {
                Transport::Http => self.stream_http().await,
                Transport::WebSocket => self.stream_websocket().await,
            };
            match result {
                Ok(()) => info!("Stream closed by remote"),
                Err(e) => warn!("Stream failed: {}", e),
            }

            self.status.set_state(ListenerState::Disconnected).await;
            self.status.record_reconnect().await;
            if !self.config.retry_delay.is_zero() {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }
    }

    async fn refresh_watchlist(&mut self) {
        match load_watchlist(self.source.as_ref()).await {
            Ok(watchlist) => {
                info!(
                    "Watchlist loaded: {} track term(s), {} keyword(s)",
                    watchlist.track.len(),
                    watchlist.keywords.len()
                );
                self.pipeline.replace_keywords(watchlist.keywords.clone()).await;
                self.watchlist = watchlist;
            }
            Err(e) => warn!("Failed to refresh watchlist, keeping previous one: {}", e),
        }
    }

    async fn stream_http(&mut self) -> Result<(), StreamError> {
        let mut request = self
            .http
            .get(&self.config.url)
            .query(&[("track", self.watchlist.track.join(","))]);
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        self.status.set_state(ListenerState::Streaming).await;
        info!("HTTP stream connected");

        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::new(MAX_LINE_BYTES);
        while let Some(chunk) = body.next().await {
            for line in lines.push(&chunk?) {
                self.handle(decode_json(&line)).await;
            }
        }
        Ok(())
    }

    async fn stream_websocket(&mut self) -> Result<(), StreamError> {
        let mut request = self.config.url.as_str().into_client_request()?;
        if let Some(token) = &self.config.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| StreamError::Header)?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (ws, _) = tokio::time::timeout(self.config.connect_timeout, connect_async(request))
            .await
            .map_err(|_| StreamError::ConnectTimeout)??;
        let (mut write, mut read) = ws.split();

        let subscribe = serde_json::json!({ "type": "subscribe", "track": self.watchlist.track });
        write.send(Message::Text(subscribe.to_string())).await?;
        self.status.set_state(ListenerState::Streaming).await;
        info!("WebSocket stream connected");

        while let Some(msg) = read.next().await {
            match msg? {
                Message::Text(text) => self.handle(decode_json(text.as_bytes())).await,
                Message::Binary(data) => self.handle(decode_msgpack(&data)).await,
                Message::Ping(data) => write.send(Message::Pong(data)).await?,
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }

    async fn handle(&mut self, decoded: Result<StreamEvent, DecodeError>) {
        match decoded {
            Ok(event) => {
                self.pipeline.process(event).await;
            }
            Err(e) => trace!("Dropping undecodable payload: {}", e),
        }
    }
}

/// Splits a chunked body into newline-terminated lines.
///
/// Blank keep-alive lines are skipped. A partial line that grows past the
/// limit is discarded, and so is the rest of it up to the next newline.
pub struct LineBuffer {
    buffer: Vec<u8>,
    scanned: usize,
    limit: usize,
    overflowed: bool,
}

impl LineBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            limit,
            overflowed: false,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=self.scanned + offset).collect();
            self.scanned = 0;
            if std::mem::take(&mut self.overflowed) || line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            lines.push(line);
        }
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.limit {
            warn!("Discarding {} buffered bytes without a newline", self.buffer.len());
            self.buffer.clear();
            self.scanned = 0;
            self.overflowed = true;
        }
        lines
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_split_across_chunks() {
        let mut lines = LineBuffer::new(64);
        assert!(lines.push(b"{\"id\":").is_empty());
        assert_eq!(lines.pending(), 6);
        assert_eq!(lines.push(b"1}\n{\"id\":2}\n{"), vec![b"{\"id\":1}\n".to_vec(), b"{\"id\":2}\n".to_vec()]);
        assert_eq!(lines.pending(), 1);
    }

    #[test]
    fn skips_keep_alive_lines() {
        let mut lines = LineBuffer::new(64);
        assert_eq!(lines.push(b"\r\n\n  \nx\n"), vec![b"x\n".to_vec()]);
    }

    #[test]
    fn drops_oversized_line_and_recovers() {
        let mut lines = LineBuffer::new(8);
        assert!(lines.push(b"0123456789").is_empty());
        assert_eq!(lines.pending(), 0);
        assert_eq!(lines.push(b"tail of the long one\nok\n"), vec![b"ok\n".to_vec()]);
        assert_eq!(lines.pending(), 0);
    }
}
