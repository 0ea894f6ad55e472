use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EventId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trademark { pub id: i64, pub name: String }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword { pub id: i64, pub trademark_id: i64, pub text: String }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedKeyword { pub trademark_id: i64, pub text: String }

impl WatchedKeyword {
    pub fn new(trademark_id: i64, text: impl Into<String>) -> Self {
        Self { trademark_id, text: text.into() }
    }
}

/// A post from the stream, normalized at decode time.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub id: EventId,
    pub author_handle: String,
    pub author_verified: bool,
    pub follower_count: u64,
    pub text: String,
    /// Full text of long posts; supersedes `text` when present.
    pub extended_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_reshare: bool,
}

impl StreamEvent {
    pub fn match_text(&self) -> &str {
        self.extended_text.as_deref().unwrap_or(&self.text)
    }

    pub fn severity(&self) -> Severity {
        if self.author_verified { Severity::High } else { Severity::Medium }
    }

    pub fn permalink(&self, base: &str) -> String {
        format!("{}/{}/status/{}", base.trim_end_matches('/'), self.author_handle, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity { Medium, High }

impl Severity {
    pub fn color(&self) -> &'static str {
        match self { Self::High => "#FF0000", Self::Medium => "#FFA500" }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self { Self::Medium => "medium", Self::High => "high" })
    }
}

/// Durable row written once per match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub trademark_id: i64,
    pub keyword: String,
    pub author_handle: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub permalink: String,
    pub verified: bool,
    pub follower_count: u64,
}

/// A matched event together with the keyword that triggered it.
#[derive(Debug, Clone)]
pub struct Alert {
    pub event: StreamEvent,
    pub keyword: WatchedKeyword,
    pub permalink: String,
}

impl Alert {
    pub fn new(event: StreamEvent, keyword: WatchedKeyword, permalink_base: &str) -> Self {
        let permalink = event.permalink(permalink_base);
        Self { event, keyword, permalink }
    }

    pub fn severity(&self) -> Severity {
        self.event.severity()
    }

    pub fn record(&self) -> AlertRecord {
        AlertRecord {
            trademark_id: self.keyword.trademark_id,
            keyword: self.keyword.text.clone(),
            author_handle: self.event.author_handle.clone(),
            text: defang(self.event.match_text()),
            created_at: self.event.created_at,
            permalink: self.permalink.clone(),
            verified: self.event.author_verified,
            follower_count: self.event.follower_count,
        }
    }
}

/// Replaces link schemes so mail clients and chat tools don't render them clickable.
pub fn defang(text: &str) -> String {
    text.replace("https://", "hxxps://").replace("http://", "hxxp://")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListenerState { #[default] Disconnected, Connecting, Streaming }

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Streaming => "STREAMING",
        })
    }
}
