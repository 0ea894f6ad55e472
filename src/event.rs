//! Decoding of raw stream payloads into [`StreamEvent`]s.
//!
//! Status objects arrive as JSON lines (HTTP transport, WebSocket text frames)
//! or MessagePack (WebSocket binary frames). Anything that is not a post, such
//! as limit notices or delete markers, fails to decode and is dropped by the caller.

use crate::types::StreamEvent;
use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;

const STREAM_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid MessagePack payload: {0}")]
    MessagePack(#[from] rmp_serde::decode::Error),
    #[error("payload has no usable id")]
    MissingId,
    #[error("unparseable created_at: {0}")]
    Date(String),
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    id: Option<u64>,
    id_str: Option<String>,
    text: String,
    extended_tweet: Option<RawExtended>,
    user: RawUser,
    created_at: String,
    retweeted_status: Option<IgnoredAny>,
    quoted_status: Option<IgnoredAny>,
    #[serde(default)]
    is_quote_status: bool,
}

#[derive(Debug, Deserialize)]
struct RawExtended {
    full_text: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    screen_name: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    followers_count: u64,
}

pub fn decode_json(payload: &[u8]) -> Result<StreamEvent, DecodeError> {
    let raw: RawStatus = serde_json::from_slice(payload)?;
    normalize(raw)
}

pub fn decode_msgpack(payload: &[u8]) -> Result<StreamEvent, DecodeError> {
    let raw: RawStatus = rmp_serde::from_slice(payload)?;
    normalize(raw)
}

fn normalize(raw: RawStatus) -> Result<StreamEvent, DecodeError> {
    let id = match (raw.id, raw.id_str.as_deref()) {
        (Some(id), _) => id,
        (None, Some(s)) => s.parse().map_err(|_| DecodeError::MissingId)?,
        (None, None) => return Err(DecodeError::MissingId),
    };

    let is_reshare = raw.retweeted_status.is_some()
        || raw.quoted_status.is_some()
        || raw.is_quote_status
        || raw.text.starts_with("RT ");

    Ok(StreamEvent {
        id,
        author_handle: raw.user.screen_name,
        author_verified: raw.user.verified,
        follower_count: raw.user.followers_count,
        extended_text: raw.extended_tweet.map(|e| e.full_text),
        text: raw.text,
        created_at: parse_created_at(&raw.created_at)?,
        is_reshare,
    })
}

/// Accepts the stream's native date format and RFC 3339.
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_str(value, STREAM_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DecodeError::Date(value.to_string()))
}
