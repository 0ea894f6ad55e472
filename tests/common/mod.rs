#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};
use trademark_monitor::sinks::{AlertSink, SinkError};
use trademark_monitor::types::{Alert, StreamEvent, WatchedKeyword};

pub fn event(id: u64, text: &str) -> StreamEvent {
    StreamEvent {
        id,
        author_handle: "someone".to_string(),
        author_verified: false,
        follower_count: 120,
        text: text.to_string(),
        extended_text: None,
        created_at: Utc.with_ymd_and_hms(2021, 6, 1, 9, 30, 0).unwrap(),
        is_reshare: false,
    }
}

pub fn keywords(texts: &[&str]) -> Vec<WatchedKeyword> {
    texts.iter().map(|t| WatchedKeyword::new(1, *t)).collect()
}

/// Records every alert it sees; optionally fails after recording.
#[derive(Clone)]
pub struct RecordingSink {
    pub name: &'static str,
    pub calls: Arc<Mutex<Vec<Alert>>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn new(name: &'static str) -> Self {
        Self { name, calls: Arc::new(Mutex::new(Vec::new())), fail: false }
    }

    pub fn failing(name: &'static str) -> Self {
        Self { fail: true, ..Self::new(name) }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push(alert.clone());
        if self.fail {
            return Err(SinkError::Smtp(format!("{} is down", self.name)));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}
