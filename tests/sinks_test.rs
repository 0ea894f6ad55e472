mod common;

use async_trait::async_trait;
use common::event;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trademark_monitor::config::ChatConfig;
use trademark_monitor::sinks::{mail_body, AlertSink, ChatSink, PersistenceSink, SinkError};
use trademark_monitor::store::{RecordStore, StoreError};
use trademark_monitor::types::{Alert, AlertRecord, WatchedKeyword};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

fn alert(verified: bool) -> Alert {
    let mut e = event(42, "Buy FakeBrand now at https://fake.example and http://x.example");
    e.author_verified = verified;
    Alert::new(e, WatchedKeyword::new(7, "FakeBrand"), "https://twitter.com/")
}

fn chat_sink(webhook_url: &str, test_only: bool) -> ChatSink {
    ChatSink::new(
        ChatConfig {
            webhook_url: webhook_url.into(),
            channel: "#alerts".into(),
            username: "Trademark Monitor".into(),
            icon_emoji: ":mag:".into(),
            test_only,
        },
        Duration::from_secs(2),
    )
    .unwrap()
}

/// Collects the formatted message of every event emitted while installed.
struct CaptureLayer(Arc<Mutex<Vec<String>>>);

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(visitor.0);
    }
}

#[tokio::test]
async fn chat_test_only_mode_logs_payload_instead_of_sending() {
    let logs = Arc::new(Mutex::new(Vec::new()));
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(CaptureLayer(logs.clone())),
    );

    // `.invalid` never resolves, so any request would fail.
    let sink = chat_sink("http://webhook.invalid/hook", true);
    assert!(sink.deliver(&alert(false)).await.is_ok());

    let logs = logs.lock().unwrap();
    let line = logs
        .iter()
        .find(|l| l.starts_with("[Chat] Test mode"))
        .expect("payload should be logged");
    assert!(line.contains(r##""color":"#FFA500""##));
    assert!(line.contains("https://twitter.com/someone/status/42"));
}

#[tokio::test]
async fn chat_webhook_rejection_is_an_error_value() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/hook", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 16384];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await;
    });

    let sink = chat_sink(&url, false);
    match sink.deliver(&alert(false)).await {
        Err(SinkError::Status(status)) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[test]
fn chat_payload_is_colored_by_severity() {
    let sink = chat_sink("http://webhook.invalid/hook", true);

    let high = sink.payload(&alert(true));
    assert_eq!(high["attachments"][0]["color"], "#FF0000");
    let medium = sink.payload(&alert(false));
    assert_eq!(medium["attachments"][0]["color"], "#FFA500");

    assert_eq!(high["channel"], "#alerts");
    assert_eq!(high["username"], "Trademark Monitor");
    assert_eq!(high["icon_emoji"], ":mag:");

    let button = &high["attachments"][0]["blocks"][2]["elements"][0];
    assert_eq!(button["type"], "button");
    assert_eq!(button["url"], "https://twitter.com/someone/status/42");

    let headline = high["attachments"][0]["blocks"][0]["text"]["text"].as_str().unwrap();
    assert!(headline.starts_with("*[HIGH] @someone*"));
    assert!(headline.contains("*FakeBrand*"));
}

#[test]
fn mail_body_declicks_links() {
    let body = mail_body(&alert(false));
    assert_eq!(
        body,
        "FROM: @someone\r\n\
         TEXT: Buy FakeBrand now at hxxps://fake.example and hxxp://x.example\r\n\
         TWEET DATE: Tue Jun 01 09:30:00 +0000 2021\r\n\
         LINK: hxxps://twitter.com/someone/status/42"
    );
    assert!(!body.contains("http://") && !body.contains("https://"));
}

#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<AlertRecord>>,
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append_alert(&self, record: &AlertRecord) -> Result<(), StoreError> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[tokio::test]
async fn persistence_writes_one_sanitized_record() {
    let store = Arc::new(MemoryStore::default());
    let sink = PersistenceSink::new(store.clone());

    sink.deliver(&alert(true)).await.unwrap();

    let rows = store.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    let record = &rows[0];
    assert_eq!(record.trademark_id, 7);
    assert_eq!(record.keyword, "FakeBrand");
    assert_eq!(record.author_handle, "someone");
    assert_eq!(record.text, "Buy FakeBrand now at hxxps://fake.example and hxxp://x.example");
    assert_eq!(record.permalink, "https://twitter.com/someone/status/42");
    assert!(record.verified);
    assert_eq!(record.follower_count, 120);
}
