use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trademark_monitor::{
    config::{Config, KeywordMode},
    deduplication::DedupWindow,
    keywords::StaticKeywords,
    matcher::Matcher,
    pipeline::Pipeline,
    sinks::{AlertSink, ChatSink, Dispatcher, MailSink, PersistenceSink},
    status::{ListenerStatus, StatusSnapshot},
    store::{KeywordSource, RecordStore},
    stream::StreamSupervisor,
    supabase::SupabaseClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trademark_monitor=info")),
        )
        .init();
    dotenvy::dotenv().ok();

    info!("==================================================");
    info!("  TRADEMARK MONITOR");
    info!("==================================================");

    let config = Config::from_env()?;
    info!("Stream URL: {} ({:?})", config.stream.url, config.stream.transport);

    let supabase = match &config.store {
        Some(store) => {
            info!("Record store URL: {}", store.url);
            Some(Arc::new(SupabaseClient::new(&store.url, &store.service_key, config.sink_timeout)?))
        }
        None => None,
    };

    let source: Arc<dyn KeywordSource> = match (&config.keywords, &supabase) {
        (KeywordMode::Standalone { trademarks, wordlist }, _) => {
            info!("Standalone mode: {} keyword(s) for {:?}", wordlist.len(), trademarks);
            Arc::new(StaticKeywords::new(trademarks, wordlist))
        }
        (KeywordMode::RecordStore, Some(client)) => client.clone(),
        (KeywordMode::RecordStore, None) => return Err("record store mode without a record store".into()),
    };

    let mut sinks: Vec<Box<dyn AlertSink>> = Vec::new();
    if let Some(client) = &supabase {
        let store: Arc<dyn RecordStore> = client.clone();
        sinks.push(Box::new(PersistenceSink::new(store)));
    }
    if let Some(mail) = &config.mail {
        match MailSink::new(mail, config.sink_timeout) {
            Ok(sink) => {
                info!("Email alerts enabled (SMTP {} -> {})", mail.smtp_server, mail.dest_email);
                sinks.push(Box::new(sink));
            }
            Err(e) => warn!("Failed to initialize SMTP sink: {}", e),
        }
    }
    if let Some(chat) = &config.chat {
        let test_only = chat.test_only;
        sinks.push(Box::new(ChatSink::new(chat.clone(), config.sink_timeout)?));
        info!("Chat webhook alerts enabled (test only: {})", test_only);
    }

    let dispatcher = Dispatcher::new(sinks, config.sink_timeout);
    if dispatcher.is_empty() {
        warn!("No alert sinks configured; matches will only be logged");
    } else {
        info!("Alert sinks: {:?}", dispatcher.sink_names());
    }

    let status = Arc::new(ListenerStatus::new());
    let matcher = Matcher::new(DedupWindow::new(config.dedup_capacity));
    let pipeline = Pipeline::new(matcher, dispatcher, Arc::clone(&status), config.permalink_base.clone());
    let supervisor = StreamSupervisor::new(config.stream.clone(), source, pipeline, Arc::clone(&status))?;

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/status", get(listener_status))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(status);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Status server running on port {}", config.port);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("Status server stopped: {}", e);
        }
    });

    supervisor.run().await;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "trademark-monitor",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn listener_status(State(status): State<Arc<ListenerStatus>>) -> Json<StatusSnapshot> {
    Json(status.snapshot().await)
}
