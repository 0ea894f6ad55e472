use crate::matcher::Matcher;
use crate::sinks::{Dispatcher, SinkReport};
use crate::status::ListenerStatus;
use crate::types::{Alert, StreamEvent, WatchedKeyword};
use std::sync::Arc;
use tracing::info;

/// Matcher followed by sink dispatch, one event at a time.
pub struct Pipeline {
    matcher: Matcher,
    dispatcher: Dispatcher,
    status: Arc<ListenerStatus>,
    permalink_base: String,
}

impl Pipeline {
    pub fn new(
        matcher: Matcher,
        dispatcher: Dispatcher,
        status: Arc<ListenerStatus>,
        permalink_base: impl Into<String>,
    ) -> Self {
        Self {
            matcher,
            dispatcher,
            status,
            permalink_base: permalink_base.into(),
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub async fn replace_keywords(&mut self, keywords: Vec<WatchedKeyword>) {
        self.matcher.replace_keywords(keywords);
        self.status.set_keywords(self.matcher.keyword_count()).await;
    }

    /// Returns the per-sink outcomes, or `None` when the event did not match
    /// or was already alerted on.
    pub async fn process(&mut self, event: StreamEvent) -> Option<Vec<SinkReport>> {
        self.status.record_event().await;

        // The window is updated inside check(), before any sink runs.
        let keyword = self.matcher.check(&event)?;
        self.status.record_match(self.matcher.window().len()).await;

        let alert = Alert::new(event, keyword, &self.permalink_base);
        info!("============= FROM: @{} =============", alert.event.author_handle);
        info!("{}", alert.event.match_text());
        info!("KEYWORD: {} | DATE: {} | LINK: {}", alert.keyword.text, alert.event.created_at, alert.permalink);

        Some(self.dispatcher.dispatch(&alert).await)
    }
}
