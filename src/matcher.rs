use crate::deduplication::DedupWindow;
use crate::types::{StreamEvent, WatchedKeyword};
use tracing::debug;

/// Keyword matching plus the dedup gate. Owns the only dedup window.
pub struct Matcher {
    keywords: Vec<(String, WatchedKeyword)>,
    window: DedupWindow,
}

impl Matcher {
    pub fn new(window: DedupWindow) -> Self {
        Self {
            keywords: Vec::new(),
            window,
        }
    }

    /// Installs a new keyword set. Called at stream (re)connect only.
    pub fn replace_keywords(&mut self, keywords: Vec<WatchedKeyword>) {
        self.keywords = keywords
            .into_iter()
            .filter(|k| !k.text.trim().is_empty())
            .map(|k| (k.text.to_lowercase(), k))
            .collect();
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    pub fn window(&self) -> &DedupWindow {
        &self.window
    }

    /// Matches the event and, on a first sighting of its id, records it in the window.
    pub fn check(&mut self, event: &StreamEvent) -> Option<WatchedKeyword> {
        if event.is_reshare {
            return None;
        }

        let haystack = event.match_text().to_lowercase();
        let (_, keyword) = self
            .keywords
            .iter()
            .find(|(needle, _)| haystack.contains(needle.as_str()))?;

        if self.window.contains(event.id) {
            debug!("Duplicate event {} suppressed (keyword: {})", event.id, keyword.text);
            return None;
        }

        let keyword = keyword.clone();
        self.window.add(event.id);
        Some(keyword)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DedupWindow::default())
    }
}
