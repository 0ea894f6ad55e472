use crate::store::{KeywordSource, StoreError};
use crate::types::{Keyword, Trademark, WatchedKeyword};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Keyword source for standalone mode.
///
/// Trademarks get ids in configuration order starting at 0. The wordlist is
/// not split per brand, so every keyword belongs to the first trademark.
#[derive(Debug, Clone)]
pub struct StaticKeywords {
    trademarks: Vec<Trademark>,
    keywords: Vec<Keyword>,
}

impl StaticKeywords {
    pub fn new(trademarks: &[String], wordlist: &[String]) -> Self {
        let trademarks: Vec<Trademark> = trademarks
            .iter()
            .enumerate()
            .map(|(i, name)| Trademark { id: i as i64, name: name.clone() })
            .collect();
        let keywords = match trademarks.first() {
            Some(owner) => wordlist
                .iter()
                .enumerate()
                .map(|(i, word)| Keyword {
                    id: i as i64,
                    trademark_id: owner.id,
                    text: word.clone(),
                })
                .collect(),
            None => Vec::new(),
        };
        Self { trademarks, keywords }
    }
}

#[async_trait]
impl KeywordSource for StaticKeywords {
    async fn list_trademarks(&self) -> Result<Vec<Trademark>, StoreError> {
        Ok(self.trademarks.clone())
    }

    async fn list_keywords(&self) -> Result<Vec<Keyword>, StoreError> {
        Ok(self.keywords.clone())
    }
}

/// What the listener subscribes to upstream and what it matches locally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Watchlist {
    /// Terms sent to the stream as its filter.
    pub track: Vec<String>,
    pub keywords: Vec<WatchedKeyword>,
}

impl Watchlist {
    pub fn build(trademarks: &[Trademark], keywords: &[Keyword]) -> Self {
        let known: HashMap<i64, &Trademark> = trademarks.iter().map(|t| (t.id, t)).collect();

        let watched: Vec<WatchedKeyword> = keywords
            .iter()
            .filter(|k| !k.text.trim().is_empty())
            .filter(|k| {
                let owned = known.contains_key(&k.trademark_id);
                if !owned {
                    debug!("Skipping keyword {:?}: unknown trademark {}", k.text, k.trademark_id);
                }
                owned
            })
            .map(|k| WatchedKeyword::new(k.trademark_id, k.text.trim()))
            .collect();

        let mut seen = HashSet::new();
        let track = trademarks
            .iter()
            .map(|t| t.name.trim())
            .chain(watched.iter().map(|k| k.text.as_str()))
            .filter(|term| !term.is_empty() && seen.insert(term.to_lowercase()))
            .map(str::to_string)
            .collect();

        Self { track, keywords: watched }
    }
}

pub async fn load_watchlist(source: &dyn KeywordSource) -> Result<Watchlist, StoreError> {
    let trademarks = source.list_trademarks().await?;
    let keywords = source.list_keywords().await?;
    Ok(Watchlist::build(&trademarks, &keywords))
}
