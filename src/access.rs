use std::path::PathBuf;

use tracing::{info, warn};

use crate::{models::Card, store};

/// The RFID allow-list, persisted as a JSON array of cards.
///
/// An empty list puts the hub in bootstrap mode where every card is granted,
/// so the first card can be enrolled from the reader itself. Set
/// `allow_all_when_empty = false` to deny instead.
#[derive(Debug, Clone)]
pub struct AccessList {
    path: PathBuf,
    cards: Vec<Card>,
    allow_all_when_empty: bool,
}

impl AccessList {
    pub fn new(path: impl Into<PathBuf>, cards: Vec<Card>, allow_all_when_empty: bool) -> Self {
        Self {
            path: path.into(),
            cards,
            allow_all_when_empty,
        }
    }

    /// Load the list from `path`. A missing or malformed file yields an empty
    /// list.
    pub async fn load(path: impl Into<PathBuf>, allow_all_when_empty: bool) -> Self {
        let path = path.into();
        let cards: Vec<Card> = store::load(&path).await;
        info!(path = %path.display(), cards = cards.len(), "Access list loaded");
        Self::new(path, cards, allow_all_when_empty)
    }

    pub fn list(&self) -> Vec<Card> {
        self.cards.clone()
    }

    pub fn is_authorized(&self, uid: &str) -> bool {
        if self.cards.is_empty() {
            return self.allow_all_when_empty;
        }
        self.cards.iter().any(|c| c.uid == uid)
    }

    /// Append `card` unless its uid is already listed. Returns whether the
    /// card was added.
    pub async fn add(&mut self, card: Card) -> bool {
        if self.cards.iter().any(|c| c.uid == card.uid) {
            return false;
        }
        self.cards.push(card);
        self.persist().await;
        true
    }

    /// Drop every card with `uid`. Persists even when nothing matched.
    pub async fn remove(&mut self, uid: &str) {
        self.cards.retain(|c| c.uid != uid);
        self.persist().await;
    }

    async fn persist(&self) {
        if let Err(e) = store::save(&self.path, &self.cards).await {
            warn!(path = %self.path.display(), error = %e, "Failed to persist access list");
        }
    }
}
