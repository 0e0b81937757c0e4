//! UI-agnostic session state types
//!
//! The chat history lives here so both the terminal front end and the
//! one-shot command line share the same capping and filtering rules.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of exchanges kept for a session.
pub const HISTORY_LIMIT: usize = 20;

pub type ItemId = Uuid;

/// One completed question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatItem {
    pub id: ItemId,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl ChatItem {
    /// Build an exchange, or `None` when the trimmed question or the answer
    /// is empty.
    ///
    /// The question is stored trimmed; the answer is kept as returned.
    pub fn new(question: &str, answer: &str) -> Option<Self> {
        let question = question.trim();
        if question.is_empty() || answer.is_empty() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        })
    }

    fn matches(&self, needle_lower: &str) -> bool {
        self.question.to_lowercase().contains(needle_lower)
    }
}

/// Most-recent-first list of exchanges, capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    items: VecDeque<ChatItem>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an item, evicting the oldest entries beyond the cap.
    pub fn push(&mut self, item: ChatItem) {
        self.items.push_front(item);
        while self.items.len() > HISTORY_LIMIT {
            if let Some(evicted) = self.items.pop_back() {
                tracing::debug!(id = %evicted.id, "evicted oldest history item");
            }
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&ChatItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose question contains `search`, ignoring case. An empty
    /// search returns every item. Order is preserved.
    pub fn filter(&self, search: &str) -> Vec<&ChatItem> {
        if search.is_empty() {
            return self.items.iter().collect();
        }

        let needle = search.to_lowercase();
        self.items.iter().filter(|item| item.matches(&needle)).collect()
    }
}
