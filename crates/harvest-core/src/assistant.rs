//! Assistant view state
//!
//! Holds everything a front end needs to drive one assistant session: the
//! composer text, the capped history, the current selection and the search
//! filter. Network work is kept outside: a front end calls
//! [`AssistantView::begin_submit`], runs the request however it likes, and
//! hands the result to [`AssistantView::complete_submit`].

use crate::client::{Answer, AskService};
use crate::error::AskError;
use crate::state::{ChatHistory, ChatItem, ItemId};

/// Which exchange the main pane shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    NewChat,
    Viewing(ItemId),
}

/// Progress of the most recent submission
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Submission {
    #[default]
    Idle,
    Submitting,
    Failed(String),
}

/// Destination for "copy answer".
pub trait ClipboardSink {
    /// Returns `true` when the text was placed on the clipboard.
    fn set_text(&mut self, text: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct AssistantView {
    question: String,
    history: ChatHistory,
    selected_id: Option<ItemId>,
    pub search: String,
    submission: Submission,
}

impl AssistantView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Mutable composer text. Editing clears a previous failure message.
    pub fn question_mut(&mut self) -> &mut String {
        self.clear_failure();
        &mut self.question
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == Submission::Submitting
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.submission {
            Submission::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn clear_failure(&mut self) {
        if matches!(self.submission, Submission::Failed(_)) {
            self.submission = Submission::Idle;
        }
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        self.selected().map(|item| item.id)
    }

    pub fn selected(&self) -> Option<&ChatItem> {
        self.selected_id.and_then(|id| self.history.get(id))
    }

    /// `Viewing` only while the selection still resolves to a history item.
    pub fn mode(&self) -> ViewMode {
        match self.selected() {
            Some(item) => ViewMode::Viewing(item.id),
            None => ViewMode::NewChat,
        }
    }

    /// Start a submission. Returns the composer text as typed, or `None` when
    /// the composer is blank or a request is already in flight.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.is_submitting() {
            tracing::debug!("submission already in flight");
            return None;
        }

        if self.question.trim().is_empty() {
            tracing::debug!("ignoring empty question");
            return None;
        }

        let question = self.question.clone();
        self.submission = Submission::Submitting;
        Some(question)
    }

    /// Apply the outcome of a request started with [`begin_submit`].
    ///
    /// On success with a non-empty answer the new item is prepended and
    /// selected. The composer is cleared only if it still holds the text that
    /// was sent, so anything typed while waiting survives. On failure the
    /// composer is left untouched and the error message is kept for display.
    ///
    /// [`begin_submit`]: AssistantView::begin_submit
    pub fn complete_submit(
        &mut self,
        question: &str,
        result: Result<Answer, AskError>,
    ) -> Option<ItemId> {
        match result {
            Ok(answer) => {
                self.submission = Submission::Idle;
                let item = match ChatItem::new(question, &answer.text) {
                    Some(item) => item,
                    None => {
                        tracing::debug!("empty answer, no history entry created");
                        return None;
                    }
                };

                let id = item.id;
                tracing::info!(%id, question = %item.question, "answer received");
                self.history.push(item);
                self.selected_id = Some(id);
                if self.question == question {
                    self.question.clear();
                }
                Some(id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "question submission failed");
                self.submission = Submission::Failed(err.to_string());
                None
            }
        }
    }

    /// Submit the composer text to `service` and wait for the answer.
    pub async fn submit_with<S>(&mut self, service: &S) -> Option<ItemId>
    where
        S: AskService + ?Sized,
    {
        let question = self.begin_submit()?;
        let result = service.ask(&question).await;
        self.complete_submit(&question, result)
    }

    /// Select a history item. Unknown ids leave the selection untouched.
    pub fn select_item(&mut self, id: ItemId) -> bool {
        if self.history.contains(id) {
            self.selected_id = Some(id);
            true
        } else {
            false
        }
    }

    pub fn start_new_chat(&mut self) {
        self.selected_id = None;
        self.question.clear();
        self.clear_failure();
    }

    pub fn filter_history(&self, search: &str) -> Vec<&ChatItem> {
        self.history.filter(search)
    }

    /// History filtered by the current search text.
    pub fn visible_history(&self) -> Vec<&ChatItem> {
        self.history.filter(&self.search)
    }

    /// Copy the selected answer. No-op without a selection or with a blank
    /// answer.
    pub fn copy_selected_answer(&self, clipboard: &mut dyn ClipboardSink) -> bool {
        match self.selected() {
            Some(item) if !item.answer.is_empty() => clipboard.set_text(&item.answer),
            _ => false,
        }
    }
}
