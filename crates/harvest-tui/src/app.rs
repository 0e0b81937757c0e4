use std::sync::Arc;

use harvest_core::{Answer, AskError, AskService, AssistantView, ClipboardSink, ItemId};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    History,      // Sidebar: search box + past exchanges
    Conversation, // Selected question/answer pair
    Composer,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::History => FocusPane::Conversation,
            FocusPane::Conversation => FocusPane::Composer,
            FocusPane::Composer => FocusPane::History,
        }
    }
}

/// A question that has been sent and whose answer is still pending.
pub struct PendingQuery {
    pub question: String,
    handle: JoinHandle<Result<Answer, AskError>>,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub view: AssistantView,
    pub service_url: String,

    // Composer
    pub query_cursor: usize, // cursor position in the composer, in chars
    pub query_task: Option<PendingQuery>,

    // Sidebar
    pub history_state: ListState,

    // Conversation pane
    pub conversation_scroll: u16,

    // One-line feedback shown in the footer ("Answer copied", ...)
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub history_area: Option<Rect>,
    pub conversation_area: Option<Rect>,

    service: Arc<dyn AskService>,
    clipboard: Box<dyn ClipboardSink>,
}

impl App {
    pub fn new(
        service: Arc<dyn AskService>,
        service_url: String,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Composer,
            view: AssistantView::new(),
            service_url,

            query_cursor: 0,
            query_task: None,

            history_state: ListState::default(),

            conversation_scroll: 0,

            status: None,
            animation_frame: 0,

            history_area: None,
            conversation_area: None,

            service,
            clipboard,
        }
    }

    /// Send the composer text in a background task.
    pub fn submit_question(&mut self) {
        let Some(question) = self.view.begin_submit() else {
            return;
        };

        tracing::info!(%question, "submitting question");
        self.status = None;
        self.animation_frame = 0;

        let service = Arc::clone(&self.service);
        let sent = question.clone();
        let handle = tokio::spawn(async move { service.ask(&sent).await });
        self.query_task = Some(PendingQuery { question, handle });
    }

    /// Apply the answer once the background request has finished.
    pub async fn poll_query_task(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .is_some_and(|task| task.handle.is_finished());
        if !finished {
            return;
        }

        let Some(task) = self.query_task.take() else {
            return;
        };
        let result = match task.handle.await {
            Ok(result) => result,
            Err(err) => Err(AskError::Aborted(err.to_string())),
        };

        if self.view.complete_submit(&task.question, result).is_some() {
            self.query_cursor = self.query_cursor.min(self.view.question().chars().count());
            self.conversation_scroll = 0;
            self.sync_history_highlight();
        } else if self.view.failure().is_none() {
            self.status = Some("No answer returned".to_string());
        }
    }

    /// Point the sidebar highlight at the selected item, if it is visible.
    pub fn sync_history_highlight(&mut self) {
        let index = self.view.selected_id().and_then(|id| self.visible_index(id));
        self.history_state.select(index);
    }

    fn visible_index(&self, id: ItemId) -> Option<usize> {
        self.view
            .visible_history()
            .iter()
            .position(|item| item.id == id)
    }

    pub fn visible_len(&self) -> usize {
        self.view.visible_history().len()
    }

    // Sidebar navigation
    pub fn history_nav_down(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            let i = self.history_state.selected().map_or(0, |i| i + 1);
            self.history_state.select(Some(i.min(len - 1)));
        }
    }

    pub fn history_nav_up(&mut self) {
        if self.visible_len() > 0 {
            let i = self.history_state.selected().unwrap_or(0);
            self.history_state.select(Some(i.saturating_sub(1)));
        }
    }

    /// Show the highlighted sidebar item in the conversation pane.
    pub fn open_highlighted(&mut self) {
        let id = self
            .history_state
            .selected()
            .and_then(|i| self.view.visible_history().get(i).map(|item| item.id));

        if let Some(id) = id {
            if self.view.select_item(id) {
                self.conversation_scroll = 0;
                self.focus = FocusPane::Conversation;
            }
        }
    }

    /// Re-clamp the highlight after the search text changed.
    pub fn on_search_changed(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            self.history_state.select(None);
            return;
        }

        match self.view.selected_id().and_then(|id| self.visible_index(id)) {
            Some(index) => self.history_state.select(Some(index)),
            None => self.history_state.select(Some(0)),
        }
    }

    pub fn new_chat(&mut self) {
        self.view.start_new_chat();
        self.query_cursor = 0;
        self.conversation_scroll = 0;
        self.history_state.select(None);
        self.status = None;
        self.focus = FocusPane::Composer;
        self.input_mode = InputMode::Editing;
    }

    pub fn copy_answer(&mut self) {
        let copied = self.view.copy_selected_answer(self.clipboard.as_mut());
        self.status = Some(if copied {
            "Answer copied".to_string()
        } else {
            "Nothing to copy".to_string()
        });
    }

    // Conversation scrolling
    pub fn scroll_down(&mut self) {
        self.conversation_scroll = self.conversation_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.conversation_scroll = self.conversation_scroll.saturating_sub(1);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.view.is_submitting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers every question by echoing it back.
    pub struct EchoService;

    #[async_trait]
    impl AskService for EchoService {
        async fn ask(&self, question: &str) -> Result<Answer, AskError> {
            Ok(Answer::new(format!("answer to {}", question)))
        }
    }

    pub struct DownService;

    #[async_trait]
    impl AskService for DownService {
        async fn ask(&self, _question: &str) -> Result<Answer, AskError> {
            Err(AskError::Status(503))
        }
    }

    struct PanickingService;

    #[async_trait]
    impl AskService for PanickingService {
        async fn ask(&self, _question: &str) -> Result<Answer, AskError> {
            panic!("service crashed")
        }
    }

    #[derive(Clone, Default)]
    pub struct SharedClipboard(pub Arc<Mutex<Vec<String>>>);

    impl ClipboardSink for SharedClipboard {
        fn set_text(&mut self, text: &str) -> bool {
            self.0.lock().unwrap().push(text.to_string());
            true
        }
    }

    pub fn test_app(service: Arc<dyn AskService>) -> (App, SharedClipboard) {
        let clipboard = SharedClipboard::default();
        let app = App::new(
            service,
            "http://localhost:8000".to_string(),
            Box::new(clipboard.clone()),
        );
        (app, clipboard)
    }

    pub async fn settle(app: &mut App) {
        for _ in 0..200 {
            app.poll_query_task().await;
            if app.query_task.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("query task never finished");
    }

    pub async fn ask(app: &mut App, question: &str) {
        *app.view.question_mut() = question.to_string();
        app.submit_question();
        settle(app).await;
    }

    #[tokio::test]
    async fn test_submit_selects_and_highlights_answer() {
        let (mut app, _) = test_app(Arc::new(EchoService));
        app.query_cursor = 5;

        ask(&mut app, "wheat").await;

        let selected = app.view.selected().unwrap();
        assert_eq!(selected.answer, "answer to wheat");
        assert_eq!(app.view.question(), "");
        assert_eq!(app.query_cursor, 0);
        assert_eq!(app.history_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_typing_while_waiting_is_kept() {
        let (mut app, _) = test_app(Arc::new(EchoService));
        *app.view.question_mut() = "wheat".to_string();
        app.submit_question();

        *app.view.question_mut() = "tomato".to_string();
        app.query_cursor = 6;
        settle(&mut app).await;

        assert_eq!(app.view.selected().map(|i| i.question.as_str()), Some("wheat"));
        assert_eq!(app.view.question(), "tomato");
        assert_eq!(app.query_cursor, 6);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_composer() {
        let (mut app, _) = test_app(Arc::new(DownService));

        ask(&mut app, "wheat").await;

        assert_eq!(app.view.question(), "wheat");
        assert!(app.view.history().is_empty());
        assert!(!app.view.is_submitting());
        assert_eq!(app.view.failure(), Some("Q&A service returned status 503"));
    }

    #[tokio::test]
    async fn test_crashed_request_task_reports_aborted() {
        let (mut app, _) = test_app(Arc::new(PanickingService));

        ask(&mut app, "wheat").await;

        assert_eq!(app.view.question(), "wheat");
        assert!(app.view.history().is_empty());
        let failure = app.view.failure().unwrap();
        assert!(failure.starts_with("request task ended unexpectedly"));
    }

    #[tokio::test]
    async fn test_empty_composer_spawns_nothing() {
        let (mut app, _) = test_app(Arc::new(EchoService));
        app.submit_question();
        assert!(app.query_task.is_none());
        assert!(!app.view.is_submitting());
    }

    #[tokio::test]
    async fn test_navigate_and_open_history() {
        let (mut app, _) = test_app(Arc::new(EchoService));
        ask(&mut app, "wheat").await;
        ask(&mut app, "tomato").await;

        app.history_nav_down();
        app.open_highlighted();

        assert_eq!(app.view.selected().map(|i| i.question.as_str()), Some("wheat"));
        assert_eq!(app.focus, FocusPane::Conversation);

        app.history_nav_down();
        assert_eq!(app.history_state.selected(), Some(1));
        app.history_nav_up();
        app.history_nav_up();
        assert_eq!(app.history_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_search_reclamps_highlight() {
        let (mut app, _) = test_app(Arc::new(EchoService));
        ask(&mut app, "wheat moisture").await;
        ask(&mut app, "tomato ripeness").await;

        app.view.search = "wheat".to_string();
        app.on_search_changed();
        assert_eq!(app.history_state.selected(), Some(0));

        app.view.search = "barley".to_string();
        app.on_search_changed();
        assert_eq!(app.history_state.selected(), None);
    }

    #[tokio::test]
    async fn test_new_chat_resets_composer_and_selection() {
        let (mut app, _) = test_app(Arc::new(EchoService));
        ask(&mut app, "wheat").await;
        app.view.question_mut().push_str("draft");
        app.query_cursor = 5;

        app.new_chat();

        assert!(app.view.selected().is_none());
        assert_eq!(app.view.question(), "");
        assert_eq!(app.query_cursor, 0);
        assert_eq!(app.history_state.selected(), None);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_copy_answer() {
        let (mut app, clipboard) = test_app(Arc::new(EchoService));
        app.copy_answer();
        assert_eq!(app.status.as_deref(), Some("Nothing to copy"));

        ask(&mut app, "wheat").await;
        app.copy_answer();

        assert_eq!(app.status.as_deref(), Some("Answer copied"));
        assert_eq!(*clipboard.0.lock().unwrap(), vec!["answer to wheat".to_string()]);
    }
}
