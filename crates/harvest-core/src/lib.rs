pub mod assistant;
pub mod client;
pub mod config;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use assistant::{AssistantView, ClipboardSink, Submission, ViewMode};
pub use client::{Answer, AskService, QaClient, DEFAULT_SERVICE_URL};
pub use config::Config;
pub use error::{AskError, ConfigError};
pub use state::{ChatHistory, ChatItem, ItemId, HISTORY_LIMIT};
