use thiserror::Error;

/// Failure of a single question/answer round trip.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("could not reach the Q&A service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Q&A service returned status {0}")]
    Status(u16),

    #[error("Q&A service returned a malformed body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request task ended unexpectedly: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}
