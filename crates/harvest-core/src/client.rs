use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::AskError;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Text returned by the Q&A service for one question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Extract `answer` from a response body. Any other shape yields an
    /// empty answer rather than an error.
    fn from_body(body: &Value) -> Self {
        let text = body
            .get("answer")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Self::new(text)
    }
}

/// Anything that can answer a harvest-readiness question.
#[async_trait]
pub trait AskService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<Answer, AskError>;
}

/// HTTP client for the external Q&A service (`POST /ask`).
#[derive(Clone)]
pub struct QaClient {
    client: Client,
    base_url: String,
}

impl QaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AskError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }
}

#[async_trait]
impl AskService for QaClient {
    async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        let url = self.ask_url();
        tracing::debug!(%url, "sending question to Q&A service");

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;
        let answer = Answer::from_body(&value);

        tracing::debug!(answer_len = answer.text.len(), "received answer");
        Ok(answer)
    }
}
