//! OpenRouter chat-completion client
//!
//! Issues exactly one POST per generation. No retries, no streaming, and no
//! client-side timeout: an unresponsive upstream holds the request open.

use crate::config::{ApiKey, UpstreamConfig};
use crate::error::AppError;
use crate::prompt::{CoverLetterBrief, SYSTEM_PROMPT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message forwarded when an upstream error body carries none
pub const FALLBACK_UPSTREAM_MESSAGE: &str = "OpenRouter API error";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream response contained no completion text")]
    EmptyCompletion,
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, message } => AppError::Upstream { status, message },
            UpstreamError::EmptyCompletion => AppError::EmptyCompletion,
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if it has any
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
    }
}

/// Pull `error.message` out of an upstream error body, if it has one
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Client for the chat-completion endpoint
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    url: String,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            url: config.completions_url(),
            model: config.model().to_string(),
            max_tokens: config.max_tokens(),
        })
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Generate a cover letter for `brief`
    pub async fn generate(
        &self,
        api_key: &ApiKey,
        brief: &CoverLetterBrief,
    ) -> Result<String, UpstreamError> {
        let user_prompt = brief.user_prompt();
        let body = CompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            url = %self.url,
            model = %self.model,
            max_tokens = self.max_tokens,
            prompt_length = user_prompt.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message =
                error_message(&bytes).unwrap_or_else(|| FALLBACK_UPSTREAM_MESSAGE.to_string());
            tracing::warn!(
                status = status.as_u16(),
                error = %message,
                "Upstream returned non-success status"
            );
            return Err(UpstreamError::Status { status, message });
        }

        let parsed: CompletionResponse = serde_json::from_slice(&bytes)?;
        parsed.into_text().ok_or(UpstreamError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_reads_nested_message() {
        let body = br#"{"error":{"message":"rate limited","code":429}}"#;
        assert_eq!(error_message(body).as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_error_message_is_best_effort() {
        assert_eq!(error_message(b"<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(br#"{"error":"plain string"}"#), None);
        assert_eq!(error_message(br#"{"detail":"nope"}"#), None);
    }

    #[test]
    fn test_into_text_takes_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Dear hiring manager"}},
                           {"message":{"content":"second"}}]}"#,
        )
        .expect("should parse");
        assert_eq!(response.into_text().as_deref(), Some("Dear hiring manager"));
    }

    #[test]
    fn test_into_text_handles_missing_pieces() {
        for body in [
            r#"{}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":""}}]}"#,
        ] {
            let response: CompletionResponse = serde_json::from_str(body).expect("should parse");
            assert!(response.into_text().is_none(), "expected no text for {body}");
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = CompletionRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            max_tokens: 1000,
        };
        let value = serde_json::to_value(&body).expect("should serialize");
        assert_eq!(value["model"], "m");
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_upstream_error_maps_to_app_error() {
        let err: AppError = UpstreamError::Status {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "rate limited".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            AppError::Upstream { status, .. } if status == StatusCode::TOO_MANY_REQUESTS
        ));

        let err: AppError = UpstreamError::EmptyCompletion.into();
        assert!(matches!(err, AppError::EmptyCompletion));

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = UpstreamError::Decode(decode).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
