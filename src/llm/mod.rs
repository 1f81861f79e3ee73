use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Classified failures from the completion API. The answer service maps each
/// class to a distinct user-facing sentinel, so interfaces can render
/// "service unavailable" differently from "no data" without re-deriving
/// intent.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication rejected ({0})")]
    Auth(StatusCode),

    #[error("rate limited ({0})")]
    RateLimited(StatusCode),

    #[error("completion API returned {0}")]
    Status(StatusCode),

    #[error("unexpected payload: {0}")]
    Schema(String),
}

/// Trait seam over the external completion source.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// One completion attempt, no retries.
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiChat {
    http: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_url: &str, api_key: &str, model: &str) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(OpenAiChat {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChat {
    fn name(&self) -> &str {
        "openai-chat"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.api_url);
        debug!("Requesting completion from {} (model={})", url, self.model);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": 0.7,
            "max_tokens": 500,
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CompletionError::Auth(status));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionError::RateLimited(status));
        }
        if !status.is_success() {
            return Err(CompletionError::Status(status));
        }

        let raw: serde_json::Value = resp.json().await?;
        extract_content(&raw)
    }
}

/// Pull the completion text out of a chat-completions response.
fn extract_content(raw: &serde_json::Value) -> Result<String, CompletionError> {
    raw["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| CompletionError::Schema("missing choices[0].message.content".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_from_chat_response() {
        let raw = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Team A won 2-1.  " } }
            ]
        });
        assert_eq!(extract_content(&raw).unwrap(), "Team A won 2-1.");
    }

    #[test]
    fn test_extract_content_rejects_missing_choices() {
        let raw = serde_json::json!({ "error": { "message": "boom" } });
        assert!(matches!(
            extract_content(&raw),
            Err(CompletionError::Schema(_))
        ));
    }
}
