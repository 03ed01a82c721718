//! Minimal blocking client for an OpenAI-compatible chat-completions API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::ContentSettings;

/// Request timeout for a single completion.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Chat API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Chat API reply had no message content")]
    EmptyReply,
}

/// Anything that can answer a single-turn prompt.
pub trait ChatService {
    fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String, ChatError>;

    /// Model name stamped on generated payloads.
    fn model(&self) -> &str;
}

pub struct ChatClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl ChatClient {
    /// Build a client, reading the API key from the configured variable.
    pub fn from_settings(settings: &ContentSettings) -> Result<Self, ChatError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ChatError::MissingApiKey(settings.api_key_env.clone()))?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        tracing::debug!("Chat client initialized for model {}", settings.model);
        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            model: settings.model.clone(),
        })
    }
}

impl ChatService for ChatClient {
    fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String, ChatError> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json()?;
        parse_reply(&json)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Text of the first choice, trimmed.
fn parse_reply(json: &Value) -> Result<String, ChatError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if content.is_empty() {
        return Err(ChatError::EmptyReply);
    }
    Ok(content)
}

/// Strip a surrounding markdown code fence (with optional `json` tag).
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let inner = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let reply = "```json\n{\"title\": \"AI\"}\n```";
        assert_eq!(strip_code_fence(reply), "{\"title\": \"AI\"}");
    }

    #[test]
    fn strips_plain_fence() {
        assert_eq!(strip_code_fence("```\n{}\n```\ntrailing"), "{}");
    }

    #[test]
    fn unfenced_reply_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn parses_first_choice() {
        let json = json!({ "choices": [{ "message": { "content": "  hello \n" } }] });
        assert_eq!(parse_reply(&json).unwrap(), "hello");
    }

    #[test]
    fn empty_reply_is_error() {
        let json = json!({ "choices": [] });
        assert!(matches!(parse_reply(&json), Err(ChatError::EmptyReply)));
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let settings = ContentSettings {
            api_key_env: "VPP_TEST_UNSET_OPENAI_KEY".to_string(),
            ..Default::default()
        };
        let err = ChatClient::from_settings(&settings).err().unwrap();
        assert!(err.to_string().contains("VPP_TEST_UNSET_OPENAI_KEY"));
    }
}
