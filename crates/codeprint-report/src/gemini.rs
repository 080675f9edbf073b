//! Gemini `generateContent` client.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use codeprint_core::GeneratorConfig;

use crate::generator::{GenerateError, TextGenerator};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable that overrides the configured model.
pub const MODEL_ENV: &str = "GEMINI_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Chat-style client: each reply is appended to the history, so later
/// prompts see earlier exchanges.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    history: Mutex<Vec<Content>>,
}

impl GeminiClient {
    /// Creates a client with an explicit key and model.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerateError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            history: Mutex::new(Vec::new()),
        })
    }

    /// Creates a client from configuration and the environment.
    ///
    /// The key is read from `config.api_key_env`; `GEMINI_MODEL` overrides
    /// `config.model`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::MissingApiKey`] if the key variable is unset
    /// or empty.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerateError::MissingApiKey {
                var: config.api_key_env.clone(),
            })?;
        let model = std::env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| config.model.clone());

        Self::new(api_key, model, Duration::from_secs(config.timeout_secs))
    }

    /// Model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn send(&self, contents: &[Content]) -> Result<String, GenerateError> {
        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest { contents })
            .send()?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().unwrap_or_default();
            return Err(GenerateError::RateLimited { body });
        }
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GenerateError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;
        parsed
            .into_text()
            .ok_or_else(|| GenerateError::MalformedResponse("response has no text".to_string()))
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);

        let mut contents = history.clone();
        contents.push(Content::text("user", prompt));

        debug!(model = %self.model, turns = contents.len(), "sending prompt");
        let reply = self.send(&contents)?;

        contents.push(Content::text("model", &reply));
        *history = contents;
        Ok(reply)
    }
}
