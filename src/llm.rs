use crate::{
    log_internal,
    volatile_state::{Role, Turn},
};
use anyhow::{anyhow, Result};
use std::time::Duration;

/// LLM generation settings
pub struct LlmSettings<'a> {
    pub model_name: &'a str,
    pub system: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Something that can continue a chat conversation.
#[serenity::async_trait]
pub trait ChatBackend: Sync + Send {
    async fn complete(&self, request: &LlmChatRequest) -> Result<String>;
}

#[derive(serde::Serialize)]
pub struct LlmChatRequest {
    /// LLM model name
    model: String,
    /// Whether to stream one token at a time, or return entire response is one go
    stream: bool,
    /// Chat conversation to continue.
    messages: Vec<Turn>,
    /// Upper bound on generated tokens
    max_tokens: u32,
    /// LLM temperature
    temperature: f32,
}

#[derive(serde::Deserialize)]
struct LlmChatResponse {
    choices: Vec<LlmChoice>,
}

#[derive(serde::Deserialize)]
struct LlmChoice {
    message: LlmChoiceMessage,
}

#[derive(serde::Deserialize)]
struct LlmChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client, e.g. for the Groq API
pub struct GroqClient {
    client: reqwest::Client,
    chat_url: String,
    api_key: String,
}

impl LlmChatRequest {
    /// System prompt first, then prior turns in chronological order, then the new prompt.
    pub fn new(settings: &LlmSettings<'_>, history: &[Turn], prompt: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Turn::new(Role::system, settings.system));
        messages.extend(history.iter().cloned());
        messages.push(Turn::new(Role::user, prompt));

        Self {
            model: settings.model_name.to_owned(),
            stream: false,
            messages,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }

    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }
}

impl GroqClient {
    pub fn new(cfg: &crate::config::Llm) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Could not build HTTP client: {}", e))?;

        Ok(Self {
            client,
            chat_url: cfg.chat_url.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[serenity::async_trait]
impl ChatBackend for GroqClient {
    async fn complete(&self, request: &LlmChatRequest) -> Result<String> {
        let url = self.chat_url.as_str();

        log_internal!(
            "Sending {} message(s) to chat endpoint {}... ",
            request.messages().len(),
            url
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!(
                "Chat endpoint returned {}: {}",
                status,
                api_error_message(&body)
            ));
        }
        log_internal!("Sending request to chat endpoint {}... done", url);

        parse_response(&body)
    }
}

/// Pull the generated text out of a chat completion response body.
fn parse_response(body: &str) -> Result<String> {
    let response: LlmChatResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("Could not parse chat response: {}", e))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(anyhow!("Chat response contained no content"))
}

/// OpenAI-style APIs report failures as `{"error": {"message": ...}}`.  Fall back to the raw
/// body otherwise.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.to_owned())
}
