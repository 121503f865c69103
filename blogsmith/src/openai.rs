//! Chat completions client backing [`CompletionClient`].

use async_trait::async_trait;
use blogsmith_core::contract::{CompletionClient, CompletionRequest};
use blogsmith_core::error::ServiceError;
use serde::{Deserialize, Serialize};

use crate::http::{ensure_success, network, read_json};
use crate::load_config::{require_env, MissingEnvVar};

const SERVICE: &str = "OpenAI";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            default_model: default_model.into(),
        }
    }

    pub fn new_from_env(base_url: &str, default_model: &str) -> Result<Self, MissingEnvVar> {
        let api_key = require_env(API_KEY_ENV)?;
        tracing::info!(base_url, model = default_model, "Initialized OpenAiClient from environment");
        Ok(Self::new(api_key, base_url, default_model))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn messages(request: &CompletionRequest) -> Vec<ChatMessage<'_>> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system_prompt.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });
    messages
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ServiceError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        tracing::debug!(
            model,
            max_tokens = request.max_tokens,
            prompt_chars = request.prompt.len(),
            "Sending completion request"
        );
        let body = ChatRequest {
            model,
            messages: messages(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| network(SERVICE, e))?;
        let response = ensure_success(SERVICE, response).await?;
        let parsed: ChatResponse = read_json(SERVICE, response).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ServiceError::InvalidResponse {
                service: SERVICE,
                message: "response contained no message content".to_string(),
            })
    }
}
