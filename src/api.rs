//! Chat completion API integration.
//!
//! Sends the staged diff to an OpenAI-compatible `/chat/completions`
//! endpoint and returns the generated commit message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GenerationError;

/// Default API base; the request goes to `{base}/chat/completions`.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 100;

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Debug)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Turns a diff into a commit message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGenerator {
    async fn generate(
        &self,
        diff: &str,
        model: &str,
        prompt: &str,
        api_key: &str,
    ) -> Result<String, GenerationError>;
}

/// [`MessageGenerator`] backed by the OpenAI chat completions API.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, OPENAI_API_BASE)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Builds the two-message request: prompt as system, raw diff as user.
fn build_request(diff: &str, model: &str, prompt: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: prompt.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: diff.to_string(),
            },
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

#[async_trait]
impl MessageGenerator for OpenAiClient {
    async fn generate(
        &self,
        diff: &str,
        model: &str,
        prompt: &str,
        api_key: &str,
    ) -> Result<String, GenerationError> {
        let request = build_request(diff, model, prompt);
        info!(model, diff_bytes = diff.len(), "requesting commit message");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "completion response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}
