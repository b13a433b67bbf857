//! Language-model collaborator.
//!
//! The model is asked to restate the claim decision as JSON. Text-only
//! prompts go through a rig agent; prompts carrying a photo are sent to the
//! chat-completions endpoint directly with an `image_url` content part.

use async_trait::async_trait;
use rig::{agent::Agent, client::CompletionClient, completion::Prompt, providers::openrouter};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::ModelError;
use crate::models::ClaimDecision;
use crate::prompt::VerificationPrompt;

const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const DECISION_PREAMBLE: &str = "You are a crop insurance claims assistant. \
Answer with a single JSON object matching the requested shape and nothing else.";

/// Renders a verification prompt into a schema-checked decision.
#[async_trait]
pub trait DecisionModel: Send + Sync {
    async fn render(&self, prompt: &VerificationPrompt) -> Result<ClaimDecision, ModelError>;
}

pub fn get_llm_agent(api_key: &str, model: &str) -> Agent<openrouter::CompletionModel> {
    let client = openrouter::Client::new(api_key);
    client.agent(model).preamble(DECISION_PREAMBLE).build()
}

/// OpenRouter-backed [`DecisionModel`].
pub struct OpenRouterModel {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl OpenRouterModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn complete_text(&self, text: &str) -> Result<String, ModelError> {
        let agent = get_llm_agent(&self.api_key, &self.model);
        agent
            .prompt(text.to_string())
            .await
            .map_err(|e| ModelError::Request(e.to_string()))
    }

    async fn complete_with_image(&self, text: &str, image_uri: &str) -> Result<String, ModelError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": DECISION_PREAMBLE
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": text },
                        { "type": "image_url", "image_url": { "url": image_uri } }
                    ]
                }
            ]
        });

        let response = self
            .http
            .post(OPENROUTER_CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ModelError::Status(response.status().as_u16()));
        }

        let response_json: Value = response.json().await?;
        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ModelError::MalformedOutput("Invalid response format from LLM".into()))?;

        Ok(content.to_string())
    }
}

#[async_trait]
impl DecisionModel for OpenRouterModel {
    async fn render(&self, prompt: &VerificationPrompt) -> Result<ClaimDecision, ModelError> {
        info!(
            model = %self.model,
            has_media = prompt.media.is_some(),
            "Requesting decision restatement from LLM"
        );

        let response = match prompt.media.as_deref() {
            Some(uri) => self.complete_with_image(&prompt.text, uri).await?,
            None => self.complete_text(&prompt.text).await?,
        };

        debug!(response_length = response.len(), "LLM responded");
        parse_decision_from_response(&response)
    }
}

/// Strictly deserializes the model answer; missing or mistyped fields are errors.
pub fn parse_decision_from_response(response: &str) -> Result<ClaimDecision, ModelError> {
    let body = strip_code_fence(response.trim());
    serde_json::from_str::<ClaimDecision>(body).map_err(|e| ModelError::MalformedOutput(e.to_string()))
}

/// Unwraps a fenced block only when both fences are present.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|t| t.strip_suffix("```"))
    else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim()
}
