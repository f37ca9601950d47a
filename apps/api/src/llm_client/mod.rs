/// LLM Client: the single point of entry for chat-completion calls in jobfinder.
///
/// ARCHITECTURAL RULE: No other module may call the Perplexity API directly.
/// Search code reaches it through `search::provider::PerplexitySearch`.
///
/// One request per call. There is no retry loop: a failed upstream call is reported
/// to the client as a search error.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const TEMPERATURE: f32 = 0.2;
const TOP_P: f32 = 0.9;
const MAX_TOKENS: u32 = 3000;
const SEARCH_RECENCY_FILTER: &str = "month";
const FREQUENCY_PENALTY: f32 = 1.0;
const PRESENCE_PENALTY: f32 = 0.0;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Perplexity API key not configured")]
    MissingApiKey,

    #[error("Perplexity API unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Perplexity API error: {status}")]
    Api { status: u16, message: String },

    #[error("Perplexity API returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    return_images: bool,
    return_related_questions: bool,
    search_recency_filter: &'a str,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Endpoint, model and credentials, taken from `Config` at startup.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Chat-completion client shared by all requests (cheap to clone).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends one system + user message pair and returns the completion text.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: MAX_TOKENS,
            return_images: false,
            return_related_questions: false,
            search_recency_filter: SEARCH_RECENCY_FILTER,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Perplexity API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}
