use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use vsn_core::{Config, Result, SqlGenerator};

use crate::guard::{error_message, validate_select};
use crate::prompt::{build_prompt, SYSTEM_MESSAGE};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 150;

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions backed generator.
pub struct OpenAiSqlGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiSqlGenerator {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.openai_api_key.clone(), config.openai_model.clone())
    }

    /// Points the client at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_for(&self, user_query: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(user_query),
                },
            ],
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
        }
    }

    async fn complete(&self, api_key: &str, user_query: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&self.request_for(user_query))
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

impl fmt::Debug for OpenAiSqlGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSqlGenerator")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SqlGenerator for OpenAiSqlGenerator {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate_sql(&self, user_query: &str) -> String {
        let user_query = user_query.trim();
        if user_query.is_empty() {
            return error_message("La consulta está vacía.");
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return error_message("OPENAI_API_KEY no está configurada.");
        };

        info!(model = %self.model, "🤖 Generating SQL");
        match self.complete(api_key, user_query).await {
            Ok(raw) => validate_select(&raw),
            Err(e) => {
                error!(error = %e, "❌ SQL generation failed");
                error_message(e)
            }
        }
    }
}
