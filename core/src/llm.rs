//! Language-model backend behind the primary intent-resolution path.
//!
//! The backend is a seam: production uses [`Brain`] (OpenAI-compatible chat
//! completions), tests script a fake. Everything downstream treats the reply
//! as untrusted free text.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::conversation::{Message, MessageRole};

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("language backend is not configured")]
    Unavailable,

    #[error("language backend call timed out")]
    Timeout,

    #[error("language backend call failed: {0}")]
    Api(String),
}

/// One round trip to the model: system prompt, prior turns, current utterance,
/// free-text reply.
#[async_trait]
pub trait LanguageBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        history: &[Message],
        input: &str,
    ) -> Result<String, LlmError>;
}

pub struct Brain {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Brain {
    /// Builds the backend from the environment, or `None` when no API key is
    /// configured. An absent backend is a supported mode: the resolver falls
    /// back to the keyword classifier.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY").ok()?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        info!(%model, "language backend configured");
        Some(Self { client, model })
    }
}

#[async_trait]
impl LanguageBackend for Brain {
    async fn complete(
        &self,
        system: &str,
        history: &[Message],
        input: &str,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 2);

        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?
                .into(),
        );

        for message in history {
            let built = match message.role {
                MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map(ChatCompletionRequestMessage::from),
                MessageRole::Assistant | MessageRole::System => {
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(message.content.as_str())
                        .build()
                        .map(ChatCompletionRequestMessage::from)
                }
            };
            messages.push(built.map_err(|e| LlmError::Api(e.to_string()))?);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(input)
                .build()
                .map_err(|e| LlmError::Api(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.0)
            .max_tokens(1000u32)
            .messages(messages)
            .build()
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}
