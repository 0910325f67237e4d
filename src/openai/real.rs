use crate::openai::ChatClientTrait;
use anyhow::Result;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use async_openai::Client;
use async_trait::async_trait;
use std::sync::Arc;

/// Default API base; Groq exposes an OpenAI-compatible surface.
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Sampling temperature used for every summarization request.
pub const SUMMARY_TEMPERATURE: f32 = 0.4;

// A real chat client backed by the hosted endpoint.
#[derive(Debug)]
pub struct RealChatClient {
    client: Client<OpenAIConfig>,
    temperature: f32,
}

impl RealChatClient {
    pub fn new(client: Client<OpenAIConfig>, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }
}

/// Builds a chat client from configuration, or an error when the API key
/// is absent. Missing credentials are a startup configuration problem and
/// are reported to the operator rather than silently ignored.
pub fn maybe_create_chat_client(
    api_key: Option<String>,
    api_base: Option<String>,
) -> Result<Arc<dyn ChatClientTrait>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "GROQ_API_KEY is not set; provide it via the environment or --groq-api-key"
        )
    })?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()))
        .with_api_key(api_key);

    Ok(Arc::new(RealChatClient::new(
        Client::with_config(config),
        SUMMARY_TEMPERATURE,
    )))
}

#[async_trait]
impl ChatClientTrait for RealChatClient {
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let result = maybe_create_chat_client(None, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn client_builds_with_key_and_default_base() {
        let result =
            maybe_create_chat_client(Some("test-key".to_string()), None);
        assert!(result.is_ok());
    }
}
