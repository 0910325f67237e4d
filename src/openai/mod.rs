pub mod fake;
pub mod real;

use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionResponse,
};
use async_trait::async_trait;

/// What a chat request looked like, recorded by the fake client so tests
/// can verify the model and message shape that was sent.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model_name: String,
    pub message_count: usize,
}

/// Abstracts the chat-completion client so the summarizer can run against
/// either the real Groq-hosted endpoint or a scripted fake in tests.
///
/// Uses `async-trait` for the async method and the request/response types
/// from the `async_openai` crate directly.
#[async_trait]
pub trait ChatClientTrait: Send + Sync + std::fmt::Debug {
    /// Sends the messages to the given model and returns the raw response.
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error>;
}
