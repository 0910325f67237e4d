use anyhow::Result;
use async_openai::types::{
    ChatChoice, ChatCompletionRequestMessage, ChatCompletionResponseMessage,
    CompletionUsage, CreateChatCompletionResponse, FinishReason, Role,
};
use async_trait::async_trait;
use std::sync::Mutex;

use crate::openai::{ChatClientTrait, ChatRequest};

/// A scripted chat client for tests: returns queued responses in order and
/// records every request so tests can assert on the model and message
/// shape without touching the network.
#[derive(Debug)]
pub struct FakeChatClient {
    responses: Mutex<Vec<Option<String>>>,
    fail_with: Mutex<Option<String>>,
    // Requests observed so far, for verification in tests.
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl Default for FakeChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChatClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(vec![]),
            fail_with: Mutex::new(None),
            requests: Mutex::new(vec![]),
        }
    }

    /// Queue a response to be returned by the fake client.
    pub fn with_response(self, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Some(response.to_string()));
        self
    }

    /// Queue a response whose message content is None.
    pub fn with_none_content_response(self) -> Self {
        self.responses.lock().unwrap().push(None);
        self
    }

    /// Make every call fail with the given error message, mimicking a
    /// remote service outage.
    pub fn with_failure(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
        self
    }
}

#[async_trait]
impl ChatClientTrait for FakeChatClient {
    #[allow(deprecated)]
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error> {
        self.requests.lock().unwrap().push(ChatRequest {
            model_name: model.clone(),
            message_count: messages.len(),
        });

        if let Some(message) = self.fail_with.lock().unwrap().as_ref() {
            return Err(anyhow::anyhow!("{}", message));
        }

        let mut responses = self.responses.lock().unwrap();
        let content_option = if responses.is_empty() {
            Some("Fake feedback summary".to_string())
        } else {
            responses.remove(0)
        };

        let message = ChatCompletionResponseMessage {
            role: Role::Assistant,
            content: content_option,
            #[allow(deprecated)]
            function_call: None,
            tool_calls: None,
            #[allow(deprecated)]
            refusal: None,
            audio: None,
        };

        let chat_choice = ChatChoice {
            index: 0,
            message,
            finish_reason: Some(FinishReason::Stop),
            logprobs: None,
        };

        let usage = CompletionUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            prompt_tokens_details: None,
            completion_tokens_details: None,
        };

        Ok(CreateChatCompletionResponse {
            id: "fake_id".to_string(),
            object: "chat.completion".to_string(),
            created: 0,
            model: model.clone(),
            system_fingerprint: Some("fake-fingerprint".to_string()),
            service_tier: None,
            choices: vec![chat_choice],
            usage: Some(usage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::ChatCompletionRequestSystemMessageArgs;

    #[tokio::test]
    async fn responses_are_returned_in_queue_order(
    ) -> Result<(), anyhow::Error> {
        let client = FakeChatClient::new()
            .with_response("First summary")
            .with_response("Second summary");

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content("You are helpful")
            .build()?;

        let response1 = client
            .chat_completion(
                "llama3-8b-8192".to_string(),
                vec![ChatCompletionRequestMessage::System(system_msg)],
            )
            .await?;
        assert_eq!(
            response1.choices[0].message.content,
            Some("First summary".to_string())
        );

        let response2 = client
            .chat_completion("llama3-8b-8192".to_string(), vec![])
            .await?;
        assert_eq!(
            response2.choices[0].message.content,
            Some("Second summary".to_string())
        );

        // Queue exhausted: falls back to the default canned response.
        let response3 = client
            .chat_completion("llama3-8b-8192".to_string(), vec![])
            .await?;
        assert_eq!(
            response3.choices[0].message.content,
            Some("Fake feedback summary".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn requests_are_tracked() {
        let client = FakeChatClient::new().with_response("A summary");

        let _ = client
            .chat_completion("llama3-8b-8192".to_string(), vec![])
            .await
            .unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model_name, "llama3-8b-8192");
        assert_eq!(requests[0].message_count, 0);
    }

    #[tokio::test]
    async fn none_content_is_preserved() -> Result<(), anyhow::Error> {
        let client = FakeChatClient::new().with_none_content_response();

        let response = client
            .chat_completion("llama3-8b-8192".to_string(), vec![])
            .await?;

        assert_eq!(response.choices[0].message.content, None);
        Ok(())
    }

    #[tokio::test]
    async fn configured_failure_surfaces_as_error() {
        let client = FakeChatClient::new().with_failure("service unavailable");

        let result = client
            .chat_completion("llama3-8b-8192".to_string(), vec![])
            .await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("service unavailable"));
    }
}
