use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::provider::{wire_messages, LlmError, LlmProvider, Message};

/// Hugging Face inference router. Speaks the OpenAI chat-completions
/// protocol, authenticated with an `HF_TOKEN` bearer.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    token: String,
    model: String,
    base_url: String,
}

impl HuggingFaceProvider {
    pub fn new(token: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        json!({
            "model": self.model,
            "messages": wire_messages(messages),
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }
}

fn parse_content(resp: &Value) -> Result<String, LlmError> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LlmError::ParseError("missing choices[0].message.content".into()))
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.request_body(&messages, temperature, max_tokens);

        debug!(model = %self.model, "Hugging Face request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: Value = response.json().await?;
        parse_content(&resp)
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
