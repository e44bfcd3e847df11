use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::provider::{wire_messages, LlmError, LlmProvider, Message};

pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn request_body(&self, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
        json!({
            "model": self.model,
            "messages": wire_messages(messages),
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url);
        let body = self.request_body(&messages, temperature, max_tokens);

        debug!("Ollama request to {}", url);

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: Value = response.json().await?;
        let content = resp["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing message.content".into()))?
            .to_string();

        Ok(content)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
