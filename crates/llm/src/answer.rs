//! Grounded answer generation over retrieved context.

use std::sync::Arc;
use std::time::{Duration, Instant};

use documind_core::config::LlmConfig;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::provider::{LlmError, LlmProvider, Message};

/// Instruction restricting the model to the supplied context.
pub const SYSTEM_PROMPT: &str = "Answer the question using only the provided context.";

/// Sends a question plus retrieved context to a chat model.
///
/// Calls are bounded twice: a semaphore caps how many run at once, and each
/// call is abandoned with [`LlmError::Timeout`] after `timeout`. Dropping the
/// returned future cancels the in-flight request.
pub struct AnswerGenerator {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl AnswerGenerator {
    pub fn new(
        provider: Box<dyn LlmProvider>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Build from config, creating the appropriate provider.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider = crate::providers::create_provider(config)?;
        Ok(Self::new(
            provider,
            config.temperature,
            config.max_tokens,
            Duration::from_secs(config.timeout_secs),
            config.max_concurrency,
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The system instruction and the user turn, in that order.
    pub fn build_messages(context: &str, question: &str) -> Vec<Message> {
        vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!("Context: {context}\n\nQuestion: {question}")),
        ]
    }

    /// Generate an answer. The model's reply is returned verbatim.
    pub async fn generate(&self, context: &str, question: &str) -> Result<String, LlmError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LlmError::NotConfigured("answer generator shut down".into()))?;

        let messages = Self::build_messages(context, question);
        debug!(
            provider = self.provider.name(),
            context_chars = context.chars().count(),
            "Requesting answer"
        );

        let start = Instant::now();
        let answer = tokio::time::timeout(
            self.timeout,
            self.provider
                .complete(messages, self.temperature, self.max_tokens),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout))??;

        info!(
            provider = self.provider.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            answer_chars = answer.chars().count(),
            "Answer generated"
        );
        Ok(answer)
    }
}
