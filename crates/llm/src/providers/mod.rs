pub mod huggingface;
pub mod ollama;

use documind_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the LLM provider selected by `LLM_PROVIDER`.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.provider.as_str() {
        "huggingface" | "hf" => {
            let token = config
                .hf_token
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("HF_TOKEN not set".into()))?;
            Ok(Box::new(huggingface::HuggingFaceProvider::new(
                token.clone(),
                config.hf_model.clone(),
                config.hf_base_url.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            config.ollama_url.clone(),
            config.ollama_model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huggingface_requires_token() {
        let config = LlmConfig::default();
        assert!(matches!(
            create_provider(&config),
            Err(LlmError::NotConfigured(_))
        ));

        let config = LlmConfig { hf_token: Some("hf_x".into()), ..LlmConfig::default() };
        assert_eq!(create_provider(&config).unwrap().name(), "huggingface");
    }

    #[test]
    fn selects_ollama_and_rejects_unknown() {
        let config = LlmConfig { provider: "ollama".into(), ..LlmConfig::default() };
        assert_eq!(create_provider(&config).unwrap().name(), "ollama");

        let config = LlmConfig { provider: "gpt".into(), ..LlmConfig::default() };
        assert!(create_provider(&config).is_err());
    }
}
