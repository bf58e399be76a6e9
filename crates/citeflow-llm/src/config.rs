// Configuration layer for provider-agnostic generator creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::traits::TextGenerator;

/// Type of generation backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    #[default]
    OpenaiCompat,
    Gemini,
}

/// Configuration for an OpenAI-compatible endpoint (Groq by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAICompatConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl OpenAICompatConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Configuration for Google Gemini
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Provider configuration, tagged by provider type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    OpenaiCompat(OpenAICompatConfig),
    Gemini(GeminiConfig),
}

impl ProviderConfig {
    pub fn openai_compat(api_key: impl Into<String>) -> Self {
        Self::OpenaiCompat(OpenAICompatConfig::new(api_key))
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini(GeminiConfig::new(api_key))
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::OpenaiCompat(_) => ProviderType::OpenaiCompat,
            Self::Gemini(_) => ProviderType::Gemini,
        }
    }
}

/// Factory for creating generators from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_generator(config: ProviderConfig) -> Result<Arc<dyn TextGenerator>> {
        match config {
            ProviderConfig::OpenaiCompat(cfg) => {
                let mut client = crate::openai::OpenAICompatClient::new(cfg.api_key)?;
                if let Some(base_url) = cfg.base_url {
                    client = client.with_base_url(base_url);
                }
                if let Some(model) = cfg.model {
                    client = client.with_model(model);
                }
                Ok(Arc::new(client))
            }
            ProviderConfig::Gemini(cfg) => {
                let mut builder = crate::gemini::GeminiClient::builder().api_key(cfg.api_key);
                if let Some(base_url) = cfg.base_url {
                    builder = builder.base_url(base_url);
                }
                if let Some(model) = cfg.model {
                    builder = builder.model(model);
                }
                Ok(Arc::new(builder.build()?))
            }
        }
    }
}
