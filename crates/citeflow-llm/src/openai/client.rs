// OpenAI-compatible chat completions backend (Groq by default)

use crate::buffer_utils::parse_sse_stream;
use crate::streaming::ChatChunkParser;
use crate::traits::{FragmentStream, GenerationRequest, TextGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Client for any endpoint speaking the OpenAI chat completions protocol
/// (HTTP direct, no SDK)
pub struct OpenAICompatClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAICompatClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: GROQ_API_BASE.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build chat completion request payload
    pub(crate) fn build_payload(&self, request: &GenerationRequest) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = &request.instructions {
            messages.push(serde_json::json!({
                "role": "system",
                "content": instructions,
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": request.prompt,
        }));

        serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
            "temperature": request.options.effective_temperature(),
            "max_tokens": request.options.max_output_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatClient {
    async fn stream(&self, request: GenerationRequest) -> Result<FragmentStream> {
        let payload = self.build_payload(&request);

        tracing::debug!(model = %self.model, "Opening chat completion stream");

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completions API error ({}): {}", status, error_text);
        }

        Ok(parse_sse_stream(response, ChatChunkParser))
    }

    fn provider_name(&self) -> &'static str {
        "openai_compat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::GenerationOptions;

    #[test]
    fn test_payload_with_instructions() {
        let client = OpenAICompatClient::new("test-key").unwrap();
        let request = GenerationRequest::new("Question?")
            .with_instructions("Cite with [n].")
            .with_options(GenerationOptions::new().temperature(0.2).max_output_tokens(256));

        let payload = client.build_payload(&request);

        assert_eq!(payload["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["max_tokens"], 256);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["role"], "user");
        assert_eq!(payload["messages"][1]["content"], "Question?");
    }

    #[test]
    fn test_payload_without_instructions() {
        let client = OpenAICompatClient::new("test-key").unwrap().with_model("other-model");
        let payload = client.build_payload(&GenerationRequest::new("Hi"));

        assert_eq!(payload["model"], "other-model");
        assert_eq!(payload["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAICompatClient::new("k")
            .unwrap()
            .with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.base_url, "http://localhost:9000/v1");
    }
}
