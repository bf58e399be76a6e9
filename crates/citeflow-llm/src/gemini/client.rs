// Google Gemini backend

use crate::buffer_utils::parse_sse_stream;
use crate::gemini::types::GeminiChunkParser;
use crate::traits::{FragmentStream, GenerationRequest, TextGenerator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Gemini client (HTTP direct, no SDK)
///
/// Gemini differs from the chat completions protocol:
/// - URL: {base}/models/{model}:streamGenerateContent?alt=sse
/// - Auth header: x-goog-api-key instead of Authorization: Bearer
/// - System instructions and sampling options live in dedicated fields
#[derive(Debug)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Build generateContent payload
    pub(crate) fn build_payload(&self, request: &GenerationRequest) -> Value {
        let mut payload = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "temperature": request.options.effective_temperature(),
                "maxOutputTokens": request.options.max_output_tokens,
            },
        });

        if let (Some(instructions), Some(obj)) = (&request.instructions, payload.as_object_mut()) {
            obj.insert(
                "systemInstruction".to_string(),
                serde_json::json!({ "parts": [{ "text": instructions }] }),
            );
        }

        payload
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn stream(&self, request: GenerationRequest) -> Result<FragmentStream> {
        let payload = self.build_payload(&request);

        tracing::debug!(model = %self.model, "Opening Gemini content stream");

        let response = self
            .http_client
            .post(self.stream_url())
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        Ok(parse_sse_stream(response, GeminiChunkParser))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

/// Builder for GeminiClient
#[derive(Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
}

impl GeminiClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Defaults to https://generativelanguage.googleapis.com/v1beta
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .ok_or_else(|| anyhow::anyhow!("api_key is required"))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key).context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| GEMINI_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiClient {
            http_client,
            base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        })
    }
}
