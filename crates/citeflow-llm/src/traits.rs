use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Lazily produced answer fragments. Ends when the upstream signals completion.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A model backend that turns one prompt into a stream of text fragments.
///
/// Every call opens a fresh upstream session; the returned stream is not
/// restartable. Errors may surface either from the call itself (request
/// rejected) or as an `Err` item mid-stream; both mean the generation failed.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Start a streaming generation
    async fn stream(&self, request: GenerationRequest) -> Result<FragmentStream>;

    /// Short provider name used in logs
    fn provider_name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System-level instructions, for backends that accept them separately
    pub instructions: Option<String>,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            instructions: None,
            prompt: prompt.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Sampling options shared by every backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling randomness, always within `[0, 1]`
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = clamp_temperature(temp);
        self
    }

    /// Temperature as sent upstream; covers values set through deserialization
    pub fn effective_temperature(&self) -> f32 {
        clamp_temperature(self.temperature)
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }
}

fn clamp_temperature(temp: f32) -> f32 {
    if temp.is_nan() {
        0.0
    } else {
        temp.clamp(0.0, 1.0)
    }
}
