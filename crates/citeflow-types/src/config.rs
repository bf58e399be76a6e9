use citeflow_llm::GenerationOptions;
use serde::{Deserialize, Serialize};

/// How a citation's excerpt is chosen from the cited document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcerptPolicy {
    /// Opening characters of the document
    Leading,
    /// Window around the first document hit of a word preceding the marker,
    /// falling back to `Leading`
    #[default]
    TermSearch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Per-document character budget in the prompt context
    pub max_context_chars: usize,
    #[serde(default)]
    pub excerpt_policy: ExcerptPolicy,
    #[serde(default)]
    pub generation: GenerationOptions,
    /// When set, source cards link to `{prefix}/{document_id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url_prefix: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 10_000,
            excerpt_policy: ExcerptPolicy::default(),
            generation: GenerationOptions::default(),
            source_url_prefix: None,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_context_chars(mut self, max: usize) -> Self {
        self.max_context_chars = max;
        self
    }

    pub fn with_excerpt_policy(mut self, policy: ExcerptPolicy) -> Self {
        self.excerpt_policy = policy;
        self
    }

    pub fn with_generation(mut self, options: GenerationOptions) -> Self {
        self.generation = options;
        self
    }

    pub fn with_source_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.source_url_prefix = Some(prefix.into());
        self
    }
}
