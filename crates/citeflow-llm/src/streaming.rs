use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::buffer_utils::SseLineParser;

// ============================================================================
// OPENAI-COMPATIBLE CHAT COMPLETION CHUNKS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    /// Some providers report failures inside the stream instead of via status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StreamError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }
}

/// Turns `chat.completion.chunk` payloads into text fragments
pub struct ChatChunkParser;

impl SseLineParser for ChatChunkParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<String>> {
        let chunk: ChatStreamChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;

        if let Some(error) = chunk.error {
            anyhow::bail!("Upstream stream error: {}", error.message);
        }

        Ok(chunk
            .content()
            .filter(|c| !c.is_empty())
            .map(|c| vec![c.to_string()])
            .unwrap_or_default())
    }
}
