use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::buffer_utils::SseLineParser;

// ============================================================================
// GEMINI streamGenerateContent RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Failures reported inside an HTTP 200 stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<GeminiError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiError {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Finish reasons that cut the answer short for policy reasons
const ABORTING_FINISH_REASONS: [&str; 5] = ["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

impl GenerateContentChunk {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }

    /// Finish reason of the first candidate when it aborts generation
    pub fn aborting_finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .filter(|reason| ABORTING_FINISH_REASONS.contains(reason))
    }
}

/// Turns Gemini SSE payloads into text fragments
pub struct GeminiChunkParser;

impl SseLineParser for GeminiChunkParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<String>> {
        let chunk: GenerateContentChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse Gemini chunk: {}", e))?;

        if let Some(error) = chunk.error {
            anyhow::bail!(
                "Gemini stream error ({}): {}",
                error.status.as_deref().unwrap_or("UNKNOWN"),
                error.message
            );
        }

        if let Some(reason) = chunk.block_reason() {
            anyhow::bail!("Prompt blocked by Gemini: {}", reason);
        }

        if let Some(reason) = chunk.aborting_finish_reason() {
            anyhow::bail!("Gemini stopped generation: {}", reason);
        }

        Ok(chunk
            .text()
            .filter(|t| !t.is_empty())
            .map(|t| vec![t])
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_parts_are_joined() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"X is "},{"text":"Y"}],"role":"model"}}]}"#;
        assert_eq!(GeminiChunkParser.parse_data_line(data).unwrap(), vec!["X is Y"]);
    }

    #[test]
    fn test_final_chunk_without_content() {
        let data = r#"{"candidates":[{"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert!(GeminiChunkParser.parse_data_line(data).unwrap().is_empty());
    }

    #[test]
    fn test_blocked_prompt() {
        let data = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let err = GeminiChunkParser.parse_data_line(data).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_in_stream_error() {
        let data = r#"{"error":{"code":500,"message":"An internal error has occurred","status":"INTERNAL"}}"#;
        let err = GeminiChunkParser.parse_data_line(data).unwrap_err();
        assert!(err.to_string().contains("INTERNAL"));
        assert!(err.to_string().contains("An internal error has occurred"));
    }

    #[test]
    fn test_safety_finish_reason_fails() {
        for reason in ["SAFETY", "RECITATION", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"] {
            let data = format!(r#"{{"candidates":[{{"content":{{"parts":[{{"text":"partial"}}]}},"finishReason":"{reason}"}}]}}"#);
            let err = GeminiChunkParser.parse_data_line(&data).unwrap_err();
            assert!(err.to_string().contains(reason));
        }
    }

    #[test]
    fn test_max_tokens_finish_keeps_text() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"tail"}]},"finishReason":"MAX_TOKENS"}]}"#;
        assert_eq!(GeminiChunkParser.parse_data_line(data).unwrap(), vec!["tail"]);
    }

    #[test]
    fn test_done_marker_is_not_special_but_harmless() {
        // Gemini never sends [DONE]; the default marker check still applies
        assert!(GeminiChunkParser.is_done_marker("[DONE]"));
    }
}
