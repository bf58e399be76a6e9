use serde::{Deserialize, Serialize};

pub const SEARCH_DOCUMENTS: &str = "search_documents";
pub const ANALYZE_CONTENT: &str = "analyze_content";

/// One event of a run, in the order the transport must deliver them.
///
/// Serialized with an `event` tag, e.g. `{"event":"text","delta":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Status change of one of the run's logical tool calls
    ToolCall {
        #[serde(rename = "toolCall")]
        tool_call: ToolCallStatus,
    },

    /// Answer text, exactly as the model produced it
    Text {
        delta: String,
    },

    /// First sighting of a valid citation marker
    Citation {
        citation: Citation,
    },

    /// One card per cited document, after the answer is complete
    Source {
        source: SourceCard,
    },

    /// Run completed normally
    Done,

    /// Run failed; nothing follows
    Error {
        error: ErrorCode,
        message: String,
    },
}

impl ChatEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::Text { delta: delta.into() }
    }

    pub fn tool_call(tool_call: ToolCallStatus) -> Self {
        Self::ToolCall { tool_call }
    }

    pub fn error(error: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error,
            message: message.into(),
        }
    }

    /// Event name as it appears in the `event` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToolCall { .. } => "tool_call",
            Self::Text { .. } => "text",
            Self::Citation { .. } => "citation",
            Self::Source { .. } => "source",
            Self::Done => "done",
            Self::Error { .. } => "error",
        }
    }

    /// The event's fields without the `event` tag, for transports that carry
    /// the name out of band (SSE `event:` line)
    pub fn payload(&self) -> serde_json::Value {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.remove("event");
                serde_json::Value::Object(map)
            }
            _ => serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallStatus {
    pub id: String,
    pub name: String,
    pub status: ToolStatus,
    pub description: String,
}

impl ToolCallStatus {
    pub fn running(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_status(id, name, ToolStatus::Running, description)
    }

    pub fn completed(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_status(id, name, ToolStatus::Completed, description)
    }

    pub fn failed(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_status(id, name, ToolStatus::Failed, description)
    }

    fn with_status(
        id: impl Into<String>,
        name: impl Into<String>,
        status: ToolStatus,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    /// Marker number, 1-based position in the prompt context
    pub id: u32,
    pub document_id: String,
    pub document_title: String,
    pub page_number: u32,
    /// Excerpt of the cited document
    pub text: String,
    /// Character span of the marker in the answer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCard {
    pub document_id: String,
    pub title: String,
    pub page_number: u32,
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Machine-readable failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NoDocuments,
    GenerationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDocuments => "no_documents",
            Self::GenerationFailed => "generation_failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
