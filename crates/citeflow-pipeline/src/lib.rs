pub mod error;
pub mod excerpt;
pub mod pipeline;
pub mod prompt;
pub mod scanner;

pub use error::RunError;
pub use excerpt::Excerpt;
pub use pipeline::{EventStream, Pipeline, RunInput};
pub use prompt::{BuiltPrompt, ContextEntry, PromptBuilder, PromptContext, DEFAULT_INSTRUCTIONS};
pub use scanner::CitationScanner;

// Re-export the event model for consumers of the stream
pub use citeflow_types::{ChatEvent, Citation, ErrorCode, ExcerptPolicy, RunConfig, SourceCard, ToolCallStatus, ToolStatus};
