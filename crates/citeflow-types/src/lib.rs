pub mod config;
pub mod events;

pub use config::{ExcerptPolicy, RunConfig};
pub use events::{
    ChatEvent, Citation, ErrorCode, SourceCard, ToolCallStatus, ToolStatus, ANALYZE_CONTENT,
    SEARCH_DOCUMENTS,
};
