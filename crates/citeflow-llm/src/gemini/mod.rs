mod client;
mod types;

pub use client::{GeminiClient, GeminiClientBuilder, DEFAULT_GEMINI_MODEL, GEMINI_API_BASE};
pub use types::{GeminiChunkParser, GeminiError, GenerateContentChunk};
