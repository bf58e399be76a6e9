mod client;

pub use client::{OpenAICompatClient, DEFAULT_CHAT_MODEL, GROQ_API_BASE};
