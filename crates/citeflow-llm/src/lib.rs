pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod config;
pub mod openai;
pub mod gemini;

pub use traits::{FragmentStream, GenerationOptions, GenerationRequest, TextGenerator};

pub use buffer_utils::{CircularLineBuffer, SseLineParser};
pub use config::{ClientFactory, GeminiConfig, OpenAICompatConfig, ProviderConfig, ProviderType};
pub use gemini::GeminiClient;
pub use openai::OpenAICompatClient;
