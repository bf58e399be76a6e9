use citeflow_llm::{GeminiConfig, GenerationOptions, OpenAICompatConfig, ProviderConfig, ProviderType};
use citeflow_types::{ExcerptPolicy, RunConfig};
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Env vars consulted for the OpenAI-compatible backend key, first match wins
const COMPAT_KEY_VARS: [&str; 3] = ["GROQ_API_KEY", "GROK_API_KEY", "XAI_API_KEY"];
const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub documents: DocumentsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub jobs: JobsConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub compat_api_key: String,
    #[serde(default)]
    pub gemini_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    pub directory: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    /// Backend default when unset
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    pub max_context_chars: usize,
    #[serde(default)]
    pub excerpt_policy: ExcerptPolicy,
    #[serde(default)]
    pub source_url_prefix: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        let defaults = RunConfig::default();
        Self {
            max_context_chars: defaults.max_context_chars,
            excerpt_policy: defaults.excerpt_policy,
            source_url_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    pub max_age_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 3600,
            cleanup_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `CITEFLOW_` environment variables, `__` between path segments
    ///    (e.g. `CITEFLOW_SERVER__PORT=9000`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CITEFLOW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.compat_api_key = COMPAT_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .unwrap_or_default();
        cfg.gemini_api_key = std::env::var(GEMINI_KEY_VAR).unwrap_or_default();

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// The selected backend must have its key
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.llm.provider {
            ProviderType::OpenaiCompat if self.compat_api_key.is_empty() => Err(ConfigError::Message(format!(
                "One of {} environment variables is required",
                COMPAT_KEY_VARS.join(", ")
            ))),
            ProviderType::Gemini if self.gemini_api_key.is_empty() => Err(ConfigError::Message(format!(
                "{GEMINI_KEY_VAR} environment variable is required"
            ))),
            _ => Ok(()),
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        match self.llm.provider {
            ProviderType::OpenaiCompat => {
                let mut cfg = OpenAICompatConfig::new(self.compat_api_key.clone());
                if let Some(base_url) = &self.llm.base_url {
                    cfg = cfg.with_base_url(base_url.clone());
                }
                if let Some(model) = &self.llm.model {
                    cfg = cfg.with_model(model.clone());
                }
                ProviderConfig::OpenaiCompat(cfg)
            }
            ProviderType::Gemini => {
                let mut cfg = GeminiConfig::new(self.gemini_api_key.clone());
                cfg.base_url = self.llm.base_url.clone();
                if let Some(model) = &self.llm.model {
                    cfg = cfg.with_model(model.clone());
                }
                ProviderConfig::Gemini(cfg)
            }
        }
    }

    pub fn run_config(&self) -> RunConfig {
        let generation = GenerationOptions::new()
            .temperature(self.llm.temperature)
            .max_output_tokens(self.llm.max_output_tokens);

        let mut run = RunConfig::new()
            .with_max_context_chars(self.run.max_context_chars)
            .with_excerpt_policy(self.run.excerpt_policy)
            .with_generation(generation);
        if let Some(prefix) = &self.run.source_url_prefix {
            run = run.with_source_url_prefix(prefix.clone());
        }
        run
    }
}
