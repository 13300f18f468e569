use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 20;
const DEFAULT_LLM_TEMPERATURE: f32 = 0.4;

/// Application configuration loaded from environment variables.
/// Fails at startup only if the database URL is missing or a number is malformed;
/// the model settings are allowed to be absent.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmConfig,
}

/// Connection settings for the feedback model.
///
/// `None` means "not configured"; the client reports it when a call is made.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm: LlmConfig::from_env()?,
        })
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_secs = match optional_env("LLM_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };
        let temperature = match optional_env("LLM_TEMPERATURE") {
            Some(v) => v
                .parse::<f32>()
                .context("LLM_TEMPERATURE must be a number")?,
            None => DEFAULT_LLM_TEMPERATURE,
        };

        Ok(LlmConfig {
            base_url: Some(
                optional_env("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            ),
            api_key: optional_env("LLM_API_KEY"),
            model: Some(optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string())),
            timeout_secs,
            temperature,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
