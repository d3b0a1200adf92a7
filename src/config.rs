// src/config.rs
//! Environment-driven configuration

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Retries are opt-in; by default one failed call is one failed step attempt.
pub const DEFAULT_RETRY_BUDGET_SECS: u64 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    /// Total time spent retrying transient transport failures; zero (the default) disables retries.
    pub retry_budget: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            llm: LlmConfig {
                api_key,
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                temperature: parse_or(&lookup, "OPENAI_TEMPERATURE", 0.7)?,
                max_tokens: parse_or(&lookup, "OPENAI_MAX_TOKENS", 1000)?,
                request_timeout: Duration::from_secs(parse_or(&lookup, "OPENAI_TIMEOUT_SECS", 120)?),
                retry_budget: Duration::from_secs(parse_or(&lookup, "OPENAI_RETRY_MAX_ELAPSED_SECS", DEFAULT_RETRY_BUDGET_SECS)?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
