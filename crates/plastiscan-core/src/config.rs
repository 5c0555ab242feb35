//! Runtime configuration for the vision model and the HTTP server.
//!
//! Values come from the process environment; the CLI layers its own
//! flags on top through `clap`'s `env` fallbacks.

use std::time::Duration;

use crate::error::{PlastiscanError, PlastiscanResult};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "PLASTISCAN_MODEL";
/// Environment variable overriding the Gemini base URL.
pub const BASE_URL_ENV: &str = "PLASTISCAN_GEMINI_URL";
/// Environment variable toggling structured output.
pub const STRUCTURED_OUTPUT_ENV: &str = "PLASTISCAN_STRUCTURED_OUTPUT";
/// Environment variable setting the outbound request timeout in seconds.
pub const TIMEOUT_ENV: &str = "PLASTISCAN_TIMEOUT_SECS";

/// Default Gemini API URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default vision model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit. Images travel base64-encoded inside JSON.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Settings for the outbound vision model call.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// API key. An empty key is allowed and fails at call time.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Send a response schema so the model replies with bare JSON.
    pub structured_output: bool,
    /// No timeout when `None`; a hanging upstream call hangs the request.
    pub timeout: Option<Duration>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_URL.to_string(),
            structured_output: true,
            timeout: None,
        }
    }
}

impl ModelConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> PlastiscanResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> PlastiscanResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup(API_KEY_ENV) {
            config.api_key = key.trim().to_string();
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(flag) = lookup(STRUCTURED_OUTPUT_ENV) {
            config.structured_output = parse_bool(&flag).ok_or_else(|| {
                PlastiscanError::config(format!("{} must be a boolean, got '{}'", STRUCTURED_OUTPUT_ENV, flag))
            })?;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).filter(|s| !s.trim().is_empty()) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                PlastiscanError::config(format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, secs))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS on `/api`; `None` allows any origin.
    pub allowed_origin: Option<String>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            allowed_origin: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
