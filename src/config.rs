//! Service configuration read from the environment

use crate::dedup::DEFAULT_MAX_ATTEMPTS;
use crate::llm::GeminiConfig;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

/// Configuration for the whole service
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
    /// Sessions without activity for this long are evicted
    pub session_idle_timeout: Duration,
    /// Bound on follow-up generation attempts per question
    pub max_question_attempts: u32,
    pub gemini: GeminiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            max_question_attempts: DEFAULT_MAX_ATTEMPTS,
            gemini: GeminiConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("GEMINI_API_KEY").or_else(|| var("API_KEY"));
        let gemini = GeminiConfig {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or(defaults.gemini.model),
            gateway: var("LLM_GATEWAY"),
            timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                var("LLM_TIMEOUT_SECS"),
                defaults.gemini.timeout.as_secs(),
            )),
        };

        Self {
            port: parse_or("TRIAGE_PORT", var("TRIAGE_PORT"), defaults.port),
            cors_origins: var("TRIAGE_CORS_ORIGINS")
                .map_or(defaults.cors_origins, |v| split_origins(&v)),
            session_idle_timeout: Duration::from_secs(parse_or(
                "TRIAGE_SESSION_IDLE_SECS",
                var("TRIAGE_SESSION_IDLE_SECS"),
                defaults.session_idle_timeout.as_secs(),
            )),
            max_question_attempts: parse_or(
                "TRIAGE_MAX_QUESTION_ATTEMPTS",
                var("TRIAGE_MAX_QUESTION_ATTEMPTS"),
                defaults.max_question_attempts,
            )
            .max(1),
            gemini,
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(name: &str, value: Option<String>, default: T) -> T {
    let Some(raw) = value else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(variable = name, value = %raw, default = %default, "Invalid value, using default");
        default
    })
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
