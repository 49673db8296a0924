use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Only credentials are required; everything tunable (thresholds, weights,
/// top-K, backend selection) has a default matching the shipped behavior.
/// Threshold and weight invariants are NOT checked here; they are enforced
/// when `RetrieverSettings` and `ScoreWeights` are constructed at startup,
/// so a bad value fails the process before it can fail an analysis.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,

    /// Path to the skills taxonomy JSON. Empty string selects the built-in table.
    pub taxonomy_path: String,

    pub embedding_endpoint: String,
    pub embedding_api_key: String,
    pub embedding_model: String,

    /// Generation backend: "anthropic" or "ollama".
    pub generation_backend: String,
    pub anthropic_api_key: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub generation_temperature: f32,

    pub tau_high: f32,
    pub tau_low: f32,
    pub top_k: usize,

    pub coverage_weight: f64,
    pub explicitness_weight: f64,
    pub role_alignment_weight: f64,
    pub keywords_weight: f64,
    pub writing_quality_weight: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            taxonomy_path: std::env::var("SKILLS_TAXONOMY_PATH").unwrap_or_default(),
            embedding_endpoint: std::env::var("EMBEDDING_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8081/v1/embeddings".to_string()),
            embedding_api_key: std::env::var("EMBEDDING_API_KEY").unwrap_or_default(),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "bge-large-en-v1.5".to_string()),
            generation_backend: std::env::var("GENERATION_BACKEND")
                .unwrap_or_else(|_| "ollama".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: std::env::var("OLLAMA_MODEL")
                .unwrap_or_else(|_| "llama3.1:8b".to_string()),
            generation_temperature: parse_env("GENERATION_TEMPERATURE", 0.3f32)?,
            tau_high: parse_env("TAU_HIGH", 0.75f32)?,
            tau_low: parse_env("TAU_LOW", 0.50f32)?,
            top_k: parse_env("TOP_K", 5usize)?,
            coverage_weight: parse_env("COVERAGE_WEIGHT", 0.35f64)?,
            explicitness_weight: parse_env("EXPLICITNESS_WEIGHT", 0.25f64)?,
            role_alignment_weight: parse_env("ROLE_ALIGNMENT_WEIGHT", 0.15f64)?,
            keywords_weight: parse_env("KEYWORDS_WEIGHT", 0.15f64)?,
            writing_quality_weight: parse_env("WRITING_QUALITY_WEIGHT", 0.10f64)?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
