use anyhow::Context;
use domain::profile::IndexMode;
use dotenvy::dotenv;
use shared::types::Result;
use std::env;

/// Runtime configuration, loaded once from the environment (with `.env`
/// support). Credentials are checked here, before any pipeline runs.
pub struct Config {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
    pub openai_base_url: String,
    pub pinecone_controller_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub index_mode: IndexMode,
    /// Seconds to wait after ingestion for the remote index to settle.
    pub settle_seconds: u64,
    /// Maximum characters of retrieved context passed to the model.
    pub context_char_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY must be set")?,
            pinecone_api_key: env::var("PINECONE_API_KEY")
                .context("PINECONE_API_KEY must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            pinecone_controller_url: env::var("PINECONE_CONTROLLER_URL")
                .unwrap_or_else(|_| "https://api.pinecone.io".to_string()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-ada-002".to_string()),
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", 1536)?,
            index_mode: match env::var("INDEX_MODE") {
                Ok(raw) => raw.parse().map_err(anyhow::Error::msg)?,
                Err(_) => IndexMode::default(),
            },
            settle_seconds: parse_env("SETTLE_SECONDS", 5)?,
            context_char_limit: parse_env("CONTEXT_CHAR_LIMIT", 8000)?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
