use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";
const DEFAULT_DATA_PATH: &str = "data/movies.json";

#[derive(Debug, Clone)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

/// Which persistence variant backs the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Json { path: PathBuf },
    Sql { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub storage: StorageConfig,
    pub omdb: OmdbConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let storage = match var("DATABASE_URL") {
            Some(database_url) => StorageConfig::Sql { database_url },
            None => StorageConfig::Json {
                path: var("DATA_PATH")
                    .unwrap_or_else(|| DEFAULT_DATA_PATH.into())
                    .into(),
            },
        };

        let timeout_secs = match var("OMDB_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("OMDB_TIMEOUT_SECS is not a number: {v}"))?,
            None => 8,
        };
        let port = match var("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a port: {v}"))?,
            None => 8080,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            secret_key: var("SECRET_KEY").unwrap_or_else(|| "dev-secret-key".into()),
            storage,
            omdb: OmdbConfig {
                api_key: var("OMDB_API_KEY"),
                base_url: var("OMDB_BASE_URL").unwrap_or_else(|| DEFAULT_OMDB_URL.into()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}
