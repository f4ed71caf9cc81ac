use std::sync::Arc;

use anyhow::Context;
use axum::{extract::FromRef, response::Html};
use axum_extra::extract::cookie::Key;
use tera::Tera;

use crate::config::{AppConfig, StorageConfig};
use crate::error::AppError;
use crate::flash::cookie_key;
use crate::omdb::{MovieLookup, OmdbClient};
use crate::store::{JsonStore, MovieStore, SqlStore};

const TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*");

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MovieStore>,
    pub lookup: Arc<dyn MovieLookup>,
    pub templates: Arc<Tera>,
    pub cookie_key: Key,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store: Arc<dyn MovieStore> = match &config.storage {
            StorageConfig::Json { path } => {
                tracing::info!(path = %path.display(), "using json store");
                Arc::new(JsonStore::new(path.clone()))
            }
            StorageConfig::Sql { database_url } => {
                tracing::info!("using sql store");
                Arc::new(
                    SqlStore::connect(database_url)
                        .await
                        .context("connect to database")?,
                )
            }
        };
        let lookup = Arc::new(OmdbClient::new(&config.omdb).context("build omdb client")?);

        Self::from_parts(config, store, lookup)
    }

    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn MovieStore>,
        lookup: Arc<dyn MovieLookup>,
    ) -> anyhow::Result<Self> {
        let templates = Tera::new(TEMPLATES).context("load templates")?;
        Ok(Self {
            store,
            lookup,
            templates: Arc::new(templates),
            cookie_key: cookie_key(&config.secret_key),
            config: Arc::new(config),
        })
    }

    pub fn render(&self, name: &str, ctx: &tera::Context) -> Result<Html<String>, AppError> {
        Ok(Html(self.templates.render(name, ctx)?))
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
