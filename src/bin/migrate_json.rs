use std::path::PathBuf;

use anyhow::Context;
use movieweb::{migrate::migrate_json_file, store::SqlStore};

/// Copies a JSON data file into the database at `DATABASE_URL`.
///
/// Usage: `migrate_json [PATH]`, PATH defaulting to `DATA_PATH` or
/// `data/movies.json`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    movieweb::init_tracing();

    let json_path: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DATA_PATH").ok())
        .unwrap_or_else(|| "data/movies.json".into())
        .into();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let store = SqlStore::connect(&database_url)
        .await
        .context("connect to database")?;

    match migrate_json_file(&json_path, &store).await? {
        Some(report) => tracing::info!(
            users_created = report.users_created,
            users_reused = report.users_reused,
            users_skipped = report.users_skipped,
            movies_copied = report.movies_copied,
            movies_skipped = report.movies_skipped,
            "migration complete"
        ),
        None => tracing::info!("nothing to migrate"),
    }
    Ok(())
}
