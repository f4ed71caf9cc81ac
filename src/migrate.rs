use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::store::{ImportReport, JsonStore, MovieStore, SqlStore};

/// Copies the JSON data file at `json_path` into `target`.
///
/// Returns `None` when there is nothing to copy (no file, or no users in it).
pub async fn migrate_json_file(
    json_path: &Path,
    target: &SqlStore,
) -> anyhow::Result<Option<ImportReport>> {
    if !tokio::fs::try_exists(json_path)
        .await
        .with_context(|| format!("check {}", json_path.display()))?
    {
        info!(path = %json_path.display(), "no json file found, nothing to migrate");
        return Ok(None);
    }

    let users = JsonStore::new(json_path)
        .list_users()
        .await
        .with_context(|| format!("read {}", json_path.display()))?;
    if users.is_empty() {
        info!(path = %json_path.display(), "json file has no users, nothing to migrate");
        return Ok(None);
    }

    let report = target
        .import_users(users)
        .await
        .context("copy users into database")?;
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn target(dir: &Path) -> SqlStore {
        let url = format!("sqlite://{}", dir.join("movies.db").display());
        SqlStore::connect(&url).await.unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_nothing_to_migrate() {
        let dir = tempfile::tempdir().unwrap();
        let db = target(dir.path()).await;
        let report = migrate_json_file(&dir.path().join("absent.json"), &db)
            .await
            .unwrap();
        assert!(report.is_none());
    }

    #[tokio::test]
    async fn empty_document_is_nothing_to_migrate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(&path, r#"{"users": []}"#).unwrap();
        let db = target(dir.path()).await;
        assert!(migrate_json_file(&path, &db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn copies_json_users_and_movies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        std::fs::write(
            &path,
            r#"{"users": [
                {"id": 1, "name": "Ann", "movies": [
                    {"id": 1, "title": "Heat", "year": "1995", "director": "Michael Mann", "poster": ""},
                    {"id": 2, "name": "Alien", "poster_url": "a.jpg"}
                ]},
                {"id": 2, "name": "  ", "movies": []}
            ]}"#,
        )
        .unwrap();
        let db = target(dir.path()).await;

        let report = migrate_json_file(&path, &db).await.unwrap().unwrap();
        assert_eq!(report.users_created, 1);
        assert_eq!(report.users_skipped, 1);
        assert_eq!(report.movies_copied, 2);

        let users = db.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        let alien = &users[0].movies[1];
        assert_eq!(alien.title, "Alien");
        assert_eq!(alien.poster, "a.jpg");

        let rerun = migrate_json_file(&path, &db).await.unwrap().unwrap();
        assert_eq!(rerun.movies_copied, 0);
        assert_eq!(db.list_users().await.unwrap(), users);
    }
}
