use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use tracing::{debug, info, instrument};

use super::{Movie, MovieStore, MovieUpdate, NewMovie, User};
use crate::error::StoreError;

#[derive(Debug, FromRow)]
struct OwnedMovie {
    user_id: i64,
    #[sqlx(flatten)]
    movie: Movie,
}

/// Counts produced by [`SqlStore::import_users`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub users_created: usize,
    pub users_reused: usize,
    pub users_skipped: usize,
    pub movies_copied: usize,
    pub movies_skipped: usize,
}

/// Relational store on SQLite: `users` and `movies` joined by a cascading
/// foreign key.
#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Opens (creating if needed) the database and applies migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("database ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn movies_of(&self, user_id: i64) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, year, director, poster
            FROM movies
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    /// Copies users and their movies in one transaction.
    ///
    /// Blank names and titles are skipped. A user whose name already exists
    /// is reused, and a movie whose title the target user already has is
    /// not copied again, so running the import twice adds nothing.
    #[instrument(skip_all, fields(users = users.len()))]
    pub async fn import_users(&self, users: Vec<User>) -> Result<ImportReport, StoreError> {
        let mut report = ImportReport::default();
        let mut tx = self.pool.begin().await?;

        for user in users {
            let name = user.name.trim();
            if name.is_empty() {
                report.users_skipped += 1;
                continue;
            }

            let existing: Option<i64> =
                sqlx::query_scalar("SELECT id FROM users WHERE name = ? ORDER BY id LIMIT 1")
                    .bind(name)
                    .fetch_optional(&mut *tx)
                    .await?;
            let user_id = match existing {
                Some(id) => {
                    report.users_reused += 1;
                    id
                }
                None => {
                    report.users_created += 1;
                    sqlx::query("INSERT INTO users (name) VALUES (?)")
                        .bind(name)
                        .execute(&mut *tx)
                        .await?
                        .last_insert_rowid()
                }
            };

            for movie in user.movies {
                let title = movie.title.trim();
                if title.is_empty() {
                    report.movies_skipped += 1;
                    continue;
                }
                let duplicate: Option<i64> = sqlx::query_scalar(
                    "SELECT id FROM movies WHERE user_id = ? AND title = ? LIMIT 1",
                )
                .bind(user_id)
                .bind(title)
                .fetch_optional(&mut *tx)
                .await?;
                if duplicate.is_some() {
                    report.movies_skipped += 1;
                    continue;
                }

                sqlx::query(
                    r#"
                    INSERT INTO movies (user_id, title, year, director, poster)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(user_id)
                .bind(title)
                .bind(movie.year.trim())
                .bind(movie.director.trim())
                .bind(movie.poster.trim())
                .execute(&mut *tx)
                .await?;
                report.movies_copied += 1;
            }
        }

        tx.commit().await?;
        info!(?report, "import committed");
        Ok(report)
    }
}

#[async_trait]
impl MovieStore for SqlStore {
    #[instrument(skip(self))]
    async fn create_user(&self, name: &str) -> Result<Option<User>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        // Run to completion so the autocommit lands before the next read.
        let result = sqlx::query("INSERT INTO users (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(Some(User {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            movies: Vec::new(),
        }))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = sqlx::query_as::<_, User>("SELECT id, name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, OwnedMovie>(
            r#"
            SELECT user_id, id, title, year, director, poster
            FROM movies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_owner: HashMap<i64, Vec<Movie>> = HashMap::new();
        for row in rows {
            by_owner.entry(row.user_id).or_default().push(row.movie);
        }
        for user in &mut users {
            user.movies = by_owner.remove(&user.id).unwrap_or_default();
        }
        Ok(users)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(mut user) = user else {
            return Ok(None);
        };
        user.movies = self.movies_of(user.id).await?;
        Ok(Some(user))
    }

    async fn list_movies(&self, user_id: i64) -> Result<Vec<Movie>, StoreError> {
        self.movies_of(user_id).await
    }

    #[instrument(skip(self, movie))]
    async fn add_movie(
        &self,
        user_id: i64,
        movie: NewMovie,
    ) -> Result<Option<Movie>, StoreError> {
        let movie = movie.trimmed();
        // Inserts nothing when the owner row is missing.
        let result = sqlx::query(
            r#"
            INSERT INTO movies (user_id, title, year, director, poster)
            SELECT id, ?, ?, ?, ? FROM users WHERE id = ?
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.year)
        .bind(&movie.director)
        .bind(&movie.poster)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        let NewMovie {
            title,
            year,
            director,
            poster,
        } = movie;
        Ok(Some(Movie {
            id: result.last_insert_rowid(),
            title,
            year,
            director,
            poster,
        }))
    }

    #[instrument(skip(self, update))]
    async fn update_movie(
        &self,
        user_id: i64,
        movie_id: i64,
        update: MovieUpdate,
    ) -> Result<bool, StoreError> {
        let update = update.trimmed();
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = COALESCE(?, title),
                year = COALESCE(?, year),
                director = COALESCE(?, director),
                poster = COALESCE(?, poster)
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(update.title)
        .bind(update.year)
        .bind(update.director)
        .bind(update.poster)
        .bind(movie_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_movie(&self, user_id: i64, movie_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = ? AND user_id = ?")
            .bind(movie_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
