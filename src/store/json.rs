use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::{Movie, MovieStore, MovieUpdate, NewMovie, User};
use crate::error::StoreError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: Vec<User>,
}

impl Document {
    fn user_mut(&mut self, user_id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == user_id)
    }

    fn next_user_id(&self) -> i64 {
        self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }
}

fn next_movie_id(user: &User) -> i64 {
    user.movies.iter().map(|m| m.id).max().unwrap_or(0) + 1
}

/// Whole-file JSON store: `{"users": [{"id", "name", "movies": [...]}]}`.
///
/// Every mutation rewrites the file. The mutex serializes read-modify-write
/// cycles inside this process only.
pub struct JsonStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, doc: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let body = serde_json::to_vec_pretty(doc)?;
        let written = match tokio::fs::write(&tmp, body).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                debug!(error = %cleanup, "temp file not removed");
            }
            return Err(e.into());
        }
        debug!(path = %self.path.display(), users = doc.users.len(), "data file written");
        Ok(())
    }

    /// Runs `f` on the current document and writes it back when `f` reports
    /// a change.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Document) -> (T, bool) + Send,
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let (out, changed) = f(&mut doc);
        if changed {
            self.save(&doc).await?;
        }
        Ok(out)
    }
}

#[async_trait]
impl MovieStore for JsonStore {
    #[instrument(skip(self))]
    async fn create_user(&self, name: &str) -> Result<Option<User>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        self.mutate(|doc| {
            let user = User {
                id: doc.next_user_id(),
                name: name.to_string(),
                movies: Vec::new(),
            };
            doc.users.push(user.clone());
            (Some(user), true)
        })
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.load().await?.users;
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self
            .load()
            .await?
            .users
            .into_iter()
            .find(|u| u.id == user_id))
    }

    async fn list_movies(&self, user_id: i64) -> Result<Vec<Movie>, StoreError> {
        Ok(self
            .get_user(user_id)
            .await?
            .map(|u| u.movies)
            .unwrap_or_default())
    }

    #[instrument(skip(self, movie))]
    async fn add_movie(
        &self,
        user_id: i64,
        movie: NewMovie,
    ) -> Result<Option<Movie>, StoreError> {
        let NewMovie {
            title,
            year,
            director,
            poster,
        } = movie.trimmed();
        self.mutate(move |doc| {
            let Some(user) = doc.user_mut(user_id) else {
                return (None, false);
            };
            let movie = Movie {
                id: next_movie_id(user),
                title,
                year,
                director,
                poster,
            };
            user.movies.push(movie.clone());
            (Some(movie), true)
        })
        .await
    }

    #[instrument(skip(self, update))]
    async fn update_movie(
        &self,
        user_id: i64,
        movie_id: i64,
        update: MovieUpdate,
    ) -> Result<bool, StoreError> {
        self.mutate(move |doc| {
            let movie = doc
                .user_mut(user_id)
                .and_then(|u| u.movies.iter_mut().find(|m| m.id == movie_id));
            match movie {
                Some(movie) => {
                    update.apply(movie);
                    (true, true)
                }
                None => (false, false),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_movie(&self, user_id: i64, movie_id: i64) -> Result<bool, StoreError> {
        self.mutate(move |doc| {
            let Some(user) = doc.user_mut(user_id) else {
                return (false, false);
            };
            match user.movies.iter().position(|m| m.id == movie_id) {
                Some(idx) => {
                    user.movies.remove(idx);
                    (true, true)
                }
                None => (false, false),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: i64) -> Result<bool, StoreError> {
        self.mutate(move |doc| match doc.users.iter().position(|u| u.id == user_id) {
            Some(idx) => {
                doc.users.remove(idx);
                (true, true)
            }
            None => (false, false),
        })
        .await
    }
}
