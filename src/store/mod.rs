mod json;
mod repo_types;
mod sql;

use async_trait::async_trait;

use crate::error::StoreError;

pub use json::JsonStore;
pub use repo_types::{Movie, MovieUpdate, NewMovie, User};
pub use sql::{ImportReport, SqlStore};

/// Persistence of users and their movie lists.
///
/// Lookups that miss return `None` or `false`; `Err` is reserved for the
/// backing file or database failing.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Returns `None` when the trimmed name is blank.
    async fn create_user(&self, name: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;
    /// Empty when the user does not exist.
    async fn list_movies(&self, user_id: i64) -> Result<Vec<Movie>, StoreError>;
    /// Returns `None` without touching storage when the user does not exist.
    async fn add_movie(&self, user_id: i64, movie: NewMovie)
        -> Result<Option<Movie>, StoreError>;
    async fn update_movie(
        &self,
        user_id: i64,
        movie_id: i64,
        update: MovieUpdate,
    ) -> Result<bool, StoreError>;
    async fn delete_movie(&self, user_id: i64, movie_id: i64) -> Result<bool, StoreError>;
    /// Removes the user together with all of its movies.
    async fn delete_user(&self, user_id: i64) -> Result<bool, StoreError>;
}
