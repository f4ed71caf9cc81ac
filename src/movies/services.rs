use tracing::{info, warn};

use crate::error::StoreError;
use crate::omdb::{LookupError, MovieLookup};
use crate::store::{Movie, MovieStore};

/// Result of adding a movie by title.
#[derive(Debug, PartialEq, Eq)]
pub enum AddMovieOutcome {
    Added(Movie),
    BlankTitle,
    UnknownUser,
    Lookup(LookupError),
}

/// Looks the title up and stores the result under `user_id`.
///
/// The owner is checked before the lookup so a missing user never costs an
/// API call; nothing is written unless the lookup succeeds.
pub async fn add_movie_by_title(
    store: &dyn MovieStore,
    lookup: &dyn MovieLookup,
    user_id: i64,
    title: &str,
) -> Result<AddMovieOutcome, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Ok(AddMovieOutcome::BlankTitle);
    }
    if store.get_user(user_id).await?.is_none() {
        return Ok(AddMovieOutcome::UnknownUser);
    }

    let details = match lookup.fetch(title).await {
        Ok(details) => details,
        Err(e) => {
            warn!(user_id, title, error = %e, "movie lookup failed");
            return Ok(AddMovieOutcome::Lookup(e));
        }
    };

    match store.add_movie(user_id, details).await? {
        Some(movie) => {
            info!(user_id, movie_id = movie.id, title = %movie.title, "movie added");
            Ok(AddMovieOutcome::Added(movie))
        }
        // Owner removed between the check and the insert.
        None => Ok(AddMovieOutcome::UnknownUser),
    }
}
