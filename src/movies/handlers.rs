use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{error, info, instrument, warn};

use super::dto::{AddMovieForm, EditMovieForm};
use super::services::{add_movie_by_title, AddMovieOutcome};
use crate::{error::AppError, flash, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/movies", get(list_movies))
        .route("/users/:user_id/movies/:movie_id/edit", get(edit_movie))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/movies", post(add_movie))
        .route("/users/:user_id/movies/:movie_id/edit", post(update_movie))
        .route("/users/:user_id/movies/:movie_id/delete", post(delete_movie))
}

fn movies_url(user_id: i64) -> String {
    format!("/users/{}/movies", user_id)
}

fn bounce(jar: SignedCookieJar, message: &str, to: &str) -> Response {
    (flash::push(jar, message), Redirect::to(to)).into_response()
}

#[instrument(skip(state, jar))]
pub async fn list_movies(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let Some(user) = state.store.get_user(user_id).await? else {
        warn!(user_id, "user not found");
        return Ok(bounce(jar, "User not found.", "/users"));
    };
    let (jar, message) = flash::take(jar);

    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    ctx.insert("movies", &user.movies);
    ctx.insert("flash", &message);
    let page = state.render("movies.html", &ctx)?;
    Ok((jar, page).into_response())
}

#[instrument(skip(state, jar, form))]
pub async fn add_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i64>,
    Form(form): Form<AddMovieForm>,
) -> Response {
    let back = movies_url(user_id);
    let outcome =
        add_movie_by_title(state.store.as_ref(), state.lookup.as_ref(), user_id, &form.title).await;
    match outcome {
        Ok(AddMovieOutcome::Added(_)) => bounce(jar, "Movie added.", &back),
        Ok(AddMovieOutcome::BlankTitle) => bounce(jar, "Please enter a movie title.", &back),
        Ok(AddMovieOutcome::UnknownUser) => bounce(jar, "User not found.", "/users"),
        Ok(AddMovieOutcome::Lookup(e)) => bounce(jar, &e.to_string(), &back),
        Err(e) => {
            error!(error = %e, user_id, "add movie failed");
            bounce(jar, "Movie could not be saved.", &back)
        }
    }
}

#[instrument(skip(state, jar))]
pub async fn edit_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> Result<Response, AppError> {
    let Some(user) = state.store.get_user(user_id).await? else {
        return Ok(bounce(jar, "User not found.", "/users"));
    };
    let Some(movie) = user.movie(movie_id).cloned() else {
        warn!(user_id, movie_id, "movie not found");
        return Ok(bounce(jar, "Movie not found.", &movies_url(user_id)));
    };
    let (jar, message) = flash::take(jar);

    let mut ctx = tera::Context::new();
    ctx.insert("user", &user);
    ctx.insert("movie", &movie);
    ctx.insert("flash", &message);
    let page = state.render("edit_movie.html", &ctx)?;
    Ok((jar, page).into_response())
}

#[instrument(skip(state, jar, form))]
pub async fn update_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path((user_id, movie_id)): Path<(i64, i64)>,
    Form(form): Form<EditMovieForm>,
) -> Response {
    if form.has_blank_title() {
        let edit = format!("/users/{}/movies/{}/edit", user_id, movie_id);
        return bounce(jar, "Title cannot be empty.", &edit);
    }

    let message = match state
        .store
        .update_movie(user_id, movie_id, form.into())
        .await
    {
        Ok(true) => {
            info!(user_id, movie_id, "movie updated");
            "Movie updated."
        }
        Ok(false) => "Movie update failed.",
        Err(e) => {
            error!(error = %e, user_id, movie_id, "update movie failed");
            "Movie update failed."
        }
    };
    bounce(jar, message, &movies_url(user_id))
}

#[instrument(skip(state, jar))]
pub async fn delete_movie(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path((user_id, movie_id)): Path<(i64, i64)>,
) -> Response {
    let message = match state.store.delete_movie(user_id, movie_id).await {
        Ok(true) => {
            info!(user_id, movie_id, "movie deleted");
            "Movie deleted."
        }
        Ok(false) => "Movie delete failed.",
        Err(e) => {
            error!(error = %e, user_id, movie_id, "delete movie failed");
            "Movie delete failed."
        }
    };
    bounce(jar, message, &movies_url(user_id))
}
