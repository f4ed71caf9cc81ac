use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{error, info, instrument, warn};

use super::dto::CreateUserForm;
use crate::{error::AppError, flash, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id/delete", post(delete_user))
}

pub async fn index() -> Redirect {
    Redirect::to("/users")
}

#[instrument(skip(state, jar))]
pub async fn list_users(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let users = state.store.list_users().await?;
    let (jar, message) = flash::take(jar);

    let mut ctx = tera::Context::new();
    ctx.insert("users", &users);
    ctx.insert("flash", &message);
    let page = state.render("users.html", &ctx)?;
    Ok((jar, page))
}

#[instrument(skip(state, jar, form))]
pub async fn create_user(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CreateUserForm>,
) -> (SignedCookieJar, Redirect) {
    let message = match state.store.create_user(&form.name).await {
        Ok(Some(user)) => {
            info!(user_id = user.id, name = %user.name, "user created");
            "User created."
        }
        Ok(None) => {
            warn!("blank user name");
            "Please enter a user name."
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            "User creation failed."
        }
    };
    (flash::push(jar, message), Redirect::to("/users"))
}

#[instrument(skip(state, jar))]
pub async fn delete_user(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(user_id): Path<i64>,
) -> (SignedCookieJar, Redirect) {
    let message = match state.store.delete_user(user_id).await {
        Ok(true) => {
            info!(user_id, "user deleted");
            "User deleted."
        }
        Ok(false) => "User delete failed.",
        Err(e) => {
            error!(error = %e, user_id, "delete user failed");
            "User delete failed."
        }
    };
    (flash::push(jar, message), Redirect::to("/users"))
}
