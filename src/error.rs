use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Infrastructure failures of a store. A missing user or movie is not an
/// error; store methods report that with `None` / `false`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("data file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Errors that abort a page render.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        let message = match self {
            AppError::Store(_) => "Storage error",
            AppError::Template(_) => "Template error",
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
