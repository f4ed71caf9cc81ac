use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::OmdbConfig;
use crate::store::NewMovie;

/// Lookup failures. `Display` is the text shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("OMDb API key missing. Set OMDB_API_KEY in your environment.")]
    MissingApiKey,
    #[error("OMDb request failed. Try again in a moment.")]
    Request,
    #[error("{0}")]
    NotFound(String),
}

/// Resolves a title to movie metadata.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    async fn fetch(&self, title: &str) -> Result<NewMovie, LookupError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbPayload {
    response: Option<String>,
    error: Option<String>,
    title: Option<String>,
    year: Option<String>,
    director: Option<String>,
    poster: Option<String>,
}

impl OmdbPayload {
    fn into_movie(self, requested: &str) -> Result<NewMovie, LookupError> {
        if self.response.as_deref() == Some("False") {
            return Err(LookupError::NotFound(
                self.error.unwrap_or_else(|| "Movie not found.".into()),
            ));
        }
        let poster = match self.poster {
            Some(p) if p != "N/A" => p,
            _ => String::new(),
        };
        Ok(NewMovie {
            title: self
                .title
                .unwrap_or_else(|| requested.to_string())
                .trim()
                .to_string(),
            year: self.year.unwrap_or_default(),
            director: self.director.unwrap_or_default(),
            poster,
        })
    }
}

/// OMDb title search over HTTP.
pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(config: &OmdbConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MovieLookup for OmdbClient {
    #[instrument(skip(self))]
    async fn fetch(&self, title: &str) -> Result<NewMovie, LookupError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("omdb lookup without api key");
            return Err(LookupError::MissingApiKey);
        };

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("t", title), ("apikey", api_key)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "omdb request failed");
                LookupError::Request
            })?;
        let payload: OmdbPayload = response.json().await.map_err(|e| {
            warn!(error = %e, "omdb response unreadable");
            LookupError::Request
        })?;

        let movie = payload.into_movie(title)?;
        debug!(found = %movie.title, "omdb lookup ok");
        Ok(movie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::time::Duration;

    fn payload(v: Value) -> OmdbPayload {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn normalizes_na_poster_and_trims_title() {
        let movie = payload(json!({
            "Response": "True",
            "Title": "  Heat ",
            "Year": "1995",
            "Director": "Michael Mann",
            "Poster": "N/A"
        }))
        .into_movie("heat")
        .unwrap();
        assert_eq!(
            movie,
            NewMovie {
                title: "Heat".into(),
                year: "1995".into(),
                director: "Michael Mann".into(),
                poster: String::new(),
            }
        );
    }

    #[test]
    fn falls_back_to_requested_title() {
        let movie = payload(json!({"Response": "True"}))
            .into_movie(" heat ")
            .unwrap();
        assert_eq!(movie.title, "heat");
        assert_eq!(movie.year, "");
    }

    #[test]
    fn false_response_carries_api_error() {
        let err = payload(json!({"Response": "False", "Error": "Movie not found!"}))
            .into_movie("zzz")
            .unwrap_err();
        assert_eq!(err.to_string(), "Movie not found!");

        let err = payload(json!({"Response": "False"}))
            .into_movie("zzz")
            .unwrap_err();
        assert_eq!(err, LookupError::NotFound("Movie not found.".into()));
    }

    async fn fake_omdb() -> String {
        async fn handler(
            Query(q): Query<HashMap<String, String>>,
        ) -> Result<Json<Value>, StatusCode> {
            if q.get("apikey").map(String::as_str) != Some("k") {
                return Err(StatusCode::UNAUTHORIZED);
            }
            match q.get("t").map(String::as_str) {
                Some("Alien") => Ok(Json(json!({
                    "Response": "True",
                    "Title": "Alien",
                    "Year": "1979",
                    "Director": "Ridley Scott",
                    "Poster": "https://img/alien.jpg"
                }))),
                Some("boom") => Err(StatusCode::INTERNAL_SERVER_ERROR),
                _ => Ok(Json(json!({"Response": "False", "Error": "Movie not found!"}))),
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/", get(handler)))
                .await
                .unwrap();
        });
        format!("http://{}/", addr)
    }

    fn client(base_url: String, api_key: Option<&str>) -> OmdbClient {
        OmdbClient::new(&OmdbConfig {
            api_key: api_key.map(Into::into),
            base_url,
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_known_title() {
        let omdb = client(fake_omdb().await, Some("k"));
        let movie = omdb.fetch("Alien").await.unwrap();
        assert_eq!(movie.director, "Ridley Scott");
        assert_eq!(movie.poster, "https://img/alien.jpg");
    }

    #[tokio::test]
    async fn unknown_title_is_not_found() {
        let omdb = client(fake_omdb().await, Some("k"));
        assert_eq!(
            omdb.fetch("Nope").await,
            Err(LookupError::NotFound("Movie not found!".into()))
        );
    }

    #[tokio::test]
    async fn server_error_is_request_failure() {
        let omdb = client(fake_omdb().await, Some("k"));
        assert_eq!(omdb.fetch("boom").await, Err(LookupError::Request));
    }

    #[tokio::test]
    async fn missing_key_skips_the_network() {
        let omdb = client("http://127.0.0.1:9/".into(), None);
        assert_eq!(omdb.fetch("Alien").await, Err(LookupError::MissingApiKey));
    }

    #[tokio::test]
    async fn unreachable_host_is_request_failure() {
        let omdb = client("http://127.0.0.1:9/".into(), Some("k"));
        assert_eq!(omdb.fetch("Alien").await, Err(LookupError::Request));
    }
}
